//! Document entity - A persisted business record (Sales Invoice, Payment Entry, ...).
//!
//! Standard fields are real columns; everything else a doctype carries lives in
//! the `data` JSON object.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Draft documents can still be edited and deleted freely.
pub const DOCSTATUS_DRAFT: i32 = 0;
/// Submitted documents are final.
pub const DOCSTATUS_SUBMITTED: i32 = 1;
/// Cancelled documents stay on record.
pub const DOCSTATUS_CANCELLED: i32 = 2;

/// Document database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Document type (e.g. "Sales Invoice")
    pub doctype: String,
    /// Document name, unique within its doctype (e.g. "ACC-SINV-2024-00001")
    pub name: String,
    /// Owning company, if the doctype is company-scoped
    pub company: Option<String>,
    /// Lifecycle flag: 0 draft, 1 submitted, 2 cancelled
    pub docstatus: i32,
    /// Public URL of the attached QR image, if any
    pub qr_code: Option<String>,
    /// Remaining doctype-specific fields
    pub data: Json,
    /// When the document was first inserted
    pub creation: DateTimeUtc,
    /// When the document was last written
    pub modified: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
