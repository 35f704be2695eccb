//! `DocField` entity - One field in a doctype's schema.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Field type of image attachments, used for QR codes.
pub const FIELDTYPE_ATTACH_IMAGE: &str = "Attach Image";

/// `DocField` database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "doc_fields")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Doctype this field belongs to
    pub parent: String,
    /// Field name as stored on documents (e.g. `qr_code`)
    pub fieldname: String,
    /// Field type (e.g. "Attach Image", "Data", "Currency")
    pub fieldtype: String,
    /// Position within the doctype's field list
    pub idx: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
