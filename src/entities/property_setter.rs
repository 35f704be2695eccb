//! Property setter entity - Site-level overrides of doctype properties.
//!
//! The QR generator reads `default_print_format` from here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Property setter database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property_setters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Doctype the override applies to
    pub doc_type: String,
    /// Overridden property (e.g. `default_print_format`)
    pub property: String,
    /// Override value
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
