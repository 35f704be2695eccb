//! Company entity - The tenant a document belongs to.
//!
//! A company's `country` is the region used to select compliance behavior.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Company database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    /// Company name, unique across the site
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    /// Country of registration (e.g. "France", "Saudi Arabia")
    pub country: Option<String>,
}

/// Companies are referenced by documents through their name only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
