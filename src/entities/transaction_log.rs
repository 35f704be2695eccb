//! Transaction log entity - Append-only legal record of submitted documents.
//!
//! Rows are chained: every row's `chaining_hash` covers its own data hash and
//! the previous row's chaining hash.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Position in the chain, starting at 1
    #[sea_orm(unique)]
    pub row_index: i64,
    /// Doctype of the logged document
    pub reference_doctype: String,
    /// Name of the logged document
    pub document_name: String,
    /// Serialized snapshot of the document at submit time
    pub data: String,
    /// When the row was appended
    pub timestamp: DateTimeUtc,
    /// sha256 of `row_index`, `timestamp` (`%Y-%m-%d %H:%M:%S%.6f`) and `data`, concatenated
    pub transaction_hash: String,
    /// `chaining_hash` of the previous row; row 1 carries its own `transaction_hash`
    pub previous_hash: String,
    /// sha256 of `transaction_hash` followed by `previous_hash`
    pub chaining_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
