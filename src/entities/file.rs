//! File entity - Metadata for an uploaded or generated attachment.
//!
//! The bytes live on disk under the site's files directory; `file_url` is the
//! public (or private) path they are served from.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// File database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique record name
    #[sea_orm(unique)]
    pub name: String,
    /// File name on disk
    pub file_name: String,
    /// URL the content is served from (`/files/...` or `/private/files/...`)
    pub file_url: String,
    /// Whether the file is served only to authenticated users
    pub is_private: bool,
    /// sha256 of the content, hex encoded
    pub content_hash: String,
    /// Size of the content in bytes
    pub file_size: i64,
    /// Doctype of the document this file is attached to
    pub attached_to_doctype: Option<String>,
    /// Name of the document this file is attached to
    pub attached_to_name: Option<String>,
    /// When the file was saved
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
