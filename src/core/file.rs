//! File attachments.
//!
//! A File record points at content stored on disk under the site's files
//! directory. Identical content with the same visibility is stored once and
//! shared between records; the bytes are removed from disk when the last
//! record pointing at them is deleted.

use crate::{
    config::settings::SiteSettings,
    entities::{File, file},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// A file to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    /// Requested name; sanitized and suffixed on collision
    pub file_name: String,
    pub is_private: bool,
    pub content: Vec<u8>,
    /// Owning document, if any
    pub attached_to_doctype: Option<String>,
    pub attached_to_name: Option<String>,
}

/// Makes a file name safe to use as a single path component.
#[must_use]
pub fn sanitize_file_name(file_name: &str) -> String {
    file_name.replace(['/', '\\'], "__")
}

fn url_for(file_name: &str, is_private: bool) -> String {
    if is_private {
        format!("/private/files/{file_name}")
    } else {
        format!("/files/{file_name}")
    }
}

/// Path on disk of a file record's content.
#[must_use]
pub fn disk_path(site: &SiteSettings, file: &file::Model) -> PathBuf {
    site.files_dir(file.is_private).join(&file.file_name)
}

/// Adds `-{suffix}` before the extension: `QR.png` -> `QR-abc123.png`.
fn with_suffix(file_name: &str, suffix: &str) -> String {
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let stem = &file_name[..file_name.len() - ext.len() - 1];
            format!("{stem}-{suffix}.{ext}")
        }
        None => format!("{file_name}-{suffix}"),
    }
}

/// Saves content to disk and records it as a File.
///
/// Content already stored with the same visibility is reused instead of being
/// written again. A different file already occupying the name on disk gets the
/// last six characters of the content hash appended to the new name.
pub async fn save_file(
    db: &DatabaseConnection,
    site: &SiteSettings,
    new: NewFile,
) -> Result<file::Model> {
    let requested = sanitize_file_name(new.file_name.trim());
    if requested.is_empty() {
        return Err(Error::InvalidDocument {
            message: "File name cannot be empty".to_string(),
        });
    }

    let content_hash = hex::encode(Sha256::digest(&new.content));
    let file_size = i64::try_from(new.content.len()).map_err(|_| Error::InvalidDocument {
        message: format!("File {requested} is too large"),
    })?;

    let duplicate = File::find()
        .filter(file::Column::ContentHash.eq(content_hash.as_str()))
        .filter(file::Column::IsPrivate.eq(new.is_private))
        .one(db)
        .await?;

    let file_name = if let Some(existing) = duplicate {
        tracing::debug!(file_url = %existing.file_url, "Reusing stored content");
        existing.file_name
    } else {
        let dir = site.files_dir(new.is_private);
        tokio::fs::create_dir_all(&dir).await?;

        let mut file_name = requested;
        if tokio::fs::try_exists(dir.join(&file_name)).await? {
            file_name = with_suffix(&file_name, &content_hash[content_hash.len() - 6..]);
        }
        tokio::fs::write(dir.join(&file_name), &new.content).await?;
        file_name
    };

    let created_at = Utc::now();
    let name = hex::encode(Sha256::digest(
        format!(
            "{content_hash}{file_name}{}",
            created_at.timestamp_nanos_opt().unwrap_or_default()
        )
        .as_bytes(),
    ))[..10]
        .to_string();

    let record = file::ActiveModel {
        name: Set(name),
        file_url: Set(url_for(&file_name, new.is_private)),
        file_name: Set(file_name),
        is_private: Set(new.is_private),
        content_hash: Set(content_hash),
        file_size: Set(file_size),
        attached_to_doctype: Set(new.attached_to_doctype),
        attached_to_name: Set(new.attached_to_name),
        created_at: Set(created_at),
        ..Default::default()
    };

    let saved = record.insert(db).await?;
    tracing::info!(name = %saved.name, file_url = %saved.file_url, "Saved file");
    Ok(saved)
}

/// File records served from `file_url`, oldest first.
pub async fn find_files_by_url<C>(db: &C, file_url: &str) -> Result<Vec<file::Model>>
where
    C: ConnectionTrait,
{
    File::find()
        .filter(file::Column::FileUrl.eq(file_url))
        .order_by_asc(file::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Whether any File record is served from `file_url`.
pub async fn file_exists<C>(db: &C, file_url: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = File::find()
        .filter(file::Column::FileUrl.eq(file_url))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Reads the content of a File record from disk.
pub async fn get_content(site: &SiteSettings, file: &file::Model) -> Result<Vec<u8>> {
    tokio::fs::read(disk_path(site, file))
        .await
        .map_err(Into::into)
}

/// Deletes a File record, and its content once no other record uses it.
pub async fn delete_file(
    db: &DatabaseConnection,
    site: &SiteSettings,
    file: file::Model,
) -> Result<()> {
    let path = disk_path(site, &file);
    let file_url = file.file_url.clone();
    let name = file.name.clone();

    file.delete(db).await?;

    if file_exists(db, &file_url).await? {
        tracing::debug!(%name, %file_url, "Content still referenced, keeping it on disk");
    } else {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "File content already missing");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(%name, %file_url, "Deleted file");
    Ok(())
}
