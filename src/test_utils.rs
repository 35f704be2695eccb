//! Shared test utilities.
//!
//! This module provides helpers for setting up an in-memory site: a database
//! with all tables, settings pointing at a temporary files directory, the
//! built-in region policy, and a notifier.

use crate::{
    config::{database, settings::SiteSettings},
    core::{context::HookContext, notify::Notifier, region::RegionPolicy},
    entities::document::{self, DOCSTATUS_DRAFT},
    errors::Result,
};
use chrono::{TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tempfile::TempDir;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    database::create_tables(&db).await?;
    Ok(db)
}

/// Everything a hook needs, owned by the test.
pub struct TestSite {
    /// In-memory database with all tables
    pub db: DatabaseConnection,
    /// Site settings; `files_path` points at a temporary directory
    pub settings: SiteSettings,
    /// Region policy, the built-in table unless a test replaces it
    pub policy: RegionPolicy,
    /// Receives update notifications from the hooks
    pub notifier: Notifier,
    // Removed from disk on drop
    _files: TempDir,
}

impl TestSite {
    /// # Defaults
    /// * `base_url`: `https://erp.example.com`
    /// * `country`: None
    /// * `language`: "en"
    /// * policy: the built-in region table
    pub async fn new() -> Result<Self> {
        let files = TempDir::new()?;
        Ok(Self {
            db: setup_test_db().await?,
            settings: SiteSettings {
                base_url: "https://erp.example.com".to_string(),
                country: None,
                language: "en".to_string(),
                files_path: files.path().to_path_buf(),
            },
            policy: RegionPolicy::default(),
            notifier: Notifier::default(),
            _files: files,
        })
    }

    /// Borrows the site as a hook context.
    pub fn ctx(&self) -> HookContext<'_> {
        HookContext::new(&self.db, &self.settings, &self.policy, &self.notifier)
    }
}

/// A draft document that is not stored anywhere, created 2024-03-01 09:30:15.123456 UTC.
pub fn sample_document(doctype: &str, name: &str, company: Option<&str>) -> document::Model {
    let creation = Utc
        .with_ymd_and_hms(2024, 3, 1, 9, 30, 15)
        .single()
        .unwrap_or_default()
        + chrono::Duration::microseconds(123_456);

    document::Model {
        id: 0,
        doctype: doctype.to_string(),
        name: name.to_string(),
        company: company.map(ToString::to_string),
        docstatus: DOCSTATUS_DRAFT,
        qr_code: None,
        data: serde_json::json!({ "customer": "Test Customer", "grand_total": 100 }),
        creation,
        modified: creation,
    }
}
