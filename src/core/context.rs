//! Hook context - everything a hook needs from the running site, passed explicitly.

use crate::config::settings::SiteSettings;
use crate::core::{notify::Notifier, region::RegionPolicy};
use sea_orm::DatabaseConnection;

/// Borrowed view of the site a hook runs against.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    /// Database holding documents, files and logs
    pub db: &'a DatabaseConnection,
    /// Site settings (base URL, defaults, files directory)
    pub site: &'a SiteSettings,
    /// Which compliance features each region enables
    pub policy: &'a RegionPolicy,
    /// Observers of document updates
    pub notifier: &'a Notifier,
}

impl<'a> HookContext<'a> {
    #[must_use]
    pub const fn new(
        db: &'a DatabaseConnection,
        site: &'a SiteSettings,
        policy: &'a RegionPolicy,
        notifier: &'a Notifier,
    ) -> Self {
        Self {
            db,
            site,
            policy,
            notifier,
        }
    }
}
