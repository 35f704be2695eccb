//! Site settings loading from config.toml
//!
//! The settings file describes the site the hooks run for: its public base URL,
//! the default country and language, and where file attachments are stored.
//! An optional `[regions]` table overrides the built-in region policy.

use crate::core::region::ComplianceFeature;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Site-wide settings
    pub site: SiteSettings,
    /// Per-region feature overrides, keyed by country name
    #[serde(default)]
    pub regions: BTreeMap<String, Vec<ComplianceFeature>>,
}

/// Settings of the site the hooks run for
#[derive(Debug, Deserialize, Clone)]
pub struct SiteSettings {
    /// Public base URL, e.g. `https://erp.example.com`
    pub base_url: String,
    /// Default country, used when no company is known
    #[serde(default)]
    pub country: Option<String>,
    /// Default system language
    #[serde(default = "default_language")]
    pub language: String,
    /// Root directory for `public/files` and `private/files`
    #[serde(default = "default_files_path")]
    pub files_path: PathBuf,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_files_path() -> PathBuf {
    PathBuf::from("data/site")
}

impl SiteSettings {
    /// Base URL without a trailing slash.
    #[must_use]
    pub fn url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Directory holding files of the given visibility.
    #[must_use]
    pub fn files_dir(&self, is_private: bool) -> PathBuf {
        if is_private {
            self.files_path.join("private").join("files")
        } else {
            self.files_path.join("public").join("files")
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("SITE_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(files_path) = std::env::var("SITE_FILES_PATH") {
            self.files_path = PathBuf::from(files_path);
        }
    }
}

/// Parses settings from a TOML string.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid, a required field is missing,
/// or a region lists an unknown feature.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if settings.site.base_url.trim().is_empty() {
        return Err(Error::Config {
            message: "site.base_url cannot be empty".to_string(),
        });
    }

    Ok(settings)
}

/// Loads settings from a TOML file, then applies `SITE_BASE_URL` and
/// `SITE_FILES_PATH` environment overrides.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    let mut settings = parse_settings(&contents)?;
    settings.site.apply_env_overrides();
    Ok(settings)
}

/// Loads settings from `CONFIG_PATH`, or ./config.toml when unset.
pub fn load_default_config() -> Result<Settings> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
            [site]
            base_url = "https://erp.example.com/"
            country = "France"

            [regions]
            "Saudi Arabia" = ["qr_enabled", "deletion_restricted"]
            Germany = []
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.site.url(), "https://erp.example.com");
        assert_eq!(settings.site.country.as_deref(), Some("France"));
        assert_eq!(settings.site.language, "en");
        assert_eq!(settings.site.files_path, PathBuf::from("data/site"));
        assert_eq!(
            settings.regions["Saudi Arabia"],
            vec![
                ComplianceFeature::QrEnabled,
                ComplianceFeature::DeletionRestricted
            ]
        );
        assert!(settings.regions["Germany"].is_empty());
    }

    #[test]
    fn test_parse_settings_rejects_unknown_feature() {
        let toml_str = r#"
            [site]
            base_url = "https://erp.example.com"

            [regions]
            Nepal = ["shred_everything"]
        "#;

        assert!(matches!(
            parse_settings(toml_str),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_parse_settings_rejects_empty_base_url() {
        let toml_str = r#"
            [site]
            base_url = "  "
        "#;

        assert!(parse_settings(toml_str).is_err());
    }

    #[test]
    fn test_files_dir_by_visibility() {
        let settings = parse_settings(
            r#"
            [site]
            base_url = "https://erp.example.com"
            files_path = "/srv/site1"
        "#,
        )
        .unwrap();

        assert_eq!(
            settings.site.files_dir(false),
            PathBuf::from("/srv/site1/public/files")
        );
        assert_eq!(
            settings.site.files_dir(true),
            PathBuf::from("/srv/site1/private/files")
        );
    }
}
