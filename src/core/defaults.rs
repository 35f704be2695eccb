//! Site defaults
//!
//! Key/value defaults kept in the `system_state` table. They take precedence over
//! the values from the settings file, so a running site can change its default
//! country or language without a restart.

use crate::{
    entities::{SystemState, system_state},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};

/// Default country of the site.
pub const COUNTRY_KEY: &str = "country";
/// System language used in generated links.
pub const LANGUAGE_KEY: &str = "language";

/// Reads a site default.
///
/// # Returns
/// * `Ok(Some(value))` - The default is set
/// * `Ok(None)` - No value recorded for this key
pub async fn get_default<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?;

    Ok(state.map(|s| s.value))
}

/// Sets or updates a site default.
pub async fn set_default<C>(db: &C, key: &str, value: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();

    // Check if the key exists
    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(value.to_string());
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_state = system_state::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(now),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }

    tracing::info!("Set site default: {} = {}", key, value);
    Ok(())
}
