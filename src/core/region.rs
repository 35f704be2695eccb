//! Region resolution and policy.
//!
//! A region is the country a company (or, failing that, the site) is registered
//! in. Which compliance behaviors apply in a region is a table lookup: each
//! region maps to a set of [`ComplianceFeature`]s. The built-in table covers the
//! countries with regional rules; the settings file can replace any entry.

use crate::{
    core::{context::HookContext, defaults},
    entities::{Company, company},
    errors::Result,
};
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A compliance behavior a region can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceFeature {
    /// Submitted and cancelled documents may not be deleted
    DeletionRestricted,
    /// Submitted documents are appended to the transaction log
    TransactionLogged,
    /// Invoices carry a QR code linking to their print view
    QrEnabled,
}

/// Mapping from region name to the compliance features it enables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPolicy {
    table: HashMap<String, BTreeSet<ComplianceFeature>>,
}

impl Default for RegionPolicy {
    fn default() -> Self {
        use self::ComplianceFeature::{DeletionRestricted, QrEnabled, TransactionLogged};

        let mut policy = Self::empty();
        policy.set("Nepal", [DeletionRestricted]);
        policy.set("France", [DeletionRestricted, TransactionLogged]);
        policy.set("Germany", [TransactionLogged]);
        policy.set("Saudi Arabia", [QrEnabled]);
        policy
    }
}

impl RegionPolicy {
    /// A policy in which no region enables anything.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// The built-in policy with each region listed in `overrides` replaced.
    #[must_use]
    pub fn with_overrides(overrides: &BTreeMap<String, Vec<ComplianceFeature>>) -> Self {
        let mut policy = Self::default();
        for (region, features) in overrides {
            policy.set(region, features.iter().copied());
        }
        policy
    }

    /// Replaces the features enabled for `region`.
    pub fn set<I>(&mut self, region: &str, features: I)
    where
        I: IntoIterator<Item = ComplianceFeature>,
    {
        self.table
            .insert(region.to_string(), features.into_iter().collect());
    }

    /// Features enabled for `region`, in a stable order.
    pub fn features(&self, region: &str) -> impl Iterator<Item = ComplianceFeature> + '_ {
        self.table.get(region).into_iter().flatten().copied()
    }

    /// Whether `region` enables `feature`. Unknown and missing regions enable nothing.
    #[must_use]
    pub fn allows(&self, region: Option<&str>, feature: ComplianceFeature) -> bool {
        region
            .and_then(|r| self.table.get(r))
            .is_some_and(|features| features.contains(&feature))
    }

    /// Regions that enable `feature`, sorted by name.
    #[must_use]
    pub fn regions_with(&self, feature: ComplianceFeature) -> Vec<&str> {
        let mut regions: Vec<&str> = self
            .table
            .iter()
            .filter(|(_, features)| features.contains(&feature))
            .map(|(region, _)| region.as_str())
            .collect();
        regions.sort_unstable();
        regions
    }
}

/// Resolves the region for a company, or for the site when there is none.
///
/// With a company, this is the company's country (`None` if the company is
/// unknown or has no country). Without one, or with a blank name, the
/// `country` site default is used, then the country from the settings file.
pub async fn get_region(ctx: &HookContext<'_>, company: Option<&str>) -> Result<Option<String>> {
    if let Some(company) = company.filter(|c| !c.trim().is_empty()) {
        let found = Company::find_by_id(company.to_string()).one(ctx.db).await?;
        return Ok(found.and_then(|c| c.country));
    }

    if let Some(country) = defaults::get_default(ctx.db, defaults::COUNTRY_KEY).await? {
        return Ok(Some(country));
    }

    Ok(ctx.site.country.clone())
}

/// Resolves the region and returns it only when it enables `feature`.
pub async fn region_with_feature(
    ctx: &HookContext<'_>,
    company: Option<&str>,
    feature: ComplianceFeature,
) -> Result<Option<String>> {
    let region = get_region(ctx, company).await?;
    if ctx.policy.allows(region.as_deref(), feature) {
        Ok(region)
    } else {
        tracing::trace!(?region, ?feature, "Feature not enabled for region");
        Ok(None)
    }
}

/// Creates a company, or updates the country of an existing one.
pub async fn upsert_company(
    db: &DatabaseConnection,
    name: &str,
    country: Option<&str>,
) -> Result<company::Model> {
    if let Some(existing) = Company::find_by_id(name.to_string()).one(db).await? {
        let mut active_model: company::ActiveModel = existing.into();
        active_model.country = Set(country.map(ToString::to_string));
        return active_model.update(db).await.map_err(Into::into);
    }

    let company = company::ActiveModel {
        name: Set(name.to_string()),
        country: Set(country.map(ToString::to_string)),
    };
    company.insert(db).await.map_err(Into::into)
}
