//! Vault naming and tag derivation.
//!
//! Every taggable resource receives the same base tag set; owned material
//! (keys, secrets, certificates) may overlay its own tags on top.
//!
//! Precedence, lowest to highest: module defaults, `additional_tags`,
//! per-resource `tags`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use vaultcraft_common::config::ModuleConfig;
use vaultcraft_common::constants::{
    CREATED_DATE_FORMAT, DEFAULT_NAME_PREFIX, MANAGED_BY, MODULE_NAME, TAG_CREATED_BY,
    TAG_CREATED_DATE, TAG_ENVIRONMENT, TAG_MANAGED_BY, TAG_MODULE, TAG_PROJECT,
};

/// Resolved string tags.
pub type Tags = BTreeMap<String, String>;

/// Computes the canonical vault name.
///
/// A non-empty `custom_name` wins verbatim. Otherwise the name is the
/// effective prefix followed by `name_suffix`, where the effective prefix
/// is `name_prefix` or, when that is empty, `kv-<environment>-<location_short>`.
#[must_use]
pub fn vault_name(config: &ModuleConfig) -> String {
    if !config.custom_name.is_empty() {
        return config.custom_name.clone();
    }
    let prefix = if config.name_prefix.is_empty() {
        format!(
            "{DEFAULT_NAME_PREFIX}-{}-{}",
            config.environment, config.location_short
        )
    } else {
        config.name_prefix.clone()
    };
    format!("{prefix}{}", config.name_suffix)
}

/// Computes the base tag set shared by every taggable resource.
#[must_use]
pub fn base_tags(config: &ModuleConfig, created: NaiveDate) -> Tags {
    let mut tags = Tags::new();
    let _ = tags.insert(TAG_ENVIRONMENT.into(), config.environment.clone());
    let _ = tags.insert(TAG_PROJECT.into(), config.project_name.clone());
    let _ = tags.insert(TAG_MANAGED_BY.into(), MANAGED_BY.into());
    let _ = tags.insert(TAG_MODULE.into(), MODULE_NAME.into());
    let _ = tags.insert(
        TAG_CREATED_DATE.into(),
        created.format(CREATED_DATE_FORMAT).to_string(),
    );
    let _ = tags.insert(TAG_CREATED_BY.into(), config.created_by.clone());
    overlay(&tags, &config.additional_tags)
}

/// Returns `base` with `overrides` applied on top.
#[must_use]
pub fn overlay(base: &Tags, overrides: &Tags) -> Tags {
    let mut merged = base.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Names of resources derived from the vault name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    /// Vault name.
    pub vault: String,
}

impl DerivedNames {
    /// Derives child names from the vault name.
    #[must_use]
    pub const fn new(vault: String) -> Self {
        Self { vault }
    }

    /// Private endpoint.
    #[must_use]
    pub fn private_endpoint(&self) -> String {
        format!("{}-pe", self.vault)
    }

    /// Private service connection of the endpoint.
    #[must_use]
    pub fn private_service_connection(&self) -> String {
        format!("{}-psc", self.vault)
    }

    /// Diagnostic setting.
    #[must_use]
    pub fn diagnostic_setting(&self) -> String {
        format!("{}-diagnostics", self.vault)
    }

    /// Management lock.
    #[must_use]
    pub fn lock(&self) -> String {
        format!("{}-lock", self.vault)
    }

    /// Policy assignment or definition named after `suffix`.
    #[must_use]
    pub fn policy(&self, suffix: &str) -> String {
        format!("{}-{suffix}", self.vault)
    }

    /// Security baseline initiative.
    #[must_use]
    pub fn initiative(&self) -> String {
        format!("{}-security-baseline", self.vault)
    }
}
