//! Top-level composition: module configuration in, desired graph out.

use chrono::{NaiveDate, Utc};
use vaultcraft_common::config::ModuleConfig;
use vaultcraft_common::error::Result;

use crate::graph::{DesiredGraph, GraphBuilder};
use crate::infra;
use crate::material::{self, MaterialGates};
use crate::mode::{self, AuthorizationMode};
use crate::naming::{self, DerivedNames};
use crate::outputs;
use crate::policy;
use crate::validator;

/// Turns module configurations into desired resource graphs.
///
/// Composition is a pure function of the configuration and the creation
/// date stamped into the `CreatedDate` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Composer {
    created: NaiveDate,
}

impl Composer {
    /// Creates a composer stamping today's date (UTC).
    #[must_use]
    pub fn new() -> Self {
        Self::with_created_date(Utc::now().date_naive())
    }

    /// Creates a composer stamping a fixed date.
    #[must_use]
    pub const fn with_created_date(created: NaiveDate) -> Self {
        Self { created }
    }

    /// Date stamped into the `CreatedDate` tag.
    #[must_use]
    pub const fn created_date(&self) -> NaiveDate {
        self.created
    }

    /// Composes the desired graph for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultcraftError::Validation`] if the configuration is
    /// invalid; nothing is emitted in that case. Returns
    /// [`VaultcraftError::Graph`] if the composed graph breaks an internal
    /// invariant.
    ///
    /// [`VaultcraftError::Validation`]: vaultcraft_common::error::VaultcraftError::Validation
    /// [`VaultcraftError::Graph`]: vaultcraft_common::error::VaultcraftError::Graph
    pub fn compose(&self, config: &ModuleConfig) -> Result<DesiredGraph> {
        let validated = validator::validate(config)?;

        let names = DerivedNames::new(naming::vault_name(config));
        let tags = naming::base_tags(config, self.created);
        tracing::info!(vault = %names.vault, "composing key vault module");

        let vault = infra::vault(&validated, &names, &tags);
        let vault_key = vault.logical_key.clone();
        let mut descriptors = vec![vault];

        let mode = AuthorizationMode::resolve(config);
        let plan = mode::expand(mode, &vault_key, &names.vault);
        let gates = MaterialGates::from_plan(&mode, &plan);
        tracing::info!(
            rbac = mode.is_rbac(),
            bindings = plan.descriptors.len(),
            "authorization resolved"
        );
        descriptors.extend(plan.descriptors);

        descriptors.extend(material::expand(config, &vault_key, &tags, &gates));
        descriptors.extend(infra::expand(&validated, &vault_key, &names, &tags));

        if config.enable_policy_assignments {
            descriptors.extend(policy::assignments(config, &names));
        }
        if config.enable_custom_policies {
            descriptors.extend(policy::custom_definitions(&names));
        }
        if config.enable_policy_initiative {
            descriptors.extend(policy::initiative(config, &names));
        }

        let outputs = outputs::collect(config, &descriptors, &vault_key, &names.vault, &tags);

        let mut builder = GraphBuilder::new();
        builder.extend(descriptors)?;
        for (name, value) in outputs {
            builder.output(name, value);
        }
        let graph = builder.build()?;
        tracing::info!(descriptors = graph.len(), "composition complete");
        Ok(graph)
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use vaultcraft_common::types::{LogicalKey, ResourceKind};

    use super::*;
    use crate::descriptor::AttrValue;

    fn composer() -> Composer {
        Composer::with_created_date(NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"))
    }

    fn config() -> ModuleConfig {
        ModuleConfig {
            environment: "dev".into(),
            location_short: "weu".into(),
            location: "westeurope".into(),
            resource_group_name: "rg-dev".into(),
            tenant_id: "tenant".into(),
            ..ModuleConfig::default()
        }
    }

    #[test]
    fn minimal_config_yields_single_vault() {
        let graph = composer().compose(&config()).expect("compose");
        assert_eq!(graph.len(), 1);
        let vault = graph.find("azurerm_key_vault.this").expect("vault");
        assert_eq!(vault.get_str("name"), Some("kv-dev-weu"));
        assert_eq!(vault.tags()["CreatedDate"], "2024-03-01");
    }

    #[test]
    fn default_config_with_minimum_retention_composes() {
        let config = ModuleConfig {
            soft_delete_retention_days: 7,
            ..ModuleConfig::default()
        };
        let graph = composer().compose(&config).expect("compose");
        let vault = graph.find("azurerm_key_vault.this").expect("vault");
        assert_eq!(vault.get_str("name"), Some("kv--"));
        assert_eq!(
            vault.attributes["soft_delete_retention_days"],
            AttrValue::Int(7)
        );
    }

    #[test]
    fn invalid_config_emits_nothing() {
        let config = ModuleConfig {
            soft_delete_retention_days: 3,
            ..config()
        };
        let err = composer().compose(&config).expect_err("invalid");
        assert!(err.is_validation());
    }

    #[test]
    fn policy_switches_add_descriptors() {
        let config = ModuleConfig {
            enable_policy_assignments: true,
            enable_custom_policies: true,
            enable_policy_initiative: true,
            resource_group_id: Some("/subscriptions/0/resourceGroups/rg-dev".into()),
            log_analytics_workspace_id: Some(
                "/subscriptions/0/resourceGroups/rg-ops/providers/Microsoft.OperationalInsights/workspaces/law".into(),
            ),
            ..config()
        };
        let graph = composer().compose(&config).expect("compose");
        assert_eq!(graph.of_kind(ResourceKind::PolicyAssignment).count(), 7);
        assert_eq!(graph.of_kind(ResourceKind::PolicyDefinition).count(), 3);
        assert!(graph.contains(&LogicalKey::singleton(
            ResourceKind::PolicySetDefinition,
            "this"
        )));
        let ids = graph.outputs()["policy_assignment_ids"]
            .as_map()
            .expect("ids");
        assert_eq!(ids.len(), 7);
    }
}
