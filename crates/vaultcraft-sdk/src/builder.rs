//! Fluent API for assembling a module configuration in code.

use vaultcraft_common::config::{
    AccessPolicyConfig, CertificateConfig, ContactConfig, KeyConfig, ModuleConfig, SecretConfig,
};
use vaultcraft_common::error::Result;
use vaultcraft_common::types::RoleClass;
use vaultcraft_compose::validator;

/// Builder for a [`ModuleConfig`].
///
/// Starts from the hardened defaults; every setter overrides one field.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfigBuilder {
    config: ModuleConfig,
}

impl ModuleConfigBuilder {
    /// Creates a builder for a vault in `location`, resource group
    /// `resource_group_name` and tenant `tenant_id`.
    #[must_use]
    pub fn new(
        location: impl Into<String>,
        resource_group_name: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            config: ModuleConfig {
                location: location.into(),
                resource_group_name: resource_group_name.into(),
                tenant_id: tenant_id.into(),
                ..ModuleConfig::default()
            },
        }
    }

    /// Sets environment and short region used for the derived vault name.
    #[must_use]
    pub fn environment(mut self, environment: impl Into<String>, location_short: impl Into<String>) -> Self {
        self.config.environment = environment.into();
        self.config.location_short = location_short.into();
        self
    }

    /// Sets the name prefix.
    #[must_use]
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.name_prefix = prefix.into();
        self
    }

    /// Sets the name suffix.
    #[must_use]
    pub fn name_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.name_suffix = suffix.into();
        self
    }

    /// Sets an explicit vault name.
    #[must_use]
    pub fn custom_name(mut self, name: impl Into<String>) -> Self {
        self.config.custom_name = name.into();
        self
    }

    /// Sets project and creator recorded in tags.
    #[must_use]
    pub fn project(mut self, project_name: impl Into<String>, created_by: impl Into<String>) -> Self {
        self.config.project_name = project_name.into();
        self.config.created_by = created_by.into();
        self
    }

    /// Adds a caller tag.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.config.additional_tags.insert(key.into(), value.into());
        self
    }

    /// Sets the pricing tier.
    #[must_use]
    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.config.sku_name = sku.into();
        self
    }

    /// Sets soft-delete retention in days.
    #[must_use]
    pub const fn soft_delete_retention_days(mut self, days: u32) -> Self {
        self.config.soft_delete_retention_days = days;
        self
    }

    /// Switches to legacy access policies.
    #[must_use]
    pub const fn access_policy_mode(mut self) -> Self {
        self.config.enable_rbac_authorization = false;
        self
    }

    /// Adds an access policy, used when RBAC is disabled.
    #[must_use]
    pub fn access_policy(mut self, key: impl Into<String>, policy: AccessPolicyConfig) -> Self {
        let _ = self.config.access_policies.insert(key.into(), policy);
        self
    }

    /// Binds a principal to a role class, used when RBAC is enabled.
    #[must_use]
    pub fn role(mut self, class: RoleClass, principal: impl Into<String>) -> Self {
        self.config
            .role_assignments
            .principals_mut(class)
            .push(principal.into());
        self
    }

    /// Sets the principal applying the configuration.
    #[must_use]
    pub fn deployer(mut self, object_id: impl Into<String>) -> Self {
        self.config.deployer_object_id = Some(object_id.into());
        self
    }

    /// Adds an allowed IPv4 address or CIDR block.
    #[must_use]
    pub fn allow_ip(mut self, rule: impl Into<String>) -> Self {
        self.config.ip_rules.push(rule.into());
        self
    }

    /// Adds an allowed subnet.
    #[must_use]
    pub fn allow_subnet(mut self, subnet_id: impl Into<String>) -> Self {
        let _ = self.config.subnet_ids.insert(subnet_id.into());
        self
    }

    /// Adds a key.
    #[must_use]
    pub fn key(mut self, map_key: impl Into<String>, key: KeyConfig) -> Self {
        let _ = self.config.keys.insert(map_key.into(), key);
        self
    }

    /// Adds a secret.
    #[must_use]
    pub fn secret(mut self, map_key: impl Into<String>, secret: SecretConfig) -> Self {
        let _ = self.config.secrets.insert(map_key.into(), secret);
        self
    }

    /// Adds a certificate.
    #[must_use]
    pub fn certificate(mut self, map_key: impl Into<String>, certificate: CertificateConfig) -> Self {
        let _ = self.config.certificates.insert(map_key.into(), certificate);
        self
    }

    /// Adds a certificate contact.
    #[must_use]
    pub fn contact(mut self, contact: ContactConfig) -> Self {
        self.config.contacts.push(contact);
        self
    }

    /// Enables the private endpoint in `subnet_id`.
    #[must_use]
    pub fn private_endpoint(mut self, subnet_id: impl Into<String>, dns_zone_ids: Option<Vec<String>>) -> Self {
        self.config.enable_private_endpoint = true;
        self.config.private_endpoint_subnet_id = Some(subnet_id.into());
        self.config.private_dns_zone_ids = dns_zone_ids;
        self
    }

    /// Enables diagnostic settings shipping to `workspace_id`.
    #[must_use]
    pub fn diagnostics(mut self, workspace_id: impl Into<String>) -> Self {
        self.config.enable_diagnostic_settings = true;
        self.config.log_analytics_workspace_id = Some(workspace_id.into());
        self
    }

    /// Enables the management lock at `level`.
    #[must_use]
    pub fn lock(mut self, level: impl Into<String>) -> Self {
        self.config.enable_resource_lock = true;
        self.config.resource_lock_level = level.into();
        self
    }

    /// Enables the built-in policy assignments, custom definitions and
    /// the initiative, scoped to `resource_group_id`.
    #[must_use]
    pub fn governance(mut self, resource_group_id: impl Into<String>) -> Self {
        self.config.enable_policy_assignments = true;
        self.config.enable_custom_policies = true;
        self.config.enable_policy_initiative = true;
        self.config.resource_group_id = Some(resource_group_id.into());
        self
    }

    /// Returns the configuration without validating it.
    #[must_use]
    pub fn build_unchecked(self) -> ModuleConfig {
        self.config
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configuration is invalid.
    pub fn build(self) -> Result<ModuleConfig> {
        let _ = validator::validate(&self.config)?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ModuleConfigBuilder {
        ModuleConfigBuilder::new("eastus", "rg-app", "tenant").environment("prod", "eus")
    }

    #[test]
    fn builder_starts_from_hardened_defaults() {
        let config = builder().build().expect("valid");
        assert!(config.enable_rbac_authorization);
        assert!(config.purge_protection_enabled);
        assert_eq!(config.location, "eastus");
        assert_eq!(config.environment, "prod");
    }

    #[test]
    fn role_lands_in_matching_class() {
        let config = builder()
            .role(RoleClass::CryptoUsers, "app")
            .role(RoleClass::Administrators, "admin")
            .build_unchecked();
        assert_eq!(config.role_assignments.crypto_users, vec!["app"]);
        assert_eq!(config.role_assignments.administrators, vec!["admin"]);
    }

    #[test]
    fn build_rejects_invalid_retention() {
        let err = builder().soft_delete_retention_days(120).build().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn diagnostics_sets_switch_and_workspace() {
        let config = builder()
            .diagnostics("/subscriptions/0/resourceGroups/ops/providers/Microsoft.OperationalInsights/workspaces/law")
            .build()
            .expect("valid");
        assert!(config.enable_diagnostic_settings);
        assert!(config.log_analytics_workspace_id.is_some());
    }
}
