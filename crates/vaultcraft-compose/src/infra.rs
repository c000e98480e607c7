//! The vault descriptor and the infrastructure resources hanging off it.
//!
//! Each conditional resource is emitted only when its switch is on; there
//! are no placeholder descriptors for disabled features.

use vaultcraft_common::constants::{
    LOCK_NOTES, PRIVATE_DNS_ZONE_GROUP_NAME, PRIVATE_ENDPOINT_SUBRESOURCE, SINGLETON_BLOCK,
};
use vaultcraft_common::types::{LogicalKey, ResourceKind};

use crate::descriptor::{AttrValue, Descriptor, ResourceRef};
use crate::naming::{DerivedNames, Tags};
use crate::validator::ValidatedConfig;

/// Logical key of the vault.
#[must_use]
pub fn vault_key() -> LogicalKey {
    LogicalKey::singleton(ResourceKind::KeyVault, SINGLETON_BLOCK)
}

/// Builds the vault descriptor, including its network ACL block when enabled.
#[must_use]
pub fn vault(validated: &ValidatedConfig<'_>, names: &DerivedNames, tags: &Tags) -> Descriptor {
    let config = validated.config;
    let descriptor = Descriptor::new(vault_key(), ResourceKind::KeyVault)
        .attr("name", &names.vault)
        .attr("location", &config.location)
        .attr("resource_group_name", &config.resource_group_name)
        .attr("tenant_id", &config.tenant_id)
        .attr("sku_name", validated.sku.as_str())
        .attr("enabled_for_deployment", config.enabled_for_deployment)
        .attr(
            "enabled_for_disk_encryption",
            config.enabled_for_disk_encryption,
        )
        .attr(
            "enabled_for_template_deployment",
            config.enabled_for_template_deployment,
        )
        .attr("enable_rbac_authorization", config.enable_rbac_authorization)
        .attr("purge_protection_enabled", config.purge_protection_enabled)
        .attr(
            "soft_delete_retention_days",
            config.soft_delete_retention_days,
        )
        .attr(
            "public_network_access_enabled",
            config.public_network_access_enabled,
        )
        .attr("tags", AttrValue::string_map(tags));

    if !config.enable_network_acls {
        return descriptor;
    }
    descriptor.attr(
        "network_acls",
        AttrValue::block([
            ("bypass", AttrValue::from(validated.bypass.as_str())),
            (
                "default_action",
                AttrValue::from(validated.default_action.as_str()),
            ),
            ("ip_rules", AttrValue::strings(&config.ip_rules)),
            (
                "virtual_network_subnet_ids",
                AttrValue::strings(&config.subnet_ids),
            ),
        ]),
    )
}

/// Builds every enabled infrastructure descriptor attached to the vault.
#[must_use]
pub fn expand(
    validated: &ValidatedConfig<'_>,
    vault: &LogicalKey,
    names: &DerivedNames,
    tags: &Tags,
) -> Vec<Descriptor> {
    let config = validated.config;
    let mut descriptors = Vec::new();

    if config.enable_private_endpoint {
        descriptors.push(private_endpoint(validated, vault, names, tags));
    }
    if config.enable_diagnostic_settings {
        descriptors.push(diagnostic_setting(validated, vault, names));
    }
    if config.enable_resource_lock {
        descriptors.push(
            Descriptor::new(
                LogicalKey::singleton(ResourceKind::ManagementLock, SINGLETON_BLOCK),
                ResourceKind::ManagementLock,
            )
            .attr("name", names.lock())
            .attr("scope", ResourceRef::id(vault))
            .attr("lock_level", validated.lock_level.as_str())
            .attr("notes", LOCK_NOTES)
            .depends_on(vault),
        );
    }

    tracing::debug!(count = descriptors.len(), "expanded vault infrastructure");
    descriptors
}

fn private_endpoint(
    validated: &ValidatedConfig<'_>,
    vault: &LogicalKey,
    names: &DerivedNames,
    tags: &Tags,
) -> Descriptor {
    let config = validated.config;
    let connection = AttrValue::block([
        ("name", AttrValue::from(names.private_service_connection())),
        (
            "private_connection_resource_id",
            AttrValue::Ref(ResourceRef::id(vault)),
        ),
        (
            "subresource_names",
            AttrValue::strings([PRIVATE_ENDPOINT_SUBRESOURCE]),
        ),
        ("is_manual_connection", AttrValue::from(false)),
    ]);

    let descriptor = Descriptor::new(
        LogicalKey::singleton(ResourceKind::PrivateEndpoint, SINGLETON_BLOCK),
        ResourceKind::PrivateEndpoint,
    )
    .attr("name", names.private_endpoint())
    .attr("location", &config.location)
    .attr("resource_group_name", &config.resource_group_name)
    .attr("subnet_id", config.private_endpoint_subnet_id.as_ref())
    .attr("private_service_connection", connection)
    .attr("tags", AttrValue::string_map(tags))
    .depends_on(vault);

    match &config.private_dns_zone_ids {
        Some(zones) => descriptor.attr(
            "private_dns_zone_group",
            AttrValue::block([
                ("name", AttrValue::from(PRIVATE_DNS_ZONE_GROUP_NAME)),
                ("private_dns_zone_ids", AttrValue::strings(zones)),
            ]),
        ),
        None => descriptor,
    }
}

fn diagnostic_setting(
    validated: &ValidatedConfig<'_>,
    vault: &LogicalKey,
    names: &DerivedNames,
) -> Descriptor {
    let config = validated.config;
    let logs = config
        .diagnostic_logs
        .iter()
        .map(|category| AttrValue::block([("category", AttrValue::from(category))]))
        .collect();
    let metrics = config
        .diagnostic_metrics
        .iter()
        .map(|category| {
            AttrValue::block([
                ("category", AttrValue::from(category)),
                ("enabled", AttrValue::from(true)),
            ])
        })
        .collect();

    Descriptor::new(
        LogicalKey::singleton(ResourceKind::DiagnosticSetting, SINGLETON_BLOCK),
        ResourceKind::DiagnosticSetting,
    )
    .attr("name", names.diagnostic_setting())
    .attr("target_resource_id", ResourceRef::id(vault))
    .attr(
        "log_analytics_workspace_id",
        config.log_analytics_workspace_id.as_ref(),
    )
    .attr("enabled_log", AttrValue::List(logs))
    .attr("metric", AttrValue::List(metrics))
    .depends_on(vault)
}

#[cfg(test)]
mod tests {
    use vaultcraft_common::config::ModuleConfig;

    use super::*;
    use crate::validator::validate;

    const SUBNET: &str = "/subscriptions/0000/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vnet/subnets/snet";
    const ZONE: &str = "/subscriptions/0000/resourceGroups/rg-dns/providers/Microsoft.Network/privateDnsZones/privatelink.vaultcore.azure.net";
    const WORKSPACE: &str = "/subscriptions/0000/resourceGroups/rg-ops/providers/Microsoft.OperationalInsights/workspaces/law";

    fn config() -> ModuleConfig {
        ModuleConfig {
            custom_name: "kv-infra".into(),
            location: "eastus".into(),
            resource_group_name: "rg-app".into(),
            ..ModuleConfig::default()
        }
    }

    fn names() -> DerivedNames {
        DerivedNames::new("kv-infra".into())
    }

    #[test]
    fn vault_copies_policy_fields() {
        let config = ModuleConfig {
            sku_name: "premium".into(),
            soft_delete_retention_days: 7,
            ..config()
        };
        let validated = validate(&config).expect("valid");
        let vault = vault(&validated, &names(), &Tags::new());
        assert_eq!(vault.get_str("name"), Some("kv-infra"));
        assert_eq!(vault.get_str("sku_name"), Some("premium"));
        assert_eq!(vault.get("soft_delete_retention_days"), Some(&AttrValue::Int(7)));
        assert_eq!(
            vault.get("enable_rbac_authorization"),
            Some(&AttrValue::Bool(true))
        );
        assert!(vault.depends_on.is_empty());
    }

    #[test]
    fn network_acls_copied_verbatim_when_enabled() {
        let mut config = ModuleConfig {
            ip_rules: vec!["203.0.113.7".into(), "10.0.0.0/8".into()],
            bypass: "None".into(),
            default_action: "Allow".into(),
            ..config()
        };
        let _ = config.subnet_ids.insert(SUBNET.into());
        let validated = validate(&config).expect("valid");
        let vault = vault(&validated, &names(), &Tags::new());
        let acls = vault
            .get("network_acls")
            .and_then(AttrValue::as_map)
            .expect("acls");
        assert_eq!(acls["bypass"], AttrValue::from("None"));
        assert_eq!(acls["default_action"], AttrValue::from("Allow"));
        assert_eq!(
            acls["ip_rules"],
            AttrValue::strings(["203.0.113.7", "10.0.0.0/8"])
        );
        assert_eq!(acls["virtual_network_subnet_ids"], AttrValue::strings([SUBNET]));
    }

    #[test]
    fn network_acls_absent_when_disabled() {
        let config = ModuleConfig {
            enable_network_acls: false,
            ..config()
        };
        let validated = validate(&config).expect("valid");
        assert!(vault(&validated, &names(), &Tags::new()).get("network_acls").is_none());
    }

    #[test]
    fn nothing_emitted_by_default() {
        let config = config();
        let validated = validate(&config).expect("valid");
        assert!(expand(&validated, &vault_key(), &names(), &Tags::new()).is_empty());
    }

    #[test]
    fn private_endpoint_with_and_without_dns_zones() {
        let mut config = ModuleConfig {
            enable_private_endpoint: true,
            private_endpoint_subnet_id: Some(SUBNET.into()),
            ..config()
        };
        let validated = validate(&config).expect("valid");
        let out = expand(&validated, &vault_key(), &names(), &Tags::new());
        assert_eq!(out.len(), 1);
        let pe = &out[0];
        assert_eq!(pe.kind, ResourceKind::PrivateEndpoint);
        assert_eq!(pe.get_str("name"), Some("kv-infra-pe"));
        assert!(pe.get("private_dns_zone_group").is_none());
        let psc = pe
            .get("private_service_connection")
            .and_then(AttrValue::as_map)
            .expect("connection");
        assert_eq!(psc["subresource_names"], AttrValue::strings(["vault"]));
        assert!(pe.depends_on.contains(&vault_key()));

        config.private_dns_zone_ids = Some(vec![ZONE.into()]);
        let validated = validate(&config).expect("valid");
        let out = expand(&validated, &vault_key(), &names(), &Tags::new());
        let group = out[0]
            .get("private_dns_zone_group")
            .and_then(AttrValue::as_map)
            .expect("zone group");
        assert_eq!(group["private_dns_zone_ids"], AttrValue::strings([ZONE]));
    }

    #[test]
    fn diagnostic_setting_entries_per_category() {
        let config = ModuleConfig {
            enable_diagnostic_settings: true,
            log_analytics_workspace_id: Some(WORKSPACE.into()),
            ..config()
        };
        let validated = validate(&config).expect("valid");
        let out = expand(&validated, &vault_key(), &names(), &Tags::new());
        let diag = &out[0];
        assert_eq!(diag.kind, ResourceKind::DiagnosticSetting);
        let logs = diag.get("enabled_log").and_then(AttrValue::as_list).expect("logs");
        assert_eq!(logs.len(), 2);
        let metrics = diag.get("metric").and_then(AttrValue::as_list).expect("metrics");
        assert_eq!(metrics.len(), 1);
        let metric = metrics[0].as_map().expect("metric");
        assert_eq!(metric["category"], AttrValue::from("AllMetrics"));
        assert_eq!(metric["enabled"], AttrValue::Bool(true));
    }

    #[test]
    fn lock_uses_level_and_fixed_notes() {
        let config = ModuleConfig {
            enable_resource_lock: true,
            resource_lock_level: "ReadOnly".into(),
            ..config()
        };
        let validated = validate(&config).expect("valid");
        let out = expand(&validated, &vault_key(), &names(), &Tags::new());
        let lock = &out[0];
        assert_eq!(lock.kind, ResourceKind::ManagementLock);
        assert_eq!(lock.get_str("lock_level"), Some("ReadOnly"));
        assert_eq!(lock.get_str("notes"), Some(LOCK_NOTES));
    }
}
