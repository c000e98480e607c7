//! Static validation of a module configuration.
//!
//! Runs before any descriptor is built. Enumerated settings are parsed into
//! their typed form here, so the rest of the engine never sees raw strings
//! for them.

use vaultcraft_common::config::{KeyConfig, ModuleConfig};
use vaultcraft_common::constants::{
    MAX_SOFT_DELETE_RETENTION_DAYS, MAX_VAULT_NAME_LENGTH, MIN_SOFT_DELETE_RETENTION_DAYS,
    MIN_VAULT_NAME_LENGTH,
};
use vaultcraft_common::error::{Result, VaultcraftError};
use vaultcraft_common::types::{
    Curve, DefaultAction, KeyOperation, KeyType, LockLevel, NetworkBypass, SkuName,
};

use crate::resource_id::{parse_ip_rule, parse_resource_id};

const RSA_KEY_SIZES: [u32; 3] = [2048, 3072, 4096];

const SUBNET_TYPE: &str = "Microsoft.Network/virtualNetworks/subnets";
const DNS_ZONE_TYPE: &str = "Microsoft.Network/privateDnsZones";
const WORKSPACE_TYPE: &str = "Microsoft.OperationalInsights/workspaces";

/// A configuration that passed validation, with its enumerations parsed.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedConfig<'a> {
    /// The underlying configuration.
    pub config: &'a ModuleConfig,
    /// Pricing tier.
    pub sku: SkuName,
    /// Network bypass setting.
    pub bypass: NetworkBypass,
    /// Default network action.
    pub default_action: DefaultAction,
    /// Management lock level.
    pub lock_level: LockLevel,
}

/// Validates a module configuration.
///
/// # Checks performed
///
/// 1. SKU, network bypass, default action and lock level are in their
///    enumerated sets.
/// 2. Soft-delete retention lies in `[7, 90]`.
/// 3. An explicit `custom_name` is a legal vault name. Derived names are
///    never rejected.
/// 4. IP rules are IPv4 addresses or CIDR blocks; resource references parse
///    and address the expected resource type.
/// 5. Each enabled feature has the inputs it needs.
/// 6. Keys and certificates use supported types, sizes, curves and options.
///
/// # Errors
///
/// Returns [`VaultcraftError::Validation`] for the first failed check.
pub fn validate(config: &ModuleConfig) -> Result<ValidatedConfig<'_>> {
    tracing::info!("validating module configuration");
    let sku = parse_enum("sku_name", &config.sku_name, SkuName::parse, SkuName::VARIANTS)?;
    let bypass = parse_enum(
        "bypass",
        &config.bypass,
        NetworkBypass::parse,
        NetworkBypass::VARIANTS,
    )?;
    let default_action = parse_enum(
        "default_action",
        &config.default_action,
        DefaultAction::parse,
        DefaultAction::VARIANTS,
    )?;
    let lock_level = parse_enum(
        "resource_lock_level",
        &config.resource_lock_level,
        LockLevel::parse,
        LockLevel::VARIANTS,
    )?;

    check_retention(config)?;
    if !config.custom_name.is_empty() {
        check_vault_name(&config.custom_name)?;
    }
    check_network(config)?;
    check_feature_inputs(config)?;
    check_keys(config, sku)?;
    check_certificates(config)?;

    Ok(ValidatedConfig {
        config,
        sku,
        bypass,
        default_action,
        lock_level,
    })
}

fn parse_enum<T>(
    field: &str,
    value: &str,
    parse: fn(&str) -> Option<T>,
    variants: &[&str],
) -> Result<T> {
    parse(value).ok_or_else(|| {
        VaultcraftError::validation(
            field,
            format!("\"{value}\" is not one of: {}", variants.join(", ")),
        )
    })
}

fn check_retention(config: &ModuleConfig) -> Result<()> {
    let days = config.soft_delete_retention_days;
    if !(MIN_SOFT_DELETE_RETENTION_DAYS..=MAX_SOFT_DELETE_RETENTION_DAYS).contains(&days) {
        return Err(VaultcraftError::validation(
            "soft_delete_retention_days",
            format!(
                "{days} is outside [{MIN_SOFT_DELETE_RETENTION_DAYS}, {MAX_SOFT_DELETE_RETENTION_DAYS}]"
            ),
        ));
    }
    Ok(())
}

fn check_vault_name(name: &str) -> Result<()> {
    let invalid = |message: String| Err(VaultcraftError::validation("custom_name", message));
    if !(MIN_VAULT_NAME_LENGTH..=MAX_VAULT_NAME_LENGTH).contains(&name.len()) {
        return invalid(format!(
            "\"{name}\" must be {MIN_VAULT_NAME_LENGTH}-{MAX_VAULT_NAME_LENGTH} characters long"
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return invalid(format!(
            "\"{name}\" may only contain alphanumerics and hyphens"
        ));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return invalid(format!("\"{name}\" must start with a letter"));
    }
    if name.ends_with('-') || name.contains("--") {
        return invalid(format!(
            "\"{name}\" must not end with a hyphen or contain consecutive hyphens"
        ));
    }
    Ok(())
}

fn check_resource_id(field: &str, value: &str, expected_type: &str) -> Result<()> {
    let Some(id) = parse_resource_id(value) else {
        return Err(VaultcraftError::validation(
            field,
            format!("\"{value}\" is not a resource identifier"),
        ));
    };
    let matches = id
        .resource_type()
        .is_some_and(|t| t.eq_ignore_ascii_case(expected_type));
    if !matches {
        return Err(VaultcraftError::validation(
            field,
            format!("\"{value}\" is not a {expected_type} identifier"),
        ));
    }
    Ok(())
}

fn check_network(config: &ModuleConfig) -> Result<()> {
    for rule in &config.ip_rules {
        if parse_ip_rule(rule).is_none() {
            return Err(VaultcraftError::validation(
                "ip_rules",
                format!("\"{rule}\" is not an IPv4 address or CIDR block"),
            ));
        }
    }
    for subnet in &config.subnet_ids {
        check_resource_id("subnet_ids", subnet, SUBNET_TYPE)?;
    }
    Ok(())
}

fn require<'a>(field: &str, value: Option<&'a String>, feature: &str) -> Result<&'a str> {
    match value.map(String::as_str) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(VaultcraftError::validation(
            field,
            format!("required when {feature} is enabled"),
        )),
    }
}

fn check_feature_inputs(config: &ModuleConfig) -> Result<()> {
    if config.enable_private_endpoint {
        let subnet = require(
            "private_endpoint_subnet_id",
            config.private_endpoint_subnet_id.as_ref(),
            "enable_private_endpoint",
        )?;
        check_resource_id("private_endpoint_subnet_id", subnet, SUBNET_TYPE)?;
        for zone in config.private_dns_zone_ids.iter().flatten() {
            check_resource_id("private_dns_zone_ids", zone, DNS_ZONE_TYPE)?;
        }
    }

    if config.enable_diagnostic_settings {
        let workspace = require(
            "log_analytics_workspace_id",
            config.log_analytics_workspace_id.as_ref(),
            "enable_diagnostic_settings",
        )?;
        check_resource_id("log_analytics_workspace_id", workspace, WORKSPACE_TYPE)?;
    }

    for (enabled, feature) in [
        (config.enable_policy_assignments, "enable_policy_assignments"),
        (config.enable_policy_initiative, "enable_policy_initiative"),
    ] {
        if !enabled {
            continue;
        }
        let scope = require("resource_group_id", config.resource_group_id.as_ref(), feature)?;
        let scope_ok = parse_resource_id(scope).is_some_and(|id| id.is_resource_group());
        if !scope_ok {
            return Err(VaultcraftError::validation(
                "resource_group_id",
                format!("\"{scope}\" is not a resource group identifier"),
            ));
        }
        let workspace = require(
            "log_analytics_workspace_id",
            config.log_analytics_workspace_id.as_ref(),
            feature,
        )?;
        check_resource_id("log_analytics_workspace_id", workspace, WORKSPACE_TYPE)?;
    }
    Ok(())
}

fn check_keys(config: &ModuleConfig, sku: SkuName) -> Result<()> {
    for (map_key, key) in &config.keys {
        let field = format!("keys.{map_key}");
        let key_type = parse_enum(
            &format!("{field}.key_type"),
            &key.key_type,
            KeyType::parse,
            KeyType::VARIANTS,
        )?;
        if key_type.is_hsm() && sku != SkuName::Premium {
            return Err(VaultcraftError::validation(
                format!("{field}.key_type"),
                format!("{key_type} keys require the premium SKU"),
            ));
        }
        check_key_shape(&field, key, key_type)?;
        for opt in &key.key_opts {
            let _ = parse_enum(
                &format!("{field}.key_opts"),
                opt,
                KeyOperation::parse,
                KeyOperation::VARIANTS,
            )?;
        }
    }
    Ok(())
}

fn check_key_shape(field: &str, key: &KeyConfig, key_type: KeyType) -> Result<()> {
    if key_type.is_rsa() {
        if let Some(size) = key.key_size {
            check_rsa_size(&format!("{field}.key_size"), size)?;
        }
    } else if let Some(curve) = &key.curve {
        let _ = parse_enum(
            &format!("{field}.curve"),
            curve,
            Curve::parse,
            Curve::VARIANTS,
        )?;
    }
    Ok(())
}

fn check_rsa_size(field: &str, size: u32) -> Result<()> {
    if !RSA_KEY_SIZES.contains(&size) {
        return Err(VaultcraftError::validation(
            field,
            format!("RSA key size {size} is not one of 2048, 3072, 4096"),
        ));
    }
    Ok(())
}

fn check_certificates(config: &ModuleConfig) -> Result<()> {
    for (map_key, cert) in &config.certificates {
        let field = format!("certificates.{map_key}");
        let key_type = parse_enum(
            &format!("{field}.key_properties.key_type"),
            &cert.key_properties.key_type,
            KeyType::parse,
            KeyType::VARIANTS,
        )?;
        if key_type.is_rsa() {
            if let Some(size) = cert.key_properties.key_size {
                check_rsa_size(&format!("{field}.key_properties.key_size"), size)?;
            }
        } else if let Some(curve) = &cert.key_properties.curve {
            let _ = parse_enum(
                &format!("{field}.key_properties.curve"),
                curve,
                Curve::parse,
                Curve::VARIANTS,
            )?;
        }
        if cert.x509_properties.validity_in_months == 0 {
            return Err(VaultcraftError::validation(
                format!("{field}.x509_properties.validity_in_months"),
                "must be greater than zero",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use vaultcraft_common::config::CertificateConfig;

    use super::*;

    const WORKSPACE: &str = "/subscriptions/0000/resourceGroups/rg-ops/providers/Microsoft.OperationalInsights/workspaces/law-ops";
    const SUBNET: &str = "/subscriptions/0000/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vnet/subnets/snet";
    const RESOURCE_GROUP: &str = "/subscriptions/0000/resourceGroups/rg-app";

    fn base() -> ModuleConfig {
        ModuleConfig {
            environment: "prod".into(),
            location_short: "eus".into(),
            name_suffix: "01".into(),
            ..ModuleConfig::default()
        }
    }

    fn field_of(err: &VaultcraftError) -> String {
        match err {
            VaultcraftError::Validation { field, .. } => field.clone(),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn validate_default_config_succeeds() {
        let config = base();
        let validated = validate(&config).expect("should validate");
        assert_eq!(validated.sku, SkuName::Standard);
        assert_eq!(validated.bypass, NetworkBypass::AzureServices);
        assert_eq!(validated.default_action, DefaultAction::Deny);
        assert_eq!(validated.lock_level, LockLevel::CanNotDelete);
    }

    #[test]
    fn validate_unknown_sku_fails() {
        let config = ModuleConfig {
            sku_name: "basic".into(),
            ..base()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(field_of(&err), "sku_name");
        assert!(err.to_string().contains("standard, premium"), "got: {err}");
    }

    #[test]
    fn validate_retention_bounds() {
        for (days, ok) in [(6, false), (7, true), (90, true), (91, false)] {
            let config = ModuleConfig {
                soft_delete_retention_days: days,
                ..base()
            };
            assert_eq!(validate(&config).is_ok(), ok, "retention {days}");
        }
    }

    #[test]
    fn validate_enumerated_network_and_lock_settings() {
        let bad_bypass = ModuleConfig {
            bypass: "Everything".into(),
            ..base()
        };
        assert_eq!(field_of(&validate(&bad_bypass).unwrap_err()), "bypass");

        let bad_action = ModuleConfig {
            default_action: "deny".into(),
            ..base()
        };
        assert_eq!(
            field_of(&validate(&bad_action).unwrap_err()),
            "default_action"
        );

        let bad_lock = ModuleConfig {
            resource_lock_level: "NoDelete".into(),
            ..base()
        };
        assert_eq!(
            field_of(&validate(&bad_lock).unwrap_err()),
            "resource_lock_level"
        );
    }

    #[test]
    fn validate_vault_name_rules() {
        for bad in ["kv", "1kv-app", "kv_app", "kv--app", "kv-app-", "kv-this-name-is-far-too-long"] {
            let config = ModuleConfig {
                custom_name: bad.into(),
                ..base()
            };
            let err = validate(&config).unwrap_err();
            assert_eq!(field_of(&err), "custom_name", "name {bad}");
        }
    }

    #[test]
    fn validate_accepts_any_derived_name() {
        let config = ModuleConfig {
            soft_delete_retention_days: 7,
            ..ModuleConfig::default()
        };
        assert_eq!(crate::naming::vault_name(&config), "kv--");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_ip_rules_and_subnets() {
        let config = ModuleConfig {
            ip_rules: vec!["10.0.0.0/8".into(), "not-an-ip".into()],
            ..base()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("not-an-ip"), "got: {err}");

        let mut config = base();
        let _ = config.subnet_ids.insert("subnet-1".into());
        assert_eq!(field_of(&validate(&config).unwrap_err()), "subnet_ids");
    }

    #[test]
    fn validate_private_endpoint_requires_subnet() {
        let mut config = ModuleConfig {
            enable_private_endpoint: true,
            ..base()
        };
        assert_eq!(
            field_of(&validate(&config).unwrap_err()),
            "private_endpoint_subnet_id"
        );
        config.private_endpoint_subnet_id = Some(WORKSPACE.into());
        let err = validate(&config).unwrap_err();
        assert_eq!(field_of(&err), "private_endpoint_subnet_id");
        assert!(err.to_string().contains(SUBNET_TYPE), "got: {err}");
        config.private_endpoint_subnet_id = Some(SUBNET.into());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_diagnostics_requires_workspace() {
        let mut config = ModuleConfig {
            enable_diagnostic_settings: true,
            ..base()
        };
        assert_eq!(
            field_of(&validate(&config).unwrap_err()),
            "log_analytics_workspace_id"
        );
        config.log_analytics_workspace_id = Some(SUBNET.into());
        assert_eq!(
            field_of(&validate(&config).unwrap_err()),
            "log_analytics_workspace_id"
        );
        config.log_analytics_workspace_id = Some(WORKSPACE.into());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_policy_assignments_require_group_scope() {
        let mut config = ModuleConfig {
            enable_policy_assignments: true,
            log_analytics_workspace_id: Some(WORKSPACE.into()),
            resource_group_id: Some(SUBNET.into()),
            ..base()
        };
        assert_eq!(
            field_of(&validate(&config).unwrap_err()),
            "resource_group_id"
        );
        config.resource_group_id = Some(RESOURCE_GROUP.into());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_hsm_keys_need_premium() {
        let mut config = base();
        let _ = config.keys.insert(
            "cmk".into(),
            KeyConfig {
                name: "cmk".into(),
                key_type: "RSA-HSM".into(),
                key_size: Some(2048),
                ..KeyConfig::default()
            },
        );
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("premium"), "got: {err}");
        config.sku_name = "premium".into();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_key_shape() {
        let mut config = base();
        let _ = config.keys.insert(
            "rsa".into(),
            KeyConfig {
                name: "rsa".into(),
                key_type: "RSA".into(),
                key_size: Some(1024),
                ..KeyConfig::default()
            },
        );
        assert_eq!(
            field_of(&validate(&config).unwrap_err()),
            "keys.rsa.key_size"
        );

        let mut config = base();
        let _ = config.keys.insert(
            "ec".into(),
            KeyConfig {
                name: "ec".into(),
                key_type: "EC".into(),
                curve: Some("P-999".into()),
                ..KeyConfig::default()
            },
        );
        assert_eq!(field_of(&validate(&config).unwrap_err()), "keys.ec.curve");

        let mut config = base();
        let _ = config.keys.insert(
            "ops".into(),
            KeyConfig {
                name: "ops".into(),
                key_type: "RSA".into(),
                key_opts: vec!["sign".into(), "explode".into()],
                ..KeyConfig::default()
            },
        );
        assert_eq!(
            field_of(&validate(&config).unwrap_err()),
            "keys.ops.key_opts"
        );
    }

    #[test]
    fn validate_certificate_validity() {
        let mut cert = CertificateConfig::default();
        cert.name = "tls".into();
        cert.x509_properties.validity_in_months = 0;
        let mut config = base();
        let _ = config.certificates.insert("tls".into(), cert);
        assert_eq!(
            field_of(&validate(&config).unwrap_err()),
            "certificates.tls.x509_properties.validity_in_months"
        );
    }

    #[test]
    fn validate_certificate_curve() {
        let mut cert = CertificateConfig::default();
        cert.name = "ec".into();
        cert.key_properties.key_type = "EC".into();
        cert.key_properties.curve = Some("P-999".into());
        let mut config = base();
        let _ = config.certificates.insert("ec".into(), cert.clone());
        assert_eq!(
            field_of(&validate(&config).unwrap_err()),
            "certificates.ec.key_properties.curve"
        );

        cert.key_properties.curve = Some("P-256".into());
        let _ = config.certificates.insert("ec".into(), cert);
        assert!(validate(&config).is_ok());
    }
}
