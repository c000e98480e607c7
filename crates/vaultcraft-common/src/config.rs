//! Module configuration model: the sole input of the composition engine.
//!
//! Every field carries a default so that a configuration file only needs to
//! state what differs from the hardened baseline. Enumerated settings are
//! kept as plain strings here and parsed by the engine's validator, so an
//! out-of-range value surfaces as a validation error naming the field.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIAGNOSTIC_LOGS, DEFAULT_DIAGNOSTIC_METRICS};

/// Root configuration of one key vault module instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ModuleConfig {
    // Identity
    /// Explicit name prefix; derived from environment and region when empty.
    pub name_prefix: String,
    /// Suffix appended to the prefix.
    pub name_suffix: String,
    /// Full vault name overriding prefix and suffix when non-empty.
    pub custom_name: String,
    /// Region of the vault.
    pub location: String,
    /// Short region code used in derived names.
    pub location_short: String,
    /// Resource group holding the vault.
    pub resource_group_name: String,
    /// Directory tenant the vault authenticates against.
    pub tenant_id: String,
    /// Deployment environment (`dev`, `prod`, ...).
    pub environment: String,
    /// Owning project.
    pub project_name: String,
    /// Creator recorded in the `CreatedBy` tag.
    pub created_by: String,
    /// Caller tags overlaid on the default tag set.
    pub additional_tags: BTreeMap<String, String>,

    // Vault policy
    /// Pricing tier, `standard` or `premium`.
    pub sku_name: String,
    /// Allow compute to retrieve certificates stored as secrets.
    pub enabled_for_deployment: bool,
    /// Allow disk encryption to retrieve secrets and unwrap keys.
    pub enabled_for_disk_encryption: bool,
    /// Allow template deployments to retrieve secrets.
    pub enabled_for_template_deployment: bool,
    /// Authorize data-plane access with role bindings instead of access policies.
    pub enable_rbac_authorization: bool,
    /// Block purging of soft-deleted objects.
    pub purge_protection_enabled: bool,
    /// Days soft-deleted objects are retained.
    pub soft_delete_retention_days: u32,
    /// Allow access from public networks.
    pub public_network_access_enabled: bool,

    // Network
    /// Attach a network ACL block to the vault.
    pub enable_network_acls: bool,
    /// Traffic allowed to bypass the ACLs.
    pub bypass: String,
    /// Action for traffic matching no rule.
    pub default_action: String,
    /// Allowed IPv4 addresses or CIDR blocks, in order.
    pub ip_rules: Vec<String>,
    /// Allowed virtual network subnets.
    pub subnet_ids: BTreeSet<String>,

    // Authorization
    /// Legacy access policies, used only when RBAC is disabled.
    pub access_policies: BTreeMap<String, AccessPolicyConfig>,
    /// Role bindings, used only when RBAC is enabled.
    pub role_assignments: RoleAssignmentsConfig,
    /// Principal applying the configuration; granted administrator rights
    /// in RBAC mode so it can write material.
    pub deployer_object_id: Option<String>,

    // Material
    /// Keys to create, by stable map key.
    pub keys: BTreeMap<String, KeyConfig>,
    /// Secrets to create, by stable map key.
    pub secrets: BTreeMap<String, SecretConfig>,
    /// Certificates to create, by stable map key.
    pub certificates: BTreeMap<String, CertificateConfig>,
    /// Certificate contacts, in order.
    pub contacts: Vec<ContactConfig>,

    // Private networking
    /// Create a private endpoint into the vault.
    pub enable_private_endpoint: bool,
    /// Subnet hosting the private endpoint.
    pub private_endpoint_subnet_id: Option<String>,
    /// Private DNS zones registered for the endpoint.
    pub private_dns_zone_ids: Option<Vec<String>>,

    // Observability
    /// Ship logs and metrics to Log Analytics.
    pub enable_diagnostic_settings: bool,
    /// Destination Log Analytics workspace.
    pub log_analytics_workspace_id: Option<String>,
    /// Log categories to enable.
    pub diagnostic_logs: BTreeSet<String>,
    /// Metric categories to enable.
    pub diagnostic_metrics: BTreeSet<String>,

    // Governance
    /// Place a management lock on the vault.
    pub enable_resource_lock: bool,
    /// Lock level, `CanNotDelete` or `ReadOnly`.
    pub resource_lock_level: String,
    /// Assign the built-in key vault policies to the resource group.
    pub enable_policy_assignments: bool,
    /// Resource group scope for policy assignments.
    pub resource_group_id: Option<String>,
    /// Create the custom audit policy definitions.
    pub enable_custom_policies: bool,
    /// Create and assign the security baseline initiative.
    pub enable_policy_initiative: bool,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            name_prefix: String::new(),
            name_suffix: String::new(),
            custom_name: String::new(),
            location: String::new(),
            location_short: String::new(),
            resource_group_name: String::new(),
            tenant_id: String::new(),
            environment: String::new(),
            project_name: String::new(),
            created_by: String::new(),
            additional_tags: BTreeMap::new(),
            sku_name: "standard".into(),
            enabled_for_deployment: false,
            enabled_for_disk_encryption: false,
            enabled_for_template_deployment: false,
            enable_rbac_authorization: true,
            purge_protection_enabled: true,
            soft_delete_retention_days: 90,
            public_network_access_enabled: false,
            enable_network_acls: true,
            bypass: "AzureServices".into(),
            default_action: "Deny".into(),
            ip_rules: Vec::new(),
            subnet_ids: BTreeSet::new(),
            access_policies: BTreeMap::new(),
            role_assignments: RoleAssignmentsConfig::default(),
            deployer_object_id: None,
            keys: BTreeMap::new(),
            secrets: BTreeMap::new(),
            certificates: BTreeMap::new(),
            contacts: Vec::new(),
            enable_private_endpoint: false,
            private_endpoint_subnet_id: None,
            private_dns_zone_ids: None,
            enable_diagnostic_settings: false,
            log_analytics_workspace_id: None,
            diagnostic_logs: DEFAULT_DIAGNOSTIC_LOGS.iter().map(|s| (*s).to_string()).collect(),
            diagnostic_metrics: DEFAULT_DIAGNOSTIC_METRICS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            enable_resource_lock: false,
            resource_lock_level: "CanNotDelete".into(),
            enable_policy_assignments: false,
            resource_group_id: None,
            enable_custom_policies: false,
            enable_policy_initiative: false,
        }
    }
}

/// A legacy access policy granting one principal a set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicyConfig {
    /// Tenant of the principal.
    pub tenant_id: String,
    /// Object id of the principal.
    pub object_id: String,
    /// Key permissions, verbatim.
    pub key_permissions: Vec<String>,
    /// Secret permissions, verbatim.
    pub secret_permissions: Vec<String>,
    /// Certificate permissions, verbatim.
    pub certificate_permissions: Vec<String>,
    /// Storage permissions, verbatim.
    pub storage_permissions: Vec<String>,
}

/// Principals to bind per RBAC role class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleAssignmentsConfig {
    /// Key Vault Administrator principals.
    pub administrators: Vec<String>,
    /// Key Vault Secrets Officer principals.
    pub secrets_officers: Vec<String>,
    /// Key Vault Secrets User principals.
    pub secrets_users: Vec<String>,
    /// Key Vault Crypto Officer principals.
    pub crypto_officers: Vec<String>,
    /// Key Vault Crypto User principals.
    pub crypto_users: Vec<String>,
    /// Key Vault Certificates Officer principals.
    pub certificates_officers: Vec<String>,
}

impl RoleAssignmentsConfig {
    /// Principals configured for a role class.
    #[must_use]
    pub fn principals(&self, class: crate::types::RoleClass) -> &[String] {
        use crate::types::RoleClass;
        match class {
            RoleClass::Administrators => &self.administrators,
            RoleClass::SecretsOfficers => &self.secrets_officers,
            RoleClass::SecretsUsers => &self.secrets_users,
            RoleClass::CryptoOfficers => &self.crypto_officers,
            RoleClass::CryptoUsers => &self.crypto_users,
            RoleClass::CertificatesOfficers => &self.certificates_officers,
        }
    }

    /// Mutable principal list of a role class.
    pub fn principals_mut(&mut self, class: crate::types::RoleClass) -> &mut Vec<String> {
        use crate::types::RoleClass;
        match class {
            RoleClass::Administrators => &mut self.administrators,
            RoleClass::SecretsOfficers => &mut self.secrets_officers,
            RoleClass::SecretsUsers => &mut self.secrets_users,
            RoleClass::CryptoOfficers => &mut self.crypto_officers,
            RoleClass::CryptoUsers => &mut self.crypto_users,
            RoleClass::CertificatesOfficers => &mut self.certificates_officers,
        }
    }
}

/// A cryptographic key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Key name inside the vault.
    pub name: String,
    /// Key type (`RSA`, `RSA-HSM`, `EC`, `EC-HSM`).
    pub key_type: String,
    /// RSA modulus size in bits.
    pub key_size: Option<u32>,
    /// Permitted key operations.
    pub key_opts: Vec<String>,
    /// Elliptic curve for EC keys.
    pub curve: Option<String>,
    /// Activation date (RFC 3339).
    pub not_before_date: Option<String>,
    /// Expiration date (RFC 3339).
    pub expiration_date: Option<String>,
    /// Automatic rotation settings.
    pub rotation_policy: Option<RotationPolicyConfig>,
    /// Tags overlaid on the base tag set.
    pub tags: BTreeMap<String, String>,
}

/// Key rotation policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationPolicyConfig {
    /// Automatic rotation trigger.
    pub automatic: Option<AutomaticRotationConfig>,
    /// ISO 8601 duration after which a key version expires.
    pub expire_after: Option<String>,
    /// ISO 8601 duration before expiry at which to notify.
    pub notify_before_expiry: Option<String>,
}

/// Trigger of an automatic key rotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomaticRotationConfig {
    /// ISO 8601 duration after creation.
    pub time_after_creation: Option<String>,
    /// ISO 8601 duration before expiry.
    pub time_before_expiry: Option<String>,
}

/// A secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    /// Secret name inside the vault.
    pub name: String,
    /// Secret value.
    pub value: String,
    /// Content type hint.
    pub content_type: Option<String>,
    /// Activation date (RFC 3339).
    pub not_before_date: Option<String>,
    /// Expiration date (RFC 3339).
    pub expiration_date: Option<String>,
    /// Tags overlaid on the base tag set.
    pub tags: BTreeMap<String, String>,
}

/// A certificate and its issuance policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConfig {
    /// Certificate name inside the vault.
    pub name: String,
    /// Issuer parameters.
    pub issuer: IssuerConfig,
    /// Key properties.
    pub key_properties: CertificateKeyProperties,
    /// Secret properties.
    pub secret_properties: CertificateSecretProperties,
    /// X.509 properties.
    pub x509_properties: X509Properties,
    /// Actions taken over the certificate lifetime.
    pub lifetime_actions: Vec<LifetimeActionConfig>,
    /// Tags overlaid on the base tag set.
    pub tags: BTreeMap<String, String>,
}

/// Certificate issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    /// Issuer name (`Self`, `Unknown`, or a configured issuer).
    pub name: String,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            name: "Self".into(),
        }
    }
}

/// Key properties of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateKeyProperties {
    /// Whether the private key is exportable.
    pub exportable: bool,
    /// Key type.
    pub key_type: String,
    /// RSA key size in bits.
    pub key_size: Option<u32>,
    /// Elliptic curve for EC keys.
    pub curve: Option<String>,
    /// Reuse the key on renewal.
    pub reuse_key: bool,
}

impl Default for CertificateKeyProperties {
    fn default() -> Self {
        Self {
            exportable: true,
            key_type: "RSA".into(),
            key_size: Some(2048),
            curve: None,
            reuse_key: true,
        }
    }
}

/// Secret properties of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateSecretProperties {
    /// Content type of the backing secret.
    pub content_type: String,
}

impl Default for CertificateSecretProperties {
    fn default() -> Self {
        Self {
            content_type: "application/x-pkcs12".into(),
        }
    }
}

/// X.509 properties of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct X509Properties {
    /// Subject distinguished name.
    pub subject: String,
    /// Validity period in months.
    pub validity_in_months: u32,
    /// Key usages.
    pub key_usage: Vec<String>,
    /// Extended key usage OIDs.
    pub extended_key_usage: Vec<String>,
    /// Subject alternative names.
    pub subject_alternative_names: Option<SubjectAlternativeNames>,
}

impl Default for X509Properties {
    fn default() -> Self {
        Self {
            subject: String::new(),
            validity_in_months: 12,
            key_usage: Vec::new(),
            extended_key_usage: Vec::new(),
            subject_alternative_names: None,
        }
    }
}

/// Subject alternative names; each list defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectAlternativeNames {
    /// DNS names.
    pub dns_names: Vec<String>,
    /// Email addresses.
    pub emails: Vec<String>,
    /// User principal names.
    pub upns: Vec<String>,
}

/// An action triggered during a certificate's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifetimeActionConfig {
    /// `AutoRenew` or `EmailContacts`.
    pub action_type: String,
    /// Trigger this many days before expiry.
    pub days_before_expiry: Option<u32>,
    /// Trigger at this percentage of the lifetime.
    pub lifetime_percentage: Option<u32>,
}

impl Default for LifetimeActionConfig {
    fn default() -> Self {
        Self {
            action_type: "AutoRenew".into(),
            days_before_expiry: Some(30),
            lifetime_percentage: None,
        }
    }
}

/// A certificate contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Contact email address.
    pub email: String,
    /// Contact name.
    pub name: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
}
