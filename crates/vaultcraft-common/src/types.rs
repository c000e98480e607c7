//! Domain primitive types used across the Vaultcraft workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of one descriptor inside a desired resource graph.
///
/// Rendered in IaC-address style: `<kind>.<block>` for singletons and
/// `<kind>.<block>["<index>"]` for entries expanded from a mapping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalKey(String);

impl LogicalKey {
    /// Creates a logical key from a raw string value.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key of a resource that exists at most once per graph.
    #[must_use]
    pub fn singleton(kind: ResourceKind, block: &str) -> Self {
        Self(format!("{kind}.{block}"))
    }

    /// Key of a resource expanded from one entry of a mapping.
    #[must_use]
    pub fn indexed(kind: ResourceKind, block: &str, index: &str) -> Self {
        Self(format!("{kind}.{block}[\"{index}\"]"))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of managed resource kinds the engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// The key vault itself.
    KeyVault,
    /// Legacy per-principal access policy.
    AccessPolicy,
    /// RBAC role binding scoped to the vault.
    RoleAssignment,
    /// Cryptographic key.
    Key,
    /// Secret value.
    Secret,
    /// Certificate.
    Certificate,
    /// Certificate contact list.
    CertificateContacts,
    /// Private endpoint into the vault.
    PrivateEndpoint,
    /// Diagnostic setting shipping logs and metrics.
    DiagnosticSetting,
    /// Management lock on the vault.
    ManagementLock,
    /// Policy assignment at resource-group scope.
    PolicyAssignment,
    /// Custom policy definition.
    PolicyDefinition,
    /// Policy set definition (initiative).
    PolicySetDefinition,
}

impl ResourceKind {
    /// Resource type name understood by the reconciler.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeyVault => "azurerm_key_vault",
            Self::AccessPolicy => "azurerm_key_vault_access_policy",
            Self::RoleAssignment => "azurerm_role_assignment",
            Self::Key => "azurerm_key_vault_key",
            Self::Secret => "azurerm_key_vault_secret",
            Self::Certificate => "azurerm_key_vault_certificate",
            Self::CertificateContacts => "azurerm_key_vault_certificate_contacts",
            Self::PrivateEndpoint => "azurerm_private_endpoint",
            Self::DiagnosticSetting => "azurerm_monitor_diagnostic_setting",
            Self::ManagementLock => "azurerm_management_lock",
            Self::PolicyAssignment => "azurerm_resource_group_policy_assignment",
            Self::PolicyDefinition => "azurerm_policy_definition",
            Self::PolicySetDefinition => "azurerm_policy_set_definition",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declares a closed string enumeration with exact-match parsing.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted spelling, in declaration order.
            pub const VARIANTS: &'static [&'static str] = &[$($text),+];

            /// Parses an exact spelling; returns `None` for anything else.
            #[must_use]
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Returns the canonical spelling.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Vault pricing tier.
    SkuName {
        /// Software-protected keys only.
        Standard => "standard",
        /// Adds HSM-protected keys.
        Premium => "premium",
    }
}

string_enum! {
    /// Traffic allowed to bypass the network ACLs.
    NetworkBypass {
        /// No bypass.
        None => "None",
        /// Trusted platform services bypass the ACLs.
        AzureServices => "AzureServices",
    }
}

string_enum! {
    /// Action applied to traffic matching no ACL rule.
    DefaultAction {
        /// Allow unmatched traffic.
        Allow => "Allow",
        /// Deny unmatched traffic.
        Deny => "Deny",
    }
}

string_enum! {
    /// Level of the management lock.
    LockLevel {
        /// Resource can be modified but not deleted.
        CanNotDelete => "CanNotDelete",
        /// Resource can be neither modified nor deleted.
        ReadOnly => "ReadOnly",
    }
}

string_enum! {
    /// Key material type.
    KeyType {
        /// Elliptic-curve key.
        Ec => "EC",
        /// HSM-protected elliptic-curve key.
        EcHsm => "EC-HSM",
        /// RSA key.
        Rsa => "RSA",
        /// HSM-protected RSA key.
        RsaHsm => "RSA-HSM",
    }
}

impl KeyType {
    /// Returns `true` for HSM-protected key types.
    #[must_use]
    pub const fn is_hsm(self) -> bool {
        matches!(self, Self::EcHsm | Self::RsaHsm)
    }

    /// Returns `true` for RSA key types.
    #[must_use]
    pub const fn is_rsa(self) -> bool {
        matches!(self, Self::Rsa | Self::RsaHsm)
    }
}

string_enum! {
    /// Elliptic curve for EC keys.
    Curve {
        /// NIST P-256.
        P256 => "P-256",
        /// SECG secp256k1.
        P256K => "P-256K",
        /// NIST P-384.
        P384 => "P-384",
        /// NIST P-521.
        P521 => "P-521",
    }
}

string_enum! {
    /// Operation permitted on a key.
    KeyOperation {
        /// Decrypt.
        Decrypt => "decrypt",
        /// Encrypt.
        Encrypt => "encrypt",
        /// Sign.
        Sign => "sign",
        /// Unwrap a wrapped key.
        UnwrapKey => "unwrapKey",
        /// Verify a signature.
        Verify => "verify",
        /// Wrap a key.
        WrapKey => "wrapKey",
    }
}

/// One of the six RBAC role classes a principal can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleClass {
    /// Full data-plane administration.
    Administrators,
    /// Manage secrets.
    SecretsOfficers,
    /// Read secret contents.
    SecretsUsers,
    /// Manage keys.
    CryptoOfficers,
    /// Use keys for cryptographic operations.
    CryptoUsers,
    /// Manage certificates.
    CertificatesOfficers,
}

impl RoleClass {
    /// All role classes, in binding emission order.
    pub const ALL: [Self; 6] = [
        Self::Administrators,
        Self::SecretsOfficers,
        Self::SecretsUsers,
        Self::CryptoOfficers,
        Self::CryptoUsers,
        Self::CertificatesOfficers,
    ];

    /// Built-in role definition bound for this class.
    #[must_use]
    pub const fn role_name(self) -> &'static str {
        match self {
            Self::Administrators => "Key Vault Administrator",
            Self::SecretsOfficers => "Key Vault Secrets Officer",
            Self::SecretsUsers => "Key Vault Secrets User",
            Self::CryptoOfficers => "Key Vault Crypto Officer",
            Self::CryptoUsers => "Key Vault Crypto User",
            Self::CertificatesOfficers => "Key Vault Certificates Officer",
        }
    }

    /// Block name used in logical keys.
    #[must_use]
    pub const fn block(self) -> &'static str {
        match self {
            Self::Administrators => "administrators",
            Self::SecretsOfficers => "secrets_officers",
            Self::SecretsUsers => "secrets_users",
            Self::CryptoOfficers => "crypto_officers",
            Self::CryptoUsers => "crypto_users",
            Self::CertificatesOfficers => "certificates_officers",
        }
    }
}

impl fmt::Display for RoleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.block())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_key_formats() {
        assert_eq!(
            LogicalKey::singleton(ResourceKind::KeyVault, "this").as_str(),
            "azurerm_key_vault.this"
        );
        assert_eq!(
            LogicalKey::indexed(ResourceKind::Secret, "this", "db-password").as_str(),
            "azurerm_key_vault_secret.this[\"db-password\"]"
        );
    }

    #[test]
    fn string_enum_parses_exact_spelling_only() {
        assert_eq!(SkuName::parse("premium"), Some(SkuName::Premium));
        assert_eq!(SkuName::parse("Premium"), None);
        assert_eq!(LockLevel::parse("ReadOnly"), Some(LockLevel::ReadOnly));
        assert_eq!(KeyType::parse("RSA-HSM"), Some(KeyType::RsaHsm));
        assert!(KeyType::RsaHsm.is_hsm());
        assert!(!KeyType::Ec.is_rsa());
    }

    #[test]
    fn string_enum_variants_listed() {
        assert_eq!(NetworkBypass::VARIANTS, &["None", "AzureServices"]);
        assert_eq!(DefaultAction::Deny.to_string(), "Deny");
    }

    #[test]
    fn role_classes_have_fixed_role_names() {
        assert_eq!(
            RoleClass::Administrators.role_name(),
            "Key Vault Administrator"
        );
        assert_eq!(
            RoleClass::CertificatesOfficers.role_name(),
            "Key Vault Certificates Officer"
        );
        assert_eq!(RoleClass::ALL.len(), 6);
    }
}
