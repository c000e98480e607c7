//! System-wide constants and defaults.

/// Value of the `ManagedBy` tag stamped on every taggable resource.
pub const MANAGED_BY: &str = "Terraform";

/// Value of the `Module` tag stamped on every taggable resource.
pub const MODULE_NAME: &str = "azure-key-vault-module";

/// Prefix used to derive the vault name when no prefix is configured.
pub const DEFAULT_NAME_PREFIX: &str = "kv";

/// Tag key carrying the deployment environment.
pub const TAG_ENVIRONMENT: &str = "Environment";
/// Tag key carrying the project name.
pub const TAG_PROJECT: &str = "Project";
/// Tag key carrying the managing tool.
pub const TAG_MANAGED_BY: &str = "ManagedBy";
/// Tag key carrying the module name.
pub const TAG_MODULE: &str = "Module";
/// Tag key carrying the composition date (`YYYY-MM-DD`).
pub const TAG_CREATED_DATE: &str = "CreatedDate";
/// Tag key carrying the creator.
pub const TAG_CREATED_BY: &str = "CreatedBy";

/// Date format of the `CreatedDate` tag.
pub const CREATED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Lower bound (inclusive) for soft-delete retention.
pub const MIN_SOFT_DELETE_RETENTION_DAYS: u32 = 7;
/// Upper bound (inclusive) for soft-delete retention.
pub const MAX_SOFT_DELETE_RETENTION_DAYS: u32 = 90;

/// Minimum vault name length.
pub const MIN_VAULT_NAME_LENGTH: usize = 3;
/// Maximum vault name length.
pub const MAX_VAULT_NAME_LENGTH: usize = 24;

/// Private link subresource targeted by the private endpoint.
pub const PRIVATE_ENDPOINT_SUBRESOURCE: &str = "vault";

/// Name of the private DNS zone group attached to the private endpoint.
pub const PRIVATE_DNS_ZONE_GROUP_NAME: &str = "default";

/// Notes attached to the management lock.
pub const LOCK_NOTES: &str = "Protects the Key Vault and its contents from accidental deletion";

/// Diagnostic log categories enabled when none are configured.
pub const DEFAULT_DIAGNOSTIC_LOGS: [&str; 2] = ["AuditEvent", "AzurePolicyEvaluationDetails"];

/// Diagnostic metric categories enabled when none are configured.
pub const DEFAULT_DIAGNOSTIC_METRICS: [&str; 1] = ["AllMetrics"];

/// Block name used for singleton resources.
pub const SINGLETON_BLOCK: &str = "this";

/// Category recorded in custom policy metadata.
pub const POLICY_CATEGORY: &str = "Key Vault";
