//! Authorization mode resolution: RBAC role bindings versus legacy access
//! policies.
//!
//! The mode is chosen once per composition from `enable_rbac_authorization`.
//! The branch that is not selected is dropped without error even when the
//! caller populated it.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;
use vaultcraft_common::config::{AccessPolicyConfig, ModuleConfig, RoleAssignmentsConfig};
use vaultcraft_common::constants::SINGLETON_BLOCK;
use vaultcraft_common::types::{LogicalKey, ResourceKind, RoleClass};

use crate::descriptor::{AttrValue, Descriptor, ResourceRef};

/// Block name of the binding granted to the deploying principal.
pub const DEPLOYER_BLOCK: &str = "deployer";

/// How data-plane access to the vault is authorized.
#[derive(Debug, Clone, Copy)]
pub enum AuthorizationMode<'a> {
    /// Role bindings scoped to the vault.
    Rbac {
        /// Principals per role class.
        bindings: &'a RoleAssignmentsConfig,
        /// Principal applying the configuration, if known.
        deployer: Option<&'a str>,
    },
    /// Legacy per-principal access policies.
    AccessPolicies(&'a BTreeMap<String, AccessPolicyConfig>),
}

impl<'a> AuthorizationMode<'a> {
    /// Selects the mode for a configuration.
    #[must_use]
    pub fn resolve(config: &'a ModuleConfig) -> Self {
        if config.enable_rbac_authorization {
            Self::Rbac {
                bindings: &config.role_assignments,
                deployer: config
                    .deployer_object_id
                    .as_deref()
                    .filter(|id| !id.is_empty()),
            }
        } else {
            Self::AccessPolicies(&config.access_policies)
        }
    }

    /// Returns `true` in RBAC mode.
    #[must_use]
    pub const fn is_rbac(&self) -> bool {
        matches!(self, Self::Rbac { .. })
    }
}

/// Authorization descriptors plus the subset that gates material writes.
#[derive(Debug, Default)]
pub struct AuthorizationPlan {
    /// Every role binding or access policy descriptor.
    pub descriptors: Vec<Descriptor>,
    /// Keys of descriptors that must exist before material is written.
    pub write_gates: BTreeSet<LogicalKey>,
}

/// Expands the selected mode into descriptors.
#[must_use]
pub fn expand(mode: AuthorizationMode<'_>, vault: &LogicalKey, vault_name: &str) -> AuthorizationPlan {
    match mode {
        AuthorizationMode::Rbac { bindings, deployer } => {
            expand_rbac(bindings, deployer, vault, vault_name)
        }
        AuthorizationMode::AccessPolicies(policies) => expand_access_policies(policies, vault),
    }
}

fn expand_rbac(
    bindings: &RoleAssignmentsConfig,
    deployer: Option<&str>,
    vault: &LogicalKey,
    vault_name: &str,
) -> AuthorizationPlan {
    let mut plan = AuthorizationPlan::default();

    for class in RoleClass::ALL {
        let principals: BTreeSet<&String> = bindings.principals(class).iter().collect();
        for principal in principals {
            let key = LogicalKey::indexed(ResourceKind::RoleAssignment, class.block(), principal);
            tracing::debug!(key = %key, role = class.role_name(), "role binding");
            plan.descriptors
                .push(role_binding(key, class, principal, vault, vault_name));
        }
    }

    if let Some(principal) = deployer {
        // An administrator binding for the same principal already grants write access.
        if bindings.administrators.iter().any(|p| p == principal) {
            let key = LogicalKey::indexed(
                ResourceKind::RoleAssignment,
                RoleClass::Administrators.block(),
                principal,
            );
            let _ = plan.write_gates.insert(key);
        } else {
            let key = LogicalKey::singleton(ResourceKind::RoleAssignment, DEPLOYER_BLOCK);
            let _ = plan.write_gates.insert(key.clone());
            plan.descriptors.push(role_binding(
                key,
                RoleClass::Administrators,
                principal,
                vault,
                vault_name,
            ));
        }
    }

    plan
}

fn role_binding(
    key: LogicalKey,
    class: RoleClass,
    principal: &str,
    vault: &LogicalKey,
    vault_name: &str,
) -> Descriptor {
    Descriptor::new(key, ResourceKind::RoleAssignment)
        .attr("name", assignment_name(vault_name, class, principal))
        .attr("scope", ResourceRef::id(vault))
        .attr("role_definition_name", class.role_name())
        .attr("principal_id", principal)
        .depends_on(vault)
}

/// Deterministic role assignment name for a (vault, role, principal) triple.
#[must_use]
pub fn assignment_name(vault_name: &str, class: RoleClass, principal: &str) -> String {
    let seed = format!("{vault_name}/{}/{principal}", class.role_name());
    Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()).to_string()
}

fn expand_access_policies(
    policies: &BTreeMap<String, AccessPolicyConfig>,
    vault: &LogicalKey,
) -> AuthorizationPlan {
    let mut plan = AuthorizationPlan::default();
    for (map_key, policy) in policies {
        let key = LogicalKey::indexed(ResourceKind::AccessPolicy, SINGLETON_BLOCK, map_key);
        tracing::debug!(key = %key, "access policy");
        let _ = plan.write_gates.insert(key.clone());
        plan.descriptors.push(
            Descriptor::new(key, ResourceKind::AccessPolicy)
                .attr("key_vault_id", ResourceRef::id(vault))
                .attr("tenant_id", &policy.tenant_id)
                .attr("object_id", &policy.object_id)
                .attr("key_permissions", AttrValue::strings(&policy.key_permissions))
                .attr(
                    "secret_permissions",
                    AttrValue::strings(&policy.secret_permissions),
                )
                .attr(
                    "certificate_permissions",
                    AttrValue::strings(&policy.certificate_permissions),
                )
                .attr(
                    "storage_permissions",
                    AttrValue::strings(&policy.storage_permissions),
                )
                .depends_on(vault),
        );
    }
    plan
}
