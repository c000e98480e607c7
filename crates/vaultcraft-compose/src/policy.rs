//! Compliance policy composition: built-in assignments, custom audit
//! definitions, and the security baseline initiative.
//!
//! Built-in definitions are referenced by display name and resolved later by
//! a lookup collaborator. Rules and parameters are JSON documents encoded
//! as strings, the shape the policy resources expect.

use serde_json::{Value, json};
use vaultcraft_common::config::ModuleConfig;
use vaultcraft_common::constants::{POLICY_CATEGORY, SINGLETON_BLOCK};
use vaultcraft_common::types::{LogicalKey, ResourceKind};

use crate::descriptor::{AttrValue, Descriptor, ResourceRef};
use crate::naming::DerivedNames;

/// Effect parameter of a built-in policy assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Reject non-compliant requests.
    Deny,
    /// Report non-compliance.
    Audit,
    /// Remediate by deploying diagnostic settings to the workspace.
    DeployIfNotExists,
}

impl Effect {
    /// Parameter value understood by the policy engine.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deny => "Deny",
            Self::Audit => "Audit",
            Self::DeployIfNotExists => "DeployIfNotExists",
        }
    }

    const fn needs_identity(self) -> bool {
        matches!(self, Self::DeployIfNotExists)
    }
}

/// One built-in policy assigned to the resource group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinAssignment {
    /// Block name and name suffix.
    pub block: &'static str,
    /// Display name of the built-in definition.
    pub display_name: &'static str,
    /// Effect parameter.
    pub effect: Effect,
}

/// The six built-in assignments, in emission order.
pub const BUILTIN_ASSIGNMENTS: [BuiltinAssignment; 6] = [
    BuiltinAssignment {
        block: "purge_protection",
        display_name: "Key vaults should have deletion protection enabled",
        effect: Effect::Deny,
    },
    BuiltinAssignment {
        block: "soft_delete",
        display_name: "Key vaults should have soft delete enabled",
        effect: Effect::Deny,
    },
    BuiltinAssignment {
        block: "firewall",
        display_name: "Azure Key Vault should have firewall enabled",
        effect: Effect::Deny,
    },
    BuiltinAssignment {
        block: "public_network_access",
        display_name: "Azure Key Vault should disable public network access",
        effect: Effect::Deny,
    },
    BuiltinAssignment {
        block: "logging",
        display_name: "Deploy Diagnostic Settings for Key Vault to Log Analytics workspace",
        effect: Effect::DeployIfNotExists,
    },
    BuiltinAssignment {
        block: "private_link",
        display_name: "Azure Key Vaults should use private link",
        effect: Effect::Audit,
    },
];

/// Built-in blocks bundled into the initiative.
const INITIATIVE_MEMBERS: [&str; 4] = ["purge_protection", "soft_delete", "private_link", "logging"];

/// Block name of the initiative assignment.
pub const INITIATIVE_ASSIGNMENT_BLOCK: &str = "initiative";

/// A custom audit rule keyed on a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomRule {
    /// Block name and name suffix.
    pub block: &'static str,
    /// Display name.
    pub display_name: &'static str,
    /// Resource type the rule applies to.
    pub resource_type: &'static str,
    /// Field whose absence is audited.
    pub audited_field: &'static str,
}

/// The three custom audit rules, in emission order.
pub const CUSTOM_RULES: [CustomRule; 3] = [
    CustomRule {
        block: "key_rotation",
        display_name: "Key Vault keys should have a rotation policy",
        resource_type: "Microsoft.KeyVault.Data/vaults/keys",
        audited_field: "Microsoft.KeyVault.Data/vaults/keys/rotationPolicy",
    },
    CustomRule {
        block: "secret_expiration",
        display_name: "Key Vault secrets should have an expiration date",
        resource_type: "Microsoft.KeyVault.Data/vaults/secrets",
        audited_field: "Microsoft.KeyVault.Data/vaults/secrets/attributes.expiresOn",
    },
    CustomRule {
        block: "certificate_issuer",
        display_name: "Key Vault certificates should use an approved issuer",
        resource_type: "Microsoft.KeyVault.Data/vaults/certificates",
        audited_field: "Microsoft.KeyVault.Data/vaults/certificates/issuer.name",
    },
];

fn parameters(effect: Effect, workspace: Option<&str>) -> Value {
    let mut params = json!({ "effect": { "value": effect.as_str() } });
    if let (Effect::DeployIfNotExists, Some(workspace)) = (effect, workspace) {
        params["logAnalytics"] = json!({ "value": workspace });
    }
    params
}

fn identity_fields(descriptor: Descriptor, location: &str) -> Descriptor {
    descriptor
        .attr("location", location)
        .attr(
            "identity",
            AttrValue::block([("type", AttrValue::from("SystemAssigned"))]),
        )
}

fn builtin_assignment(
    assignment: &BuiltinAssignment,
    config: &ModuleConfig,
    names: &DerivedNames,
) -> Descriptor {
    let key = LogicalKey::singleton(ResourceKind::PolicyAssignment, assignment.block);
    let params = parameters(assignment.effect, config.log_analytics_workspace_id.as_deref());
    let descriptor = Descriptor::new(key, ResourceKind::PolicyAssignment)
        .attr("name", names.policy(&assignment.block.replace('_', "-")))
        .attr("display_name", assignment.display_name)
        .attr("resource_group_id", config.resource_group_id.as_ref())
        .attr("policy_definition_id", AttrValue::lookup(assignment.display_name))
        .attr("parameters", params.to_string());
    if assignment.effect.needs_identity() {
        identity_fields(descriptor, &config.location)
    } else {
        descriptor
    }
}

/// Builds the six built-in policy assignments.
#[must_use]
pub fn assignments(config: &ModuleConfig, names: &DerivedNames) -> Vec<Descriptor> {
    BUILTIN_ASSIGNMENTS
        .iter()
        .map(|assignment| builtin_assignment(assignment, config, names))
        .collect()
}

/// Policy rule body of a custom audit rule.
#[must_use]
pub fn custom_rule_body(rule: &CustomRule) -> Value {
    json!({
        "if": {
            "allOf": [
                { "field": "type", "equals": rule.resource_type },
                { "field": rule.audited_field, "exists": "false" }
            ]
        },
        "then": { "effect": "audit" }
    })
}

/// Builds the three custom audit policy definitions.
#[must_use]
pub fn custom_definitions(names: &DerivedNames) -> Vec<Descriptor> {
    CUSTOM_RULES
        .iter()
        .map(|rule| {
            Descriptor::new(
                LogicalKey::singleton(ResourceKind::PolicyDefinition, rule.block),
                ResourceKind::PolicyDefinition,
            )
            .attr("name", names.policy(&rule.block.replace('_', "-")))
            .attr("policy_type", "Custom")
            .attr("mode", "Microsoft.KeyVault.Data")
            .attr("display_name", rule.display_name)
            .attr(
                "metadata",
                json!({ "category": POLICY_CATEGORY }).to_string(),
            )
            .attr("policy_rule", custom_rule_body(rule).to_string())
        })
        .collect()
}

/// Builds the security baseline initiative and its assignment.
#[must_use]
pub fn initiative(config: &ModuleConfig, names: &DerivedNames) -> Vec<Descriptor> {
    let workspace = config.log_analytics_workspace_id.as_deref();
    let references = BUILTIN_ASSIGNMENTS
        .iter()
        .filter(|a| INITIATIVE_MEMBERS.contains(&a.block))
        .map(|a| {
            AttrValue::block([
                ("policy_definition_id", AttrValue::lookup(a.display_name)),
                ("reference_id", AttrValue::from(a.block)),
                (
                    "parameter_values",
                    AttrValue::from(parameters(a.effect, workspace).to_string()),
                ),
            ])
        })
        .collect();

    let set_key = LogicalKey::singleton(ResourceKind::PolicySetDefinition, SINGLETON_BLOCK);
    let set = Descriptor::new(set_key.clone(), ResourceKind::PolicySetDefinition)
        .attr("name", names.initiative())
        .attr("policy_type", "Custom")
        .attr("display_name", "Key Vault Security Baseline")
        .attr(
            "metadata",
            json!({ "category": POLICY_CATEGORY }).to_string(),
        )
        .attr("policy_definition_reference", AttrValue::List(references));

    let assignment = Descriptor::new(
        LogicalKey::singleton(ResourceKind::PolicyAssignment, INITIATIVE_ASSIGNMENT_BLOCK),
        ResourceKind::PolicyAssignment,
    )
    .attr("name", names.initiative())
    .attr("display_name", "Key Vault Security Baseline")
    .attr("resource_group_id", config.resource_group_id.as_ref())
    .attr("policy_definition_id", ResourceRef::id(&set_key))
    .depends_on(&set_key);

    vec![set, identity_fields(assignment, &config.location)]
}
