//! Expansion of keys, secrets, certificates and certificate contacts.
//!
//! One descriptor per map entry, keyed `<kind>.this["<map key>"]`, each
//! depending on the vault. Secrets, certificates and contacts also wait for
//! the authorization descriptors that let the applying principal write
//! them; keys only wait for those in RBAC mode.

use std::collections::BTreeSet;

use vaultcraft_common::config::{
    CertificateConfig, ContactConfig, KeyConfig, ModuleConfig, RotationPolicyConfig, SecretConfig,
};
use vaultcraft_common::constants::SINGLETON_BLOCK;
use vaultcraft_common::types::{KeyType, LogicalKey, ResourceKind};

use crate::descriptor::{AttrValue, Descriptor, ResourceRef};
use crate::mode::{AuthorizationMode, AuthorizationPlan};
use crate::naming::{Tags, overlay};

/// Dependency edges added to material descriptors beyond the vault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialGates {
    /// Gates for keys.
    pub keys: BTreeSet<LogicalKey>,
    /// Gates for secrets, certificates and contacts.
    pub content: BTreeSet<LogicalKey>,
}

impl MaterialGates {
    /// Derives the gates from the resolved authorization plan.
    #[must_use]
    pub fn from_plan(mode: &AuthorizationMode<'_>, plan: &AuthorizationPlan) -> Self {
        Self {
            keys: if mode.is_rbac() {
                plan.write_gates.clone()
            } else {
                BTreeSet::new()
            },
            content: plan.write_gates.clone(),
        }
    }
}

/// Expands every material entry of the configuration.
#[must_use]
pub fn expand(
    config: &ModuleConfig,
    vault: &LogicalKey,
    base_tags: &Tags,
    gates: &MaterialGates,
) -> Vec<Descriptor> {
    let mut descriptors = Vec::new();

    for (map_key, key) in &config.keys {
        descriptors.push(key_descriptor(map_key, key, vault, base_tags).depends_on_all(&gates.keys));
    }
    for (map_key, secret) in &config.secrets {
        descriptors.push(
            secret_descriptor(map_key, secret, vault, base_tags).depends_on_all(&gates.content),
        );
    }
    for (map_key, cert) in &config.certificates {
        descriptors.push(
            certificate_descriptor(map_key, cert, vault, base_tags)
                .depends_on_all(&gates.content),
        );
    }
    if !config.contacts.is_empty() {
        descriptors.push(contacts_descriptor(&config.contacts, vault).depends_on_all(&gates.content));
    }

    tracing::debug!(count = descriptors.len(), "expanded vault material");
    descriptors
}

fn key_descriptor(map_key: &str, key: &KeyConfig, vault: &LogicalKey, base: &Tags) -> Descriptor {
    let logical_key = LogicalKey::indexed(ResourceKind::Key, SINGLETON_BLOCK, map_key);
    Descriptor::new(logical_key, ResourceKind::Key)
        .attr("name", &key.name)
        .attr("key_vault_id", ResourceRef::id(vault))
        .attr("key_type", &key.key_type)
        .attr_opt("key_size", key.key_size)
        .attr("key_opts", AttrValue::strings(&key.key_opts))
        .attr_opt("curve", key.curve.as_ref())
        .attr_opt("not_before_date", key.not_before_date.as_ref())
        .attr_opt("expiration_date", key.expiration_date.as_ref())
        .attr_opt("rotation_policy", key.rotation_policy.as_ref().map(rotation_block))
        .attr("tags", AttrValue::string_map(&overlay(base, &key.tags)))
        .depends_on(vault)
}

fn rotation_block(policy: &RotationPolicyConfig) -> AttrValue {
    let mut block = Vec::new();
    if let Some(automatic) = &policy.automatic {
        let mut trigger = Vec::new();
        if let Some(after) = &automatic.time_after_creation {
            trigger.push(("time_after_creation", AttrValue::from(after)));
        }
        if let Some(before) = &automatic.time_before_expiry {
            trigger.push(("time_before_expiry", AttrValue::from(before)));
        }
        block.push(("automatic", AttrValue::block(trigger)));
    }
    if let Some(expire) = &policy.expire_after {
        block.push(("expire_after", AttrValue::from(expire)));
    }
    if let Some(notify) = &policy.notify_before_expiry {
        block.push(("notify_before_expiry", AttrValue::from(notify)));
    }
    AttrValue::block(block)
}

fn secret_descriptor(
    map_key: &str,
    secret: &SecretConfig,
    vault: &LogicalKey,
    base: &Tags,
) -> Descriptor {
    let logical_key = LogicalKey::indexed(ResourceKind::Secret, SINGLETON_BLOCK, map_key);
    Descriptor::new(logical_key, ResourceKind::Secret)
        .attr("name", &secret.name)
        .sensitive_attr("value", &secret.value)
        .attr("key_vault_id", ResourceRef::id(vault))
        .attr_opt("content_type", secret.content_type.as_ref())
        .attr_opt("not_before_date", secret.not_before_date.as_ref())
        .attr_opt("expiration_date", secret.expiration_date.as_ref())
        .attr("tags", AttrValue::string_map(&overlay(base, &secret.tags)))
        .depends_on(vault)
}

fn certificate_descriptor(
    map_key: &str,
    cert: &CertificateConfig,
    vault: &LogicalKey,
    base: &Tags,
) -> Descriptor {
    let logical_key = LogicalKey::indexed(ResourceKind::Certificate, SINGLETON_BLOCK, map_key);
    Descriptor::new(logical_key, ResourceKind::Certificate)
        .attr("name", &cert.name)
        .attr("key_vault_id", ResourceRef::id(vault))
        .attr("certificate_policy", certificate_policy(cert))
        .attr("tags", AttrValue::string_map(&overlay(base, &cert.tags)))
        .depends_on(vault)
}

fn certificate_policy(cert: &CertificateConfig) -> AttrValue {
    let key = &cert.key_properties;
    let x509 = &cert.x509_properties;
    let sans = x509.subject_alternative_names.clone().unwrap_or_default();
    // RSA policies carry a size, EC policies a curve; never both.
    let rsa = KeyType::parse(&key.key_type).is_some_and(KeyType::is_rsa);
    let (key_size, curve) = if rsa {
        (key.key_size, None)
    } else {
        (None, key.curve.as_ref())
    };

    let mut policy = vec![
        (
            "issuer_parameters",
            AttrValue::block([("name", AttrValue::from(&cert.issuer.name))]),
        ),
        (
            "key_properties",
            AttrValue::block([
                ("exportable", AttrValue::from(key.exportable)),
                ("key_type", AttrValue::from(&key.key_type)),
                ("key_size", AttrValue::from(key_size)),
                ("curve", AttrValue::from(curve)),
                ("reuse_key", AttrValue::from(key.reuse_key)),
            ]),
        ),
        (
            "secret_properties",
            AttrValue::block([(
                "content_type",
                AttrValue::from(&cert.secret_properties.content_type),
            )]),
        ),
        (
            "x509_certificate_properties",
            AttrValue::block([
                ("subject", AttrValue::from(&x509.subject)),
                ("validity_in_months", AttrValue::from(x509.validity_in_months)),
                ("key_usage", AttrValue::strings(&x509.key_usage)),
                ("extended_key_usage", AttrValue::strings(&x509.extended_key_usage)),
                (
                    "subject_alternative_names",
                    AttrValue::block([
                        ("dns_names", AttrValue::strings(&sans.dns_names)),
                        ("emails", AttrValue::strings(&sans.emails)),
                        ("upns", AttrValue::strings(&sans.upns)),
                    ]),
                ),
            ]),
        ),
    ];

    if !cert.lifetime_actions.is_empty() {
        let actions = cert
            .lifetime_actions
            .iter()
            .map(|action| {
                AttrValue::block([
                    (
                        "action",
                        AttrValue::block([("action_type", AttrValue::from(&action.action_type))]),
                    ),
                    (
                        "trigger",
                        AttrValue::block([
                            ("days_before_expiry", AttrValue::from(action.days_before_expiry)),
                            (
                                "lifetime_percentage",
                                AttrValue::from(action.lifetime_percentage),
                            ),
                        ]),
                    ),
                ])
            })
            .collect();
        policy.push(("lifetime_action", AttrValue::List(actions)));
    }

    AttrValue::block(policy)
}

fn contacts_descriptor(contacts: &[ContactConfig], vault: &LogicalKey) -> Descriptor {
    let logical_key = LogicalKey::singleton(ResourceKind::CertificateContacts, SINGLETON_BLOCK);
    let entries = contacts
        .iter()
        .map(|contact| {
            AttrValue::block([
                ("email", AttrValue::from(&contact.email)),
                ("name", AttrValue::from(contact.name.as_ref())),
                ("phone", AttrValue::from(contact.phone.as_ref())),
            ])
        })
        .collect();
    Descriptor::new(logical_key, ResourceKind::CertificateContacts)
        .attr("key_vault_id", ResourceRef::id(vault))
        .attr("contact", AttrValue::List(entries))
        .depends_on(vault)
}
