//! Module outputs exposed alongside the desired graph.
//!
//! Identifiers that only exist once reconciled are emitted as references;
//! values known at composition time are emitted literally.

use std::collections::BTreeMap;

use vaultcraft_common::config::ModuleConfig;
use vaultcraft_common::constants::SINGLETON_BLOCK;
use vaultcraft_common::types::{LogicalKey, ResourceKind};

use crate::descriptor::{AttrValue, Attributes, Descriptor, ResourceRef};
use crate::naming::Tags;

fn id_map<'a>(kind: ResourceKind, map_keys: impl Iterator<Item = &'a String>) -> AttrValue {
    AttrValue::Map(
        map_keys
            .map(|k| {
                let key = LogicalKey::indexed(kind, SINGLETON_BLOCK, k);
                (k.clone(), AttrValue::Ref(ResourceRef::id(&key)))
            })
            .collect(),
    )
}

fn singleton_id(descriptors: &[Descriptor], kind: ResourceKind) -> Option<AttrValue> {
    descriptors
        .iter()
        .find(|d| d.kind == kind)
        .map(|d| AttrValue::Ref(ResourceRef::id(&d.logical_key)))
}

/// Computes the outputs for a composed set of descriptors.
#[must_use]
pub fn collect(
    config: &ModuleConfig,
    descriptors: &[Descriptor],
    vault: &LogicalKey,
    vault_name: &str,
    tags: &Tags,
) -> BTreeMap<String, AttrValue> {
    let mut outputs = BTreeMap::new();
    let _ = outputs.insert("key_vault_id".into(), AttrValue::Ref(ResourceRef::id(vault)));
    let _ = outputs.insert("key_vault_name".into(), AttrValue::from(vault_name));
    let _ = outputs.insert(
        "key_vault_uri".into(),
        AttrValue::Ref(ResourceRef::new(vault, "vault_uri")),
    );
    let _ = outputs.insert(
        "key_ids".into(),
        id_map(ResourceKind::Key, config.keys.keys()),
    );
    let _ = outputs.insert(
        "secret_ids".into(),
        id_map(ResourceKind::Secret, config.secrets.keys()),
    );
    let _ = outputs.insert(
        "certificate_ids".into(),
        id_map(ResourceKind::Certificate, config.certificates.keys()),
    );
    let _ = outputs.insert("tags".into(), AttrValue::string_map(tags));

    if let Some(id) = singleton_id(descriptors, ResourceKind::PrivateEndpoint) {
        let _ = outputs.insert("private_endpoint_id".into(), id);
    }
    if let Some(id) = singleton_id(descriptors, ResourceKind::DiagnosticSetting) {
        let _ = outputs.insert("diagnostic_setting_id".into(), id);
    }

    let assignments: Attributes = descriptors
        .iter()
        .filter(|d| d.kind == ResourceKind::PolicyAssignment)
        .filter_map(|d| {
            let block = d
                .logical_key
                .as_str()
                .strip_prefix(ResourceKind::PolicyAssignment.as_str())?
                .strip_prefix('.')?;
            Some((
                block.to_owned(),
                AttrValue::Ref(ResourceRef::id(&d.logical_key)),
            ))
        })
        .collect();
    if !assignments.is_empty() {
        let _ = outputs.insert("policy_assignment_ids".into(), AttrValue::Map(assignments));
    }

    outputs
}
