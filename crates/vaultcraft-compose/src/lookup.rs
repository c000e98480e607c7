//! Resolution of built-in policy definitions by display name.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use vaultcraft_common::error::{Result, VaultcraftError};

use crate::descriptor::AttrValue;
use crate::graph::DesiredGraph;

/// Maps a policy definition display name to its identifier.
pub trait PolicyDefinitionLookup {
    /// Returns the definition identifier, or `None` if the name is unknown.
    fn definition_id(&self, display_name: &str) -> Option<String>;
}

/// In-memory catalog of definition identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCatalog {
    definitions: BTreeMap<String, String>,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition.
    #[must_use]
    pub fn with(mut self, display_name: impl Into<String>, id: impl Into<String>) -> Self {
        let _ = self.definitions.insert(display_name.into(), id.into());
        self
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if no definition is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl PolicyDefinitionLookup for StaticCatalog {
    fn definition_id(&self, display_name: &str) -> Option<String> {
        self.definitions.get(display_name).cloned()
    }
}

/// Replaces every unresolved definition in `graph` with its identifier.
///
/// # Errors
///
/// Returns [`VaultcraftError::Config`] naming every display name the
/// lookup does not know. The graph is left untouched in that case.
pub fn resolve_definitions(
    graph: &mut DesiredGraph,
    lookup: &dyn PolicyDefinitionLookup,
) -> Result<()> {
    let mut missing = BTreeSet::new();
    for value in graph.descriptors().flat_map(|d| d.attributes.values()) {
        value.for_each_lookup(&mut |l| {
            if lookup.definition_id(&l.display_name).is_none() {
                let _ = missing.insert(l.display_name.clone());
            }
        });
    }
    if !missing.is_empty() {
        let names: Vec<String> = missing.into_iter().collect();
        return Err(VaultcraftError::Config {
            message: format!("unknown policy definitions: {}", names.join(", ")),
        });
    }

    let mut resolved = 0_usize;
    for value in graph.attribute_values_mut() {
        value.for_each_lookup_mut(&mut |v| {
            let id = match v {
                AttrValue::Lookup(l) => lookup.definition_id(&l.display_name),
                _ => None,
            };
            if let Some(id) = id {
                *v = AttrValue::String(id);
                resolved += 1;
            }
        });
    }
    tracing::info!(resolved, "policy definitions resolved");
    Ok(())
}
