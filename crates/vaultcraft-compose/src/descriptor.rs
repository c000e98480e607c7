//! Desired resource descriptors and their attribute values.
//!
//! A [`Descriptor`] is one planned managed resource: a stable logical key,
//! a resource kind, an attribute tree, and the logical keys it must be
//! ordered after.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};
use vaultcraft_common::types::{LogicalKey, ResourceKind};

/// Attribute tree of a descriptor.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Reference to an attribute another descriptor exposes once reconciled.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceRef {
    /// Referenced descriptor.
    pub target: LogicalKey,
    /// Attribute of the referenced descriptor (`id`, `vault_uri`, ...).
    pub attribute: String,
}

impl ResourceRef {
    /// Creates a reference to `attribute` of `target`.
    #[must_use]
    pub fn new(target: &LogicalKey, attribute: impl Into<String>) -> Self {
        Self {
            target: target.clone(),
            attribute: attribute.into(),
        }
    }

    /// Reference to the `id` of `target`.
    #[must_use]
    pub fn id(target: &LogicalKey) -> Self {
        Self::new(target, "id")
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}}}", self.target, self.attribute)
    }
}

impl Serialize for ResourceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A policy definition known only by its display name.
///
/// Resolved to a definition identifier by a lookup collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DefinitionLookup {
    /// Display name of the policy definition.
    pub display_name: String,
}

/// One attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Absent value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// String.
    String(String),
    /// Ordered list.
    List(Vec<AttrValue>),
    /// Nested block.
    Map(Attributes),
    /// Attribute of another descriptor.
    Ref(ResourceRef),
    /// Unresolved policy definition.
    Lookup(DefinitionLookup),
}

impl AttrValue {
    /// A list of strings.
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::String(s.into())).collect())
    }

    /// A nested block from key/value pairs.
    pub fn block<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Self)>,
        K: Into<String>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// A map of string values, as used for tags.
    #[must_use]
    pub fn string_map(map: &BTreeMap<String, String>) -> Self {
        Self::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), Self::String(v.clone())))
                .collect(),
        )
    }

    /// Unresolved policy definition by display name.
    pub fn lookup(display_name: impl Into<String>) -> Self {
        Self::Lookup(DefinitionLookup {
            display_name: display_name.into(),
        })
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested block, if any.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Attributes> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the list payload, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Visits every reference contained in this value.
    pub fn for_each_ref<'a>(&'a self, visit: &mut impl FnMut(&'a ResourceRef)) {
        match self {
            Self::Ref(r) => visit(r),
            Self::List(items) => items.iter().for_each(|v| v.for_each_ref(visit)),
            Self::Map(map) => map.values().for_each(|v| v.for_each_ref(visit)),
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::String(_) | Self::Lookup(_) => {}
        }
    }

    /// Visits every unresolved lookup contained in this value.
    pub fn for_each_lookup<'a>(&'a self, visit: &mut impl FnMut(&'a DefinitionLookup)) {
        match self {
            Self::Lookup(l) => visit(l),
            Self::List(items) => items.iter().for_each(|v| v.for_each_lookup(visit)),
            Self::Map(map) => map.values().for_each(|v| v.for_each_lookup(visit)),
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::String(_) | Self::Ref(_) => {}
        }
    }

    /// Visits every unresolved lookup contained in this value, mutably.
    pub fn for_each_lookup_mut(&mut self, visit: &mut impl FnMut(&mut Self)) {
        if matches!(self, Self::Lookup(_)) {
            visit(self);
            return;
        }
        match self {
            Self::List(items) => items.iter_mut().for_each(|v| v.for_each_lookup_mut(visit)),
            Self::Map(map) => map.values_mut().for_each(|v| v.for_each_lookup_mut(visit)),
            Self::Null
            | Self::Bool(_)
            | Self::Int(_)
            | Self::String(_)
            | Self::Ref(_)
            | Self::Lookup(_) => {}
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<ResourceRef> for AttrValue {
    fn from(value: ResourceRef) -> Self {
        Self::Ref(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One planned managed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    /// Stable identifier, unique within a graph.
    pub logical_key: LogicalKey,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Target attributes.
    pub attributes: Attributes,
    /// Descriptors that must be reconciled first.
    pub depends_on: BTreeSet<LogicalKey>,
    /// Attribute names whose values must never be displayed.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub sensitive: BTreeSet<String>,
}

impl Descriptor {
    /// Creates a descriptor with no attributes and no dependencies.
    #[must_use]
    pub const fn new(logical_key: LogicalKey, kind: ResourceKind) -> Self {
        Self {
            logical_key,
            kind,
            attributes: BTreeMap::new(),
            depends_on: BTreeSet::new(),
            sensitive: BTreeSet::new(),
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets an attribute only when the value is present.
    #[must_use]
    pub fn attr_opt<T: Into<AttrValue>>(self, name: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(v) => self.attr(name, v),
            None => self,
        }
    }

    /// Sets an attribute and marks it sensitive.
    #[must_use]
    pub fn sensitive_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let name = name.into();
        let _ = self.sensitive.insert(name.clone());
        self.attr(name, value)
    }

    /// Adds a dependency edge.
    #[must_use]
    pub fn depends_on(mut self, key: &LogicalKey) -> Self {
        let _ = self.depends_on.insert(key.clone());
        self
    }

    /// Adds dependency edges on every key in `keys`.
    #[must_use]
    pub fn depends_on_all<'a>(mut self, keys: impl IntoIterator<Item = &'a LogicalKey>) -> Self {
        self.depends_on.extend(keys.into_iter().cloned());
        self
    }

    /// Returns an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Returns a string attribute by name.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_str)
    }

    /// Returns the resolved `tags` attribute as string pairs.
    #[must_use]
    pub fn tags(&self) -> BTreeMap<&str, &str> {
        self.get("tags")
            .and_then(AttrValue::as_map)
            .map(|tags| {
                tags.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns every reference contained in the attributes.
    #[must_use]
    pub fn references(&self) -> Vec<&ResourceRef> {
        let mut refs = Vec::new();
        for value in self.attributes.values() {
            value.for_each_ref(&mut |r| refs.push(r));
        }
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault_key() -> LogicalKey {
        LogicalKey::singleton(ResourceKind::KeyVault, "this")
    }

    #[test]
    fn ref_renders_as_interpolation() {
        let r = ResourceRef::id(&vault_key());
        assert_eq!(r.to_string(), "${azurerm_key_vault.this.id}");
        let json = serde_json::to_string(&AttrValue::Ref(r)).expect("serialize");
        assert_eq!(json, r#""${azurerm_key_vault.this.id}""#);
    }

    #[test]
    fn builder_collects_attributes_and_edges() {
        let vault = vault_key();
        let d = Descriptor::new(
            LogicalKey::indexed(ResourceKind::Secret, "this", "db"),
            ResourceKind::Secret,
        )
        .attr("name", "db-password")
        .attr("key_vault_id", ResourceRef::id(&vault))
        .attr_opt::<String>("content_type", None)
        .sensitive_attr("value", "hunter2")
        .depends_on(&vault);

        assert_eq!(d.get_str("name"), Some("db-password"));
        assert!(d.get("content_type").is_none());
        assert!(d.sensitive.contains("value"));
        assert!(d.depends_on.contains(&vault));
        assert_eq!(d.references().len(), 1);
        assert_eq!(d.references()[0].target, vault);
    }

    #[test]
    fn nested_references_are_found() {
        let vault = vault_key();
        let value = AttrValue::block([(
            "private_service_connection",
            AttrValue::List(vec![AttrValue::block([(
                "private_connection_resource_id",
                AttrValue::Ref(ResourceRef::id(&vault)),
            )])]),
        )]);
        let mut found = Vec::new();
        value.for_each_ref(&mut |r| found.push(r.target.clone()));
        assert_eq!(found, vec![vault]);
    }

    #[test]
    fn nested_lookups_are_found() {
        let value = AttrValue::block([
            ("definition", AttrValue::lookup("Outer")),
            (
                "members",
                AttrValue::List(vec![AttrValue::lookup("Inner"), AttrValue::from("plain")]),
            ),
        ]);
        let mut names = Vec::new();
        value.for_each_lookup(&mut |l| names.push(l.display_name.as_str()));
        assert_eq!(names, ["Outer", "Inner"]);
    }

    #[test]
    fn lookups_serialize_with_display_name() {
        let json = serde_json::to_value(AttrValue::lookup("Some policy")).expect("serialize");
        assert_eq!(json["display_name"], "Some policy");
    }

    #[test]
    fn tags_view() {
        let mut tags = BTreeMap::new();
        let _ = tags.insert("Owner".to_string(), "A".to_string());
        let d = Descriptor::new(vault_key(), ResourceKind::KeyVault)
            .attr("tags", AttrValue::string_map(&tags));
        assert_eq!(d.tags().get("Owner"), Some(&"A"));
    }
}
