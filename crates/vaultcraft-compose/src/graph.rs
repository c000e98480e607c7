//! Desired resource graph using `petgraph`.
//!
//! Descriptors are collected into a [`GraphBuilder`], which checks the
//! graph invariants once before handing out an immutable [`DesiredGraph`]:
//! unique logical keys, no dangling dependencies, every attribute reference
//! backed by a dependency edge, and no cycles.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use vaultcraft_common::error::{Result, VaultcraftError};
use vaultcraft_common::types::{LogicalKey, ResourceKind};

use crate::descriptor::{AttrValue, Descriptor};

/// The full set of desired resources plus the module outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredGraph {
    descriptors: BTreeMap<LogicalKey, Descriptor>,
    outputs: BTreeMap<String, AttrValue>,
}

impl DesiredGraph {
    /// Returns a descriptor by logical key.
    #[must_use]
    pub fn get(&self, key: &LogicalKey) -> Option<&Descriptor> {
        self.descriptors.get(key)
    }

    /// Returns a descriptor by its rendered logical key.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Descriptor> {
        self.descriptors.get(&LogicalKey::new(key))
    }

    /// Returns `true` if a descriptor with this key exists.
    #[must_use]
    pub fn contains(&self, key: &LogicalKey) -> bool {
        self.descriptors.contains_key(key)
    }

    /// Iterates descriptors in logical key order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.values()
    }

    /// Descriptors of one kind, in logical key order.
    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.values().filter(move |d| d.kind == kind)
    }

    /// Number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if the graph holds no descriptors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Module outputs.
    #[must_use]
    pub const fn outputs(&self) -> &BTreeMap<String, AttrValue> {
        &self.outputs
    }

    /// Mutable access to every attribute value, for late resolution.
    pub(crate) fn attribute_values_mut(&mut self) -> impl Iterator<Item = &mut AttrValue> {
        self.descriptors
            .values_mut()
            .flat_map(|d| d.attributes.values_mut())
    }

    /// Keys of descriptors that directly depend on `key`.
    #[must_use]
    pub fn dependents_of(&self, key: &LogicalKey) -> Vec<&LogicalKey> {
        self.descriptors
            .values()
            .filter(|d| d.depends_on.contains(key))
            .map(|d| &d.logical_key)
            .collect()
    }

    /// Returns a deployment ordering of the descriptors.
    ///
    /// Dependencies appear before the descriptors that depend on them.
    /// Ties are broken by logical key so the order is reproducible.
    #[must_use]
    pub fn deployment_order(&self) -> Vec<&LogicalKey> {
        self.stages().into_iter().flatten().collect()
    }

    /// Groups descriptors into waves that can be reconciled concurrently.
    ///
    /// Every descriptor in wave `n` depends only on descriptors in earlier
    /// waves.
    #[must_use]
    pub fn stages(&self) -> Vec<Vec<&LogicalKey>> {
        let graph = dependency_graph(&self.descriptors);
        // A built graph is acyclic.
        let Ok(order) = petgraph::algo::toposort(&graph, None) else {
            return Vec::new();
        };

        let mut depth = vec![0_usize; graph.node_count()];
        let mut stages: Vec<Vec<&LogicalKey>> = Vec::new();
        for node in order {
            let level = graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|dependency| depth[dependency.index()] + 1)
                .max()
                .unwrap_or(0);
            depth[node.index()] = level;
            if stages.len() <= level {
                stages.resize_with(level + 1, Vec::new);
            }
            stages[level].push(graph[node]);
        }
        for stage in &mut stages {
            stage.sort();
        }
        stages
    }

    /// Renders the dependency structure in Graphviz DOT format.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph desired {\n  rankdir=LR;\n");
        for descriptor in self.descriptors.values() {
            let _ = writeln!(dot, "  \"{}\";", escape(descriptor.logical_key.as_str()));
        }
        for descriptor in self.descriptors.values() {
            for dependency in &descriptor.depends_on {
                let _ = writeln!(
                    dot,
                    "  \"{}\" -> \"{}\";",
                    escape(dependency.as_str()),
                    escape(descriptor.logical_key.as_str())
                );
            }
        }
        dot.push_str("}\n");
        dot
    }
}

fn escape(label: &str) -> String {
    label.replace('"', "\\\"")
}

/// Collects descriptors and outputs, then checks graph invariants.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    descriptors: BTreeMap<LogicalKey, Descriptor>,
    outputs: BTreeMap<String, AttrValue>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`VaultcraftError::Graph`] if the logical key is already taken.
    pub fn add(&mut self, descriptor: Descriptor) -> Result<()> {
        if self.descriptors.contains_key(&descriptor.logical_key) {
            return Err(VaultcraftError::graph(format!(
                "duplicate logical key `{}`",
                descriptor.logical_key
            )));
        }
        let _ = self
            .descriptors
            .insert(descriptor.logical_key.clone(), descriptor);
        Ok(())
    }

    /// Adds every descriptor in `descriptors`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultcraftError::Graph`] on the first duplicate key.
    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = Descriptor>) -> Result<()> {
        descriptors.into_iter().try_for_each(|d| self.add(d))
    }

    /// Records a module output.
    pub fn output(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        let _ = self.outputs.insert(name.into(), value.into());
    }

    /// Checks every invariant and freezes the graph.
    ///
    /// # Errors
    ///
    /// Returns [`VaultcraftError::Graph`] on a dangling dependency, an
    /// attribute reference without a matching dependency edge, an output
    /// referencing an unknown descriptor, or a cycle.
    pub fn build(self) -> Result<DesiredGraph> {
        for descriptor in self.descriptors.values() {
            for dependency in &descriptor.depends_on {
                if !self.descriptors.contains_key(dependency) {
                    return Err(VaultcraftError::graph(format!(
                        "`{}` depends on unknown `{dependency}`",
                        descriptor.logical_key
                    )));
                }
            }
            for reference in descriptor.references() {
                if !descriptor.depends_on.contains(&reference.target) {
                    return Err(VaultcraftError::graph(format!(
                        "`{}` references `{reference}` without depending on it",
                        descriptor.logical_key
                    )));
                }
            }
        }

        for (name, value) in &self.outputs {
            let mut dangling = None;
            value.for_each_ref(&mut |r| {
                if !self.descriptors.contains_key(&r.target) {
                    dangling = Some(r.to_string());
                }
            });
            if let Some(reference) = dangling {
                return Err(VaultcraftError::graph(format!(
                    "output `{name}` references unknown `{reference}`"
                )));
            }
        }

        check_acyclic(&self.descriptors)?;
        tracing::debug!(
            descriptors = self.descriptors.len(),
            outputs = self.outputs.len(),
            "desired graph built"
        );
        Ok(DesiredGraph {
            descriptors: self.descriptors,
            outputs: self.outputs,
        })
    }
}

/// Builds the dependency edges as a `petgraph` graph.
///
/// Edges point from dependency to dependent so that topological sort
/// yields dependencies first. Nodes are added in logical key order.
fn dependency_graph(descriptors: &BTreeMap<LogicalKey, Descriptor>) -> DiGraph<&LogicalKey, ()> {
    let mut graph: DiGraph<&LogicalKey, ()> = DiGraph::new();
    let indices: BTreeMap<&LogicalKey, NodeIndex> = descriptors
        .keys()
        .map(|key| (key, graph.add_node(key)))
        .collect();

    for descriptor in descriptors.values() {
        let Some(&dependent) = indices.get(&descriptor.logical_key) else {
            continue;
        };
        for dependency in &descriptor.depends_on {
            if let Some(&dependency) = indices.get(dependency) {
                let _ = graph.add_edge(dependency, dependent, ());
            }
        }
    }
    graph
}

/// Runs a topological sort over the dependency edges.
fn check_acyclic(descriptors: &BTreeMap<LogicalKey, Descriptor>) -> Result<()> {
    let graph = dependency_graph(descriptors);
    match petgraph::algo::toposort(&graph, None) {
        Ok(_) => Ok(()),
        Err(cycle) => {
            let at = graph
                .node_weight(cycle.node_id())
                .map_or_else(String::new, ToString::to_string);
            Err(VaultcraftError::graph(format!(
                "cyclic dependency detected at `{at}`"
            )))
        }
    }
}

/// Logical keys of every dependency, direct or transitive, of `key`.
#[must_use]
pub fn transitive_dependencies<'a>(
    graph: &'a DesiredGraph,
    key: &LogicalKey,
) -> BTreeSet<&'a LogicalKey> {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<&LogicalKey> = graph
        .get(key)
        .map(|d| d.depends_on.iter().collect())
        .unwrap_or_default();
    while let Some(next) = stack.pop() {
        if let Some(descriptor) = graph.get(next) {
            if seen.insert(&descriptor.logical_key) {
                stack.extend(descriptor.depends_on.iter());
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ResourceRef;

    fn node(name: &str) -> Descriptor {
        Descriptor::new(
            LogicalKey::singleton(ResourceKind::Secret, name),
            ResourceKind::Secret,
        )
    }

    fn key(name: &str) -> LogicalKey {
        LogicalKey::singleton(ResourceKind::Secret, name)
    }

    fn build(nodes: Vec<Descriptor>) -> Result<DesiredGraph> {
        let mut builder = GraphBuilder::new();
        builder.extend(nodes)?;
        builder.build()
    }

    #[test]
    fn empty_graph_resolves_to_empty() {
        let graph = build(vec![]).expect("should build");
        assert!(graph.is_empty());
        assert!(graph.deployment_order().is_empty());
    }

    #[test]
    fn linear_dependency_chain() {
        let graph = build(vec![node("api").depends_on(&key("db")), node("db")])
            .expect("should build");
        let order = graph.deployment_order();
        let pos = |name: &str| order.iter().position(|k| **k == key(name)).expect(name);
        assert!(pos("db") < pos("api"), "db should come before api: {order:?}");
    }

    #[test]
    fn diamond_dependency() {
        let graph = build(vec![
            node("a").depends_on(&key("b")).depends_on(&key("c")),
            node("b").depends_on(&key("d")),
            node("c").depends_on(&key("d")),
            node("d"),
        ])
        .expect("should build");

        let stages = graph.stages();
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0], vec![&key("d")]);
        assert_eq!(stages[1], vec![&key("b"), &key("c")]);
        assert_eq!(stages[2], vec![&key("a")]);
        assert_eq!(
            transitive_dependencies(&graph, &key("a")),
            BTreeSet::from([&key("b"), &key("c"), &key("d")])
        );
    }

    #[test]
    fn cycle_detection() {
        let result = build(vec![
            node("a").depends_on(&key("b")),
            node("b").depends_on(&key("a")),
        ]);
        let err = result.expect_err("cycle");
        assert!(err.is_graph());
        assert!(err.to_string().contains("cyclic"), "got: {err}");
    }

    #[test]
    fn three_node_cycle_detection() {
        let result = build(vec![
            node("a").depends_on(&key("b")),
            node("b").depends_on(&key("c")),
            node("c").depends_on(&key("a")),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_key_rejected() {
        let mut builder = GraphBuilder::new();
        builder.add(node("x")).expect("first");
        let err = builder.add(node("x")).expect_err("duplicate");
        assert!(err.to_string().contains("duplicate logical key"));
    }

    #[test]
    fn dangling_dependency_rejected() {
        let err = build(vec![node("x").depends_on(&key("missing"))]).expect_err("dangling");
        assert!(err.is_graph());
    }

    #[test]
    fn reference_without_edge_rejected() {
        let err = build(vec![
            node("x").attr("target", ResourceRef::id(&key("y"))),
            node("y"),
        ])
        .expect_err("missing edge");
        assert!(err.to_string().contains("without depending"));
    }

    #[test]
    fn output_reference_must_resolve() {
        let mut builder = GraphBuilder::new();
        builder.add(node("x")).expect("add");
        builder.output("missing", ResourceRef::id(&key("nope")));
        assert!(builder.build().is_err());
    }

    #[test]
    fn stage_follows_longest_dependency_path() {
        // `c` waits for `a` directly and, through `b`, for a second wave.
        let graph = build(vec![
            node("c").depends_on(&key("a")).depends_on(&key("b")),
            node("b").depends_on(&key("a")),
            node("a"),
            node("z"),
        ])
        .expect("should build");

        let stages = graph.stages();
        assert_eq!(stages[0], vec![&key("a"), &key("z")]);
        assert_eq!(stages[1], vec![&key("b")]);
        assert_eq!(stages[2], vec![&key("c")]);
        assert_eq!(
            graph.deployment_order(),
            vec![&key("a"), &key("z"), &key("b"), &key("c")]
        );
    }

    #[test]
    fn independent_nodes_share_one_stage() {
        let graph = build(vec![node("x"), node("y"), node("z")]).expect("should build");
        assert_eq!(graph.stages().len(), 1);
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn dot_lists_edges() {
        let graph = build(vec![node("api").depends_on(&key("db")), node("db")])
            .expect("should build");
        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph desired {"));
        assert!(dot.contains(r#""azurerm_key_vault_secret.db" -> "azurerm_key_vault_secret.api";"#));
    }
}
