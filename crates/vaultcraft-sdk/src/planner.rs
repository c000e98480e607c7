//! Planning and applying desired graphs.
//!
//! Wraps `vaultcraft-compose`'s composer, lookup and staging into a
//! high-level API for SDK consumers.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use vaultcraft_common::config::ModuleConfig;
use vaultcraft_common::error::Result;
use vaultcraft_common::types::LogicalKey;
use vaultcraft_compose::lookup::{PolicyDefinitionLookup, resolve_definitions};
use vaultcraft_compose::{Composer, DesiredGraph};

use crate::reconciler::{ApplyReport, Reconciler};

/// A composed graph together with its reconciliation stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// The desired graph.
    pub graph: DesiredGraph,
    /// Logical keys grouped into dependency-ordered stages.
    pub stages: Vec<Vec<LogicalKey>>,
}

impl Plan {
    fn new(graph: DesiredGraph) -> Self {
        let stages = graph
            .stages()
            .into_iter()
            .map(|stage| stage.into_iter().cloned().collect())
            .collect();
        Self { graph, stages }
    }

    /// Display names of policy definitions still awaiting resolution.
    #[must_use]
    pub fn unresolved_definitions(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        for value in self.graph.descriptors().flat_map(|d| d.attributes.values()) {
            value.for_each_lookup(&mut |l| {
                let _ = names.insert(l.display_name.as_str());
            });
        }
        names
    }
}

/// Composes configurations into plans and hands them to a reconciler.
pub struct Planner {
    composer: Composer,
    lookup: Option<Box<dyn PolicyDefinitionLookup + Send + Sync>>,
}

impl fmt::Debug for Planner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planner")
            .field("composer", &self.composer)
            .field("lookup", &self.lookup.is_some())
            .finish()
    }
}

impl Planner {
    /// Creates a planner stamping today's date and resolving nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            composer: Composer::new(),
            lookup: None,
        }
    }

    /// Stamps `date` into the `CreatedDate` tag instead of today's date.
    #[must_use]
    pub fn created_date(mut self, date: NaiveDate) -> Self {
        self.composer = Composer::with_created_date(date);
        self
    }

    /// Resolves built-in policy definitions through `lookup` while planning.
    #[must_use]
    pub fn with_lookup(mut self, lookup: impl PolicyDefinitionLookup + Send + Sync + 'static) -> Self {
        self.lookup = Some(Box::new(lookup));
        self
    }

    /// Composes `config` into a plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the graph breaks
    /// an invariant, or a configured lookup cannot resolve a definition.
    pub fn plan(&self, config: &ModuleConfig) -> Result<Plan> {
        tracing::debug!(created = %self.composer.created_date(), "planning");
        let mut graph = self.composer.compose(config)?;
        if let Some(lookup) = &self.lookup {
            resolve_definitions(&mut graph, lookup.as_ref())?;
        }
        let plan = Plan::new(graph);
        tracing::info!(
            descriptors = plan.graph.len(),
            stages = plan.stages.len(),
            "plan ready"
        );
        Ok(plan)
    }

    /// Offers every stage of `plan` to `reconciler`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the reconciler.
    pub fn apply(&self, plan: &Plan, reconciler: &mut impl Reconciler) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();
        for (index, stage) in plan.stages.iter().enumerate() {
            let descriptors: Vec<_> = stage.iter().filter_map(|k| plan.graph.get(k)).collect();
            reconciler.reconcile_stage(index, &descriptors)?;
            report.stages += 1;
            report.descriptors += descriptors.len();
        }
        tracing::info!(
            stages = report.stages,
            descriptors = report.descriptors,
            "apply finished"
        );
        Ok(report)
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}
