//! The seam to whatever turns a desired graph into live resources.
//!
//! The engine never talks to a cloud API. A [`Reconciler`] receives the
//! planned graph one stage at a time; every descriptor in a stage has all
//! of its dependencies in earlier stages, so an implementation may
//! reconcile a stage's descriptors concurrently.

use vaultcraft_common::error::Result;
use vaultcraft_compose::descriptor::Descriptor;

/// Receives planned descriptors stage by stage.
pub trait Reconciler {
    /// Reconciles one stage.
    ///
    /// # Errors
    ///
    /// Returning an error stops the apply; later stages are not offered.
    fn reconcile_stage(&mut self, index: usize, descriptors: &[&Descriptor]) -> Result<()>;
}

/// Summary of an apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Stages offered to the reconciler.
    pub stages: usize,
    /// Descriptors offered to the reconciler.
    pub descriptors: usize,
}

/// A reconciler that only records what it was given.
#[derive(Debug, Clone, Default)]
pub struct DryRun {
    /// Logical keys per stage, in the order received.
    pub stages: Vec<Vec<String>>,
}

impl Reconciler for DryRun {
    fn reconcile_stage(&mut self, index: usize, descriptors: &[&Descriptor]) -> Result<()> {
        tracing::debug!(stage = index, count = descriptors.len(), "dry run stage");
        self.stages.push(
            descriptors
                .iter()
                .map(|d| d.logical_key.to_string())
                .collect(),
        );
        Ok(())
    }
}
