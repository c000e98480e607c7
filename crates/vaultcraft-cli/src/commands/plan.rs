//! `vcraft plan` — Display the planned resources before reconciling.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use vaultcraft_common::constants::CREATED_DATE_FORMAT;
use vaultcraft_sdk::loader::load_catalog;
use vaultcraft_sdk::planner::Planner;

use crate::output::{format_descriptor, format_outputs, underline};

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to the module configuration (.yaml, .yml or .json).
    pub file: PathBuf,

    /// Date stamped into the `CreatedDate` tag (YYYY-MM-DD); defaults to today.
    #[arg(long, value_parser = parse_date, env = "VCRAFT_CREATED_DATE")]
    pub created_date: Option<NaiveDate>,

    /// Policy definition catalog mapping display names to identifiers.
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, CREATED_DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// Builds the planner described by the common planning flags.
pub(crate) fn planner(
    created_date: Option<NaiveDate>,
    catalog: Option<&PathBuf>,
) -> anyhow::Result<Planner> {
    let mut planner = Planner::new();
    if let Some(date) = created_date {
        planner = planner.created_date(date);
    }
    if let Some(path) = catalog {
        let catalog = load_catalog(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?;
        tracing::debug!(definitions = catalog.len(), "catalog loaded");
        planner = planner.with_lookup(catalog);
    }
    Ok(planner)
}

/// Executes the `plan` command.
///
/// Composes the configuration, groups descriptors into reconciliation
/// stages, and renders them with sensitive values masked.
///
/// # Errors
///
/// Returns an error if loading, validation, composition or definition
/// lookup fails.
pub fn execute(args: &PlanArgs) -> anyhow::Result<String> {
    let config = super::load_config(&args.file)?;
    let plan = planner(args.created_date, args.catalog.as_ref())?.plan(&config)?;

    let title = format!("Key Vault plan for: {}", args.file.display());
    let mut out = format!("{title}\n{}\n", underline(&title));

    for (index, stage) in plan.stages.iter().enumerate() {
        let _ = writeln!(out, "\nStage {} ({} resource(s))", index + 1, stage.len());
        for key in stage {
            if let Some(descriptor) = plan.graph.get(key) {
                out.push_str(&format_descriptor(descriptor));
            }
        }
    }

    let _ = writeln!(
        out,
        "\n  {} resource(s) in {} stage(s) will be reconciled.",
        plan.graph.len(),
        plan.stages.len()
    );

    let unresolved = plan.unresolved_definitions();
    if !unresolved.is_empty() {
        let _ = writeln!(
            out,
            "  {} policy definition(s) await lookup; pass --catalog to resolve them.",
            unresolved.len()
        );
    }

    out.push_str("\nOutputs:\n");
    out.push_str(&format_outputs(plan.graph.outputs()));
    Ok(out)
}
