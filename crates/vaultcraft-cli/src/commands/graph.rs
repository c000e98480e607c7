//! `vcraft graph` — Emit the desired graph for other tools.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};

use super::plan::planner;

/// Output format of the `graph` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// Descriptors and outputs as pretty-printed JSON.
    Json,
    /// Dependency edges in Graphviz DOT.
    Dot,
}

/// Arguments for the `graph` command.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Path to the module configuration (.yaml, .yml or .json).
    pub file: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = GraphFormat::Json)]
    pub format: GraphFormat,

    /// Date stamped into the `CreatedDate` tag (YYYY-MM-DD); defaults to today.
    #[arg(long, value_parser = super::plan::parse_date, env = "VCRAFT_CREATED_DATE")]
    pub created_date: Option<NaiveDate>,

    /// Policy definition catalog mapping display names to identifiers.
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

/// Executes the `graph` command.
///
/// JSON output includes sensitive attribute values, unmasked; it is meant
/// for a reconciler, not for display.
///
/// # Errors
///
/// Returns an error if loading, composition or serialization fails.
pub fn execute(args: &GraphArgs) -> anyhow::Result<String> {
    let config = super::load_config(&args.file)?;
    let plan = planner(args.created_date, args.catalog.as_ref())?.plan(&config)?;
    match args.format {
        GraphFormat::Json => {
            let mut json = serde_json::to_string_pretty(&plan.graph)?;
            json.push('\n');
            Ok(json)
        }
        GraphFormat::Dot => Ok(plan.graph.to_dot()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{CONFIG, config_file};

    fn args(file: &tempfile::NamedTempFile, format: GraphFormat) -> GraphArgs {
        GraphArgs {
            file: file.path().to_path_buf(),
            format,
            created_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            catalog: None,
        }
    }

    #[test]
    fn json_graph_has_descriptors_and_outputs() {
        let file = config_file(CONFIG);
        let out = execute(&args(&file, GraphFormat::Json)).expect("graph");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        let vault = &value["descriptors"]["azurerm_key_vault.this"];
        assert_eq!(vault["kind"], "key_vault");
        assert_eq!(vault["attributes"]["name"], "kv-prod-eus01");
        assert_eq!(
            value["outputs"]["key_vault_id"],
            "${azurerm_key_vault.this.id}"
        );
        let secret = &value["descriptors"]["azurerm_key_vault_secret.this[\"db\"]"];
        assert_eq!(secret["sensitive"][0], "value");
    }

    #[test]
    fn dot_graph_lists_edges() {
        let file = config_file(CONFIG);
        let out = execute(&args(&file, GraphFormat::Dot)).expect("graph");
        assert!(out.starts_with("digraph desired {"));
        assert!(out.contains(r#""azurerm_key_vault.this" -> "azurerm_management_lock.this";"#));
    }
}
