//! CLI command definitions and dispatch.

pub mod graph;
pub mod plan;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use vaultcraft_common::config::ModuleConfig;

/// Vaultcraft — compose key vault modules into desired resource graphs.
#[derive(Parser, Debug)]
#[command(name = "vcraft", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Format of diagnostic logs written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text, env = "VCRAFT_LOG_FORMAT")]
    pub log_format: LogFormat,
}

/// Diagnostic log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a module configuration and report the vault name.
    Validate(validate::ValidateArgs),
    /// Display the planned resources in reconciliation order.
    Plan(plan::PlanArgs),
    /// Emit the desired graph as JSON or Graphviz DOT.
    Graph(graph::GraphArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
#[allow(clippy::print_stdout)]
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let rendered = match cli.command {
        Command::Validate(args) => validate::execute(&args)?,
        Command::Plan(args) => plan::execute(&args)?,
        Command::Graph(args) => graph::execute(&args)?,
    };
    print!("{rendered}");
    Ok(())
}

/// Loads a configuration file, attaching the path to any error.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<ModuleConfig> {
    vaultcraft_sdk::loader::load_config(path)
        .with_context(|| format!("failed to load {}", path.display()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Write;

    pub const CONFIG: &str = "\
environment: prod
location: eastus
location_short: eus
name_suffix: \"01\"
resource_group_name: rg-app
tenant_id: tenant
secrets:
  db:
    name: db-password
    value: hunter2
enable_resource_lock: true
";

    pub fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn planning_commands_share_created_date_env() {
        let cli = Cli::command();
        for name in ["plan", "graph"] {
            let command = cli.find_subcommand(name).expect(name);
            let arg = command
                .get_arguments()
                .find(|a| a.get_id() == "created_date")
                .expect("created_date");
            assert_eq!(
                arg.get_env().and_then(|v| v.to_str()),
                Some("VCRAFT_CREATED_DATE"),
                "{name}"
            );
        }
    }

    #[test]
    fn graph_reads_created_date_flag() {
        let cli = Cli::try_parse_from([
            "vcraft",
            "graph",
            "module.yaml",
            "--format",
            "dot",
            "--created-date",
            "2024-05-01",
        ])
        .expect("parse");
        let Command::Graph(args) = cli.command else {
            panic!("expected graph command");
        };
        assert_eq!(args.created_date, chrono::NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(args.format, graph::GraphFormat::Dot);
    }
}
