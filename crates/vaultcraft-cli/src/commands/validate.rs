//! `vcraft validate` — Check a module configuration without composing it.

use std::path::PathBuf;

use clap::Args;
use vaultcraft_compose::{naming, validator};

/// Arguments for the `validate` command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the module configuration (.yaml, .yml or .json).
    pub file: PathBuf,
}

/// Executes the `validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or fails validation.
pub fn execute(args: &ValidateArgs) -> anyhow::Result<String> {
    let config = super::load_config(&args.file)?;
    let validated = validator::validate(&config)?;
    let mode = if config.enable_rbac_authorization {
        "rbac"
    } else {
        "access policies"
    };
    Ok(format!(
        "{} is valid\n  vault: {} ({}, {mode})\n",
        args.file.display(),
        naming::vault_name(&config),
        validated.sku,
    ))
}
