//! Unified error types for the Vaultcraft workspace.
//!
//! The composition engine distinguishes user-facing configuration problems
//! ([`VaultcraftError::Validation`]) from defects in its own composition
//! rules ([`VaultcraftError::Graph`]). Everything else is plumbing.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum VaultcraftError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The module configuration violates an invariant.
    ///
    /// Raised before any descriptor is emitted; no partial graph exists.
    #[error("validation failed for `{field}`: {message}")]
    Validation {
        /// Configuration field that failed validation.
        field: String,
        /// Description of the violated constraint.
        message: String,
    },

    /// The assembled resource graph violates an internal invariant
    /// (duplicate logical key, dangling dependency, cycle).
    #[error("dependency graph invariant violated: {message}")]
    Graph {
        /// Description of the violated invariant.
        message: String,
    },

    /// A configuration value or collaborator input is unusable.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// YAML deserialization failed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl VaultcraftError {
    /// Builds a [`VaultcraftError::Validation`] for the given field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds a [`VaultcraftError::Graph`].
    pub fn graph(message: impl Into<String>) -> Self {
        Self::Graph {
            message: message.into(),
        }
    }

    /// Returns `true` if the error was caused by user configuration.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if the error indicates a composition defect.
    #[must_use]
    pub const fn is_graph(&self) -> bool {
        matches!(self, Self::Graph { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, VaultcraftError>;
