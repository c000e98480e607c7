//! # vaultcraft-compose
//!
//! Composition engine turning a key vault module configuration into a
//! desired resource graph.
//!
//! Handles:
//! - **Validator**: Static checks and parsing of enumerated settings.
//! - **Naming**: Vault name, derived child names and tag resolution.
//! - **Mode**: RBAC role bindings versus legacy access policies.
//! - **Material**: Keys, secrets, certificates and contacts.
//! - **Infra / Policy**: Conditional network, observability and governance resources.
//! - **Graph**: Invariant checks, ordering and staging with `petgraph`.
//! - **Lookup**: Late resolution of built-in policy definitions.

pub mod composer;
pub mod descriptor;
pub mod graph;
pub mod infra;
pub mod lookup;
pub mod material;
pub mod mode;
pub mod naming;
pub mod outputs;
pub mod policy;
pub mod resource_id;
pub mod validator;

pub use composer::Composer;
pub use graph::{DesiredGraph, GraphBuilder};
pub use lookup::{PolicyDefinitionLookup, StaticCatalog, resolve_definitions};
