//! # vaultcraft-sdk
//!
//! Public SDK for using Vaultcraft as a Rust library.
//!
//! Provides three main entry points:
//! - [`ModuleConfigBuilder`](builder::ModuleConfigBuilder): Fluent API for assembling a module configuration.
//! - [`Planner`](planner::Planner): Composes configurations into staged plans and applies them.
//! - [`Reconciler`](reconciler::Reconciler): The seam an apply hands each stage to.
//!
//! # Example
//!
//! ```rust,no_run
//! use vaultcraft_sdk::builder::ModuleConfigBuilder;
//! use vaultcraft_sdk::planner::Planner;
//! use vaultcraft_sdk::reconciler::DryRun;
//!
//! let config = ModuleConfigBuilder::new("eastus", "rg-app", "tenant-id")
//!     .environment("prod", "eus")
//!     .build()?;
//! let planner = Planner::new();
//! let plan = planner.plan(&config)?;
//! let _report = planner.apply(&plan, &mut DryRun::default())?;
//! # Ok::<(), vaultcraft_common::error::VaultcraftError>(())
//! ```

pub mod builder;
pub mod loader;
pub mod planner;
pub mod reconciler;
