//! # xcrunner-app - Selection Policy & Run Orchestration
//!
//! The application layer of xcrunner: turns flags and device inventory
//! into a run target and drives the build-install-launch pipeline
//! against it.
//!
//! Depends on [`xcrunner_core`] for domain types and on
//! [`xcrunner_xcode`] for every external tool interaction.
//!
//! ## Public API
//!
//! - [`RunFlags`] - immutable per-invocation configuration
//! - [`select()`] / [`Selection`] - pure device selection policy
//! - [`run()`] - the run orchestrator (`xcr run`)
//! - [`tail()`] - the log tail controller (`xcr log`)
//! - [`DeviceCache`] - last-used device preference
//! - [`prompt_select()`] - interactive device picker

pub mod cache;
pub mod flags;
pub mod prompt;
pub mod run;
pub mod select;
pub mod tail;

// Public API re-exports
pub use cache::DeviceCache;
pub use flags::RunFlags;
pub use prompt::prompt_select;
pub use run::{run, DispatchOutcome, RunContext};
pub use select::{format_inventory, select, Selection};
pub use tail::tail;
