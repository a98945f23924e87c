//! # xcrunner-core - Core Domain Types
//!
//! Foundation crate for xcrunner. Provides domain types, error handling,
//! and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Device`] - A resolved execution target (simulator or hardware)
//! - [`DeviceKind`] - Simulator vs physical hardware
//! - [`DeviceState`] - Boot state (Booted, Shutdown, Unknown)
//! - [`Platform`] - Apple platform (iOS, tvOS, visionOS, macOS)
//! - [`RunTarget`] - Output of the selection policy
//! - [`BuildSettings`] - Resolved build configuration + scheme
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use xcrunner_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all xcrunner crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use types::{BuildSettings, Device, DeviceKind, DeviceState, Platform, RunTarget};
