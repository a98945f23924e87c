//! # xcrunner-xcode - Xcode Toolchain Adapters
//!
//! External tool collaborators for xcrunner: device inventory feeds,
//! the pure inventory merger, Xcode project discovery, CocoaPods
//! provisioning, xcodebuild invocation, and the simulator /
//! physical-device launchers.
//!
//! Depends on [`xcrunner_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Inventory (`devices`, `inventory`)
//! - [`fetch_availability_feed()`] - `xcrun xctrace list devices`
//! - [`fetch_runtime_feed()`] - `xcrun simctl list --json devices`
//! - [`merge()`], [`merge_booted()`] - pure feed reconciliation
//! - [`fallback_simulator()`] - deterministic default simulator choice
//!
//! ### Build (`project`, `pods`, `build`)
//! - [`find_xcode_project()`] - locate `.xcworkspace` / `.xcodeproj`
//! - [`install_pods()`] - CocoaPods provisioning
//! - [`resolve_build_settings()`], [`build_project()`] - xcodebuild
//!
//! ### Launch (`simulator`, `physical`, `process`)
//! - [`simulator`] - boot / install / launch via `simctl`
//! - [`physical`] - install / launch via `devicectl`
//! - [`spawn_foreground()`] - inherited-stdio child for log streaming

pub mod build;
pub mod devices;
pub mod inventory;
pub mod physical;
pub mod pods;
pub mod process;
pub mod project;
pub mod simulator;

// Public API re-exports
pub use build::{build_project, bundle_id_of_app, resolve_build_settings, BuiltProduct};
pub use devices::{
    fetch_availability_feed, fetch_runtime_feed, parse_runtime_name, AvailabilityEntry,
    RuntimeEntry, RuntimeFeed,
};
pub use inventory::{fallback_simulator, merge, merge_booted};
pub use pods::{has_podfile, install_pods, pods_out_of_date};
pub use process::spawn_foreground;
pub use project::{find_xcode_project, XcodeProject};
