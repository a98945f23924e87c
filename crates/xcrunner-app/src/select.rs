//! Device selection policy
//!
//! A pure state machine over the merged inventory and the run flags.
//! Request modes are mutually exclusive and evaluated in a fixed
//! precedence; the caller performs any prompting, caching or
//! dispatching the returned decision asks for.

use crate::flags::RunFlags;
use xcrunner_core::prelude::*;
use xcrunner_core::types::{Device, DeviceKind, RunTarget};

/// Decision produced by [`select`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// `--device` and `--udid` were both given
    Conflict,

    /// Present the inventory and let the user choose
    Prompt,

    /// A resolved target, ready for dispatch
    Target(RunTarget),
}

/// Resolve the run target from inventory and flags
///
/// Precedence:
/// 1. conflicting explicit selectors fail fast
/// 2. `--list-devices` / `--interactive` win over other selectors
/// 3. no selector: every booted device, physical first; nothing booted
///    falls back to the default simulator
/// 4. `--udid`: exact identifier lookup
/// 5. `--device`: substring match over physical devices
/// 6. `--simulator`: named simulator, else the default one
pub fn select(inventory: &[Device], flags: &RunFlags) -> Selection {
    if flags.conflicting_selectors() {
        return Selection::Conflict;
    }

    if flags.wants_prompt() {
        if flags.has_selector() {
            warn!("Ignoring --device/--udid/--simulator because an interactive listing was requested");
        }
        return Selection::Prompt;
    }

    if let Some(udid) = &flags.udid {
        return Selection::Target(select_by_udid(inventory, udid));
    }

    if let Some(name) = &flags.device {
        return Selection::Target(select_by_device_name(inventory, name));
    }

    if let Some(name) = &flags.simulator {
        return Selection::Target(select_by_simulator_name(inventory, name));
    }

    Selection::Target(select_booted_union(inventory))
}

/// No explicit target: the union of currently-booted physical devices
/// and booted simulators, physical first, inventory order preserved
/// within each group
fn select_booted_union(inventory: &[Device]) -> RunTarget {
    let booted_physical = inventory
        .iter()
        .filter(|d| d.kind == DeviceKind::Physical && d.is_booted());
    let booted_simulators = inventory
        .iter()
        .filter(|d| d.kind == DeviceKind::Simulator && d.is_booted());

    let union: Vec<Device> = booted_physical.chain(booted_simulators).cloned().collect();

    if union.is_empty() {
        RunTarget::FallbackSimulator
    } else {
        RunTarget::Many(union)
    }
}

fn select_by_udid(inventory: &[Device], udid: &str) -> RunTarget {
    match inventory.iter().find(|d| d.udid == udid) {
        // A udid that resolves to a simulator is launched through the
        // default-simulator path, not the addressed one. Legacy
        // behavior, kept until a product decision says otherwise.
        Some(device) if device.kind == DeviceKind::Simulator => RunTarget::FallbackSimulator,
        Some(device) => RunTarget::Single(device.clone()),
        None => RunTarget::None {
            reason: format!(
                "Could not find a device with udid '{}'. Known devices:\n{}",
                udid,
                format_inventory(inventory)
            ),
        },
    }
}

fn select_by_device_name(inventory: &[Device], name: &str) -> RunTarget {
    let matched = inventory
        .iter()
        .filter(|d| d.kind == DeviceKind::Physical)
        .find(|d| d.matches_name(name));

    match matched {
        Some(device) => RunTarget::Single(device.clone()),
        None => RunTarget::None {
            reason: format!(
                "Could not find a device named '{}'. Known devices:\n{}",
                name,
                format_inventory(inventory)
            ),
        },
    }
}

fn select_by_simulator_name(inventory: &[Device], name: &str) -> RunTarget {
    let simulators: Vec<&Device> = inventory
        .iter()
        .filter(|d| d.kind == DeviceKind::Simulator)
        .collect();

    let exact = simulators.iter().find(|d| d.name == name);
    let case_insensitive = simulators
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name));
    let substring = simulators.iter().find(|d| d.matches_name(name));

    match exact.or(case_insensitive).or(substring) {
        Some(device) => RunTarget::Single((*device).clone()),
        None => RunTarget::FallbackSimulator,
    }
}

/// One line per device, for resolution-miss diagnostics
pub fn format_inventory(inventory: &[Device]) -> String {
    if inventory.is_empty() {
        return "  (none)".to_string();
    }
    inventory
        .iter()
        .map(|d| format!("  {} - {}", d.display_string(), d.udid))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use xcrunner_core::types::DeviceState;

    fn physical(udid: &str, name: &str) -> Device {
        Device::new(udid, name, DeviceKind::Physical).with_sdk("iOS 18.1")
    }

    fn simulator(udid: &str, name: &str) -> Device {
        Device::new(udid, name, DeviceKind::Simulator).with_sdk("iOS 18.2")
    }

    fn booted(device: Device) -> Device {
        device.with_state(DeviceState::Booted)
    }

    #[test]
    fn test_conflicting_selectors_always_fail() {
        let flags = RunFlags {
            device: Some("iPhone".to_string()),
            udid: Some("ABC".to_string()),
            ..Default::default()
        };

        // Regardless of inventory contents.
        assert_eq!(select(&[], &flags), Selection::Conflict);
        let inventory = vec![physical("ABC", "iPhone")];
        assert_eq!(select(&inventory, &flags), Selection::Conflict);
    }

    #[test]
    fn test_prompt_wins_over_other_selectors() {
        let flags = RunFlags {
            udid: Some("ABC".to_string()),
            list_devices: true,
            ..Default::default()
        };
        assert_eq!(select(&[], &flags), Selection::Prompt);

        let flags = RunFlags {
            interactive: true,
            ..Default::default()
        };
        assert_eq!(select(&[], &flags), Selection::Prompt);
    }

    #[test]
    fn test_no_selector_nothing_booted_yields_fallback() {
        let inventory = vec![
            physical("dev-1", "My iPhone"),
            simulator("sim-1", "iPhone 16"),
        ];
        assert_eq!(
            select(&inventory, &RunFlags::default()),
            Selection::Target(RunTarget::FallbackSimulator)
        );
    }

    #[test]
    fn test_no_selector_dispatches_physical_before_simulators() {
        let inventory = vec![
            booted(simulator("sim-1", "iPhone 16")),
            booted(physical("dev-1", "My iPhone")),
            booted(simulator("sim-2", "iPad Air")),
            booted(physical("dev-2", "Other iPhone")),
            simulator("sim-3", "iPhone 15"),
        ];

        let Selection::Target(RunTarget::Many(devices)) = select(&inventory, &RunFlags::default())
        else {
            panic!("expected Many target");
        };

        let udids: Vec<&str> = devices.iter().map(|d| d.udid.as_str()).collect();
        assert_eq!(udids, vec!["dev-1", "dev-2", "sim-1", "sim-2"]);
    }

    #[test]
    fn test_no_selector_only_booted_simulator_is_dispatched() {
        // Physical A is available but not booted, simulator B is booted.
        let inventory = vec![
            physical("A", "My iPhone"),
            booted(simulator("B", "iPhone 16")),
        ];

        let Selection::Target(RunTarget::Many(devices)) = select(&inventory, &RunFlags::default())
        else {
            panic!("expected Many target");
        };

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].udid, "B");
    }

    #[test]
    fn test_udid_not_found_lists_known_devices() {
        let inventory = vec![physical("A", "My iPhone"), simulator("B", "iPhone 16")];
        let flags = RunFlags {
            udid: Some("Z".to_string()),
            ..Default::default()
        };

        let Selection::Target(RunTarget::None { reason }) = select(&inventory, &flags) else {
            panic!("expected None target");
        };
        assert!(reason.contains("'Z'"));
        assert!(reason.contains("A"));
        assert!(reason.contains("B"));
    }

    #[test]
    fn test_udid_physical_hit_is_single() {
        let inventory = vec![physical("A", "My iPhone")];
        let flags = RunFlags {
            udid: Some("A".to_string()),
            ..Default::default()
        };
        assert_eq!(
            select(&inventory, &flags),
            Selection::Target(RunTarget::Single(inventory[0].clone()))
        );
    }

    #[test]
    fn test_udid_simulator_hit_goes_through_fallback_path() {
        let inventory = vec![simulator("B", "iPhone 16")];
        let flags = RunFlags {
            udid: Some("B".to_string()),
            ..Default::default()
        };
        assert_eq!(
            select(&inventory, &flags),
            Selection::Target(RunTarget::FallbackSimulator)
        );
    }

    #[test]
    fn test_device_name_matches_physical_only() {
        let inventory = vec![
            simulator("sim-1", "iPhone 16"),
            physical("dev-1", "Ada's iPhone 15"),
        ];
        let flags = RunFlags {
            device: Some("iphone".to_string()),
            ..Default::default()
        };

        assert_eq!(
            select(&inventory, &flags),
            Selection::Target(RunTarget::Single(inventory[1].clone()))
        );
    }

    #[test]
    fn test_device_name_no_match_reports() {
        let inventory = vec![physical("dev-1", "My iPhone")];
        let flags = RunFlags {
            device: Some("Pixel".to_string()),
            ..Default::default()
        };

        let Selection::Target(RunTarget::None { reason }) = select(&inventory, &flags) else {
            panic!("expected None target");
        };
        assert!(reason.contains("'Pixel'"));
    }

    #[test]
    fn test_simulator_name_prefers_exact_match() {
        let inventory = vec![
            simulator("sim-1", "iPhone 16 Pro Max"),
            simulator("sim-2", "iPhone 16 Pro"),
        ];
        let flags = RunFlags {
            simulator: Some("iPhone 16 Pro".to_string()),
            ..Default::default()
        };

        assert_eq!(
            select(&inventory, &flags),
            Selection::Target(RunTarget::Single(inventory[1].clone()))
        );
    }

    #[test]
    fn test_simulator_name_falls_back_when_unknown() {
        let inventory = vec![simulator("sim-1", "iPhone 16")];
        let flags = RunFlags {
            simulator: Some("iPhone 99".to_string()),
            ..Default::default()
        };
        assert_eq!(
            select(&inventory, &flags),
            Selection::Target(RunTarget::FallbackSimulator)
        );
    }

    #[test]
    fn test_format_inventory_empty() {
        assert_eq!(format_inventory(&[]), "  (none)");
    }
}
