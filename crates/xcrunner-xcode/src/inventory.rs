//! Inventory merger
//!
//! Pure reconciliation of the two device feeds (no process or network
//! I/O), joined by udid equality only. Keeping this free of I/O makes
//! the merge behavior deterministic and directly testable.
//!
//! Reconciliation policy: the runtime feed wins for mutable state (boot
//! state), the availability feed wins for static identity (name, kind).
//! A simulator udid the runtime feed has never heard of is stale and is
//! dropped rather than matched speculatively; physical hardware is not
//! tracked by the runtime feed and is kept with `Unknown` state.

use crate::devices::{AvailabilityEntry, RuntimeFeed};
use xcrunner_core::types::{Device, DeviceKind, DeviceState, Platform};

/// Merge the availability and runtime feeds into one normalized device
/// list, filtered to the given platform
///
/// The output preserves availability-feed order. An empty result is a
/// valid "no devices" outcome, never an error.
pub fn merge(
    availability: &[AvailabilityEntry],
    runtime: &RuntimeFeed,
    platform: Platform,
) -> Vec<Device> {
    availability
        .iter()
        .filter(|entry| entry.is_available)
        .filter_map(|entry| {
            let record = runtime.lookup(&entry.udid);

            match entry.kind {
                DeviceKind::Physical => {
                    // The availability feed reports only a bare OS
                    // version for hardware, so the OS family cannot be
                    // read off the feed. Hardware dispatch is supported
                    // for iOS alone; units whose default name marks
                    // another family are dropped (renamed ones cannot
                    // be told apart).
                    if !platform.supports_physical() || non_ios_hardware(&entry.name) {
                        return None;
                    }
                    let state = record.map(|r| r.state).unwrap_or(DeviceState::Unknown);
                    Some(
                        Device::new(&entry.udid, &entry.name, DeviceKind::Physical)
                            .with_sdk(&entry.sdk)
                            .with_state(state),
                    )
                }
                DeviceKind::Simulator => {
                    // Only the runtime feed can tell which OS a simulator
                    // runs; one without a runtime record is stale.
                    let record = record?;
                    if !record.is_available
                        || !record.runtime.starts_with(platform.runtime_fragment())
                    {
                        return None;
                    }
                    Some(
                        Device::new(&entry.udid, &entry.name, DeviceKind::Simulator)
                            .with_sdk(&record.runtime)
                            .with_state(record.state),
                    )
                }
            }
        })
        .collect()
}

/// Hardware whose default name identifies a non-iOS family
fn non_ios_hardware(name: &str) -> bool {
    ["Apple TV", "Vision Pro", "Apple Watch"]
        .iter()
        .any(|marker| name.contains(marker))
}

/// Merge variant for the log tail flow: only booted simulator
/// instances for the platform
///
/// Starts from the runtime feed (the authority on boot state) and fills
/// identity from the availability feed where present. Order is the
/// runtime feed's deterministic (udid-sorted) order.
pub fn merge_booted(
    availability: &[AvailabilityEntry],
    runtime: &RuntimeFeed,
    platform: Platform,
) -> Vec<Device> {
    runtime
        .booted(platform)
        .into_iter()
        .map(|record| {
            let name = availability
                .iter()
                .find(|e| e.udid == record.udid)
                .map(|e| e.name.clone())
                .unwrap_or_else(|| record.name.clone());

            Device::new(&record.udid, name, DeviceKind::Simulator)
                .with_sdk(&record.runtime)
                .with_state(DeviceState::Booted)
        })
        .collect()
}

/// Deterministically choose the default simulator profile
///
/// Preference order: a booted simulator first, then iPhone profiles
/// over other device families, then the newest SDK; remaining ties keep
/// inventory order.
pub fn fallback_simulator(inventory: &[Device]) -> Option<Device> {
    let mut simulators: Vec<&Device> = inventory
        .iter()
        .filter(|d| d.kind == DeviceKind::Simulator && d.is_available)
        .collect();

    simulators.sort_by(|a, b| {
        b.is_booted()
            .cmp(&a.is_booted())
            .then_with(|| {
                b.name
                    .starts_with("iPhone")
                    .cmp(&a.name.starts_with("iPhone"))
            })
            .then_with(|| sdk_version_key(&b.sdk).cmp(&sdk_version_key(&a.sdk)))
    });

    simulators.first().map(|d| (*d).clone())
}

/// Numeric sort key for an SDK tag like "iOS 18.2"
fn sdk_version_key(sdk: &str) -> (u32, u32) {
    let version = sdk.rsplit(' ').next().unwrap_or(sdk);
    let mut parts = version.split('.');
    let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    (major, minor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::RuntimeEntry;

    fn avail(udid: &str, name: &str, kind: DeviceKind, sdk: &str) -> AvailabilityEntry {
        AvailabilityEntry {
            udid: udid.to_string(),
            name: name.to_string(),
            kind,
            sdk: sdk.to_string(),
            is_available: true,
        }
    }

    fn rt(udid: &str, name: &str, state: DeviceState, runtime: &str) -> RuntimeEntry {
        RuntimeEntry {
            udid: udid.to_string(),
            name: name.to_string(),
            state,
            is_available: true,
            runtime: runtime.to_string(),
        }
    }

    #[test]
    fn test_merge_non_overlapping_feeds_is_empty() {
        let availability = vec![
            avail("sim-1", "iPhone 16", DeviceKind::Simulator, "18.2"),
            avail("sim-2", "iPhone 15", DeviceKind::Simulator, "17.5"),
        ];
        let runtime = RuntimeFeed::from_entries(vec![rt(
            "sim-9",
            "iPad Air",
            DeviceState::Booted,
            "iOS 18.2",
        )]);

        assert!(merge(&availability, &runtime, Platform::Ios).is_empty());
    }

    #[test]
    fn test_merge_reconciliation_policy() {
        // Runtime feed wins for boot state, availability for name/kind.
        let availability = vec![avail("sim-1", "iPhone 16", DeviceKind::Simulator, "18.2")];
        let runtime = RuntimeFeed::from_entries(vec![rt(
            "sim-1",
            "Renamed In Runtime",
            DeviceState::Booted,
            "iOS 18.2",
        )]);

        let merged = merge(&availability, &runtime, Platform::Ios);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "iPhone 16");
        assert_eq!(merged[0].kind, DeviceKind::Simulator);
        assert_eq!(merged[0].state, DeviceState::Booted);
        assert_eq!(merged[0].sdk, "iOS 18.2");
    }

    #[test]
    fn test_merge_filters_unavailable() {
        let mut offline = avail("dev-1", "Old iPhone", DeviceKind::Physical, "16.7");
        offline.is_available = false;
        let availability = vec![
            offline,
            avail("dev-2", "My iPhone", DeviceKind::Physical, "18.1"),
        ];
        let runtime = RuntimeFeed::default();

        let merged = merge(&availability, &runtime, Platform::Ios);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].udid, "dev-2");
        assert_eq!(merged[0].state, DeviceState::Unknown);
    }

    #[test]
    fn test_merge_platform_filter() {
        let availability = vec![
            avail("sim-ios", "iPhone 16", DeviceKind::Simulator, "18.2"),
            avail("sim-tv", "Apple TV 4K", DeviceKind::Simulator, "18.0"),
        ];
        let runtime = RuntimeFeed::from_entries(vec![
            rt("sim-ios", "iPhone 16", DeviceState::Shutdown, "iOS 18.2"),
            rt("sim-tv", "Apple TV 4K", DeviceState::Shutdown, "tvOS 18.0"),
        ]);

        let ios = merge(&availability, &runtime, Platform::Ios);
        assert_eq!(ios.len(), 1);
        assert_eq!(ios[0].udid, "sim-ios");

        let tvos = merge(&availability, &runtime, Platform::TvOs);
        assert_eq!(tvos.len(), 1);
        assert_eq!(tvos[0].udid, "sim-tv");
    }

    #[test]
    fn test_merge_hardware_resolves_for_ios_only() {
        let availability = vec![
            avail("tv-hw", "Living Room Apple TV", DeviceKind::Physical, "17.0"),
            avail("dev-1", "My iPhone", DeviceKind::Physical, "18.1"),
        ];
        let runtime = RuntimeFeed::default();

        // Non-iOS hardware must not land in the iOS inventory, and no
        // hardware is resolvable under the other platforms.
        let ios = merge(&availability, &runtime, Platform::Ios);
        assert_eq!(ios.len(), 1);
        assert_eq!(ios[0].udid, "dev-1");
        assert_eq!(ios[0].sdk, "18.1");

        assert!(merge(&availability, &runtime, Platform::TvOs).is_empty());
        assert!(merge(&availability, &runtime, Platform::VisionOs).is_empty());
    }

    #[test]
    fn test_merge_preserves_feed_order() {
        let availability = vec![
            avail("dev-1", "iPhone B", DeviceKind::Physical, "18.1"),
            avail("sim-1", "Sim A", DeviceKind::Simulator, "18.2"),
            avail("dev-2", "iPhone A", DeviceKind::Physical, "18.1"),
        ];
        let runtime = RuntimeFeed::from_entries(vec![rt(
            "sim-1",
            "Sim A",
            DeviceState::Shutdown,
            "iOS 18.2",
        )]);

        let merged = merge(&availability, &runtime, Platform::Ios);
        let udids: Vec<&str> = merged.iter().map(|d| d.udid.as_str()).collect();
        assert_eq!(udids, vec!["dev-1", "sim-1", "dev-2"]);
    }

    #[test]
    fn test_merge_booted_only_booted_simulators() {
        let availability = vec![avail("sim-1", "iPhone 16", DeviceKind::Simulator, "18.2")];
        let runtime = RuntimeFeed::from_entries(vec![
            rt("sim-1", "iPhone 16", DeviceState::Booted, "iOS 18.2"),
            rt("sim-2", "iPhone 15", DeviceState::Shutdown, "iOS 18.2"),
            rt("sim-3", "Unlisted iPad", DeviceState::Booted, "iOS 18.2"),
        ]);

        let booted = merge_booted(&availability, &runtime, Platform::Ios);
        assert_eq!(booted.len(), 2);
        // udid-sorted order; names filled from the availability feed
        // where present, from the runtime feed otherwise.
        assert_eq!(booted[0].name, "iPhone 16");
        assert_eq!(booted[1].name, "Unlisted iPad");
        assert!(booted.iter().all(|d| d.is_booted()));
    }

    #[test]
    fn test_merge_booted_empty_is_ok() {
        let booted = merge_booted(&[], &RuntimeFeed::default(), Platform::Ios);
        assert!(booted.is_empty());
    }

    #[test]
    fn test_fallback_prefers_booted_then_iphone_then_newest() {
        let inventory = vec![
            Device::new("a", "iPad Air", DeviceKind::Simulator).with_sdk("iOS 18.2"),
            Device::new("b", "iPhone 15", DeviceKind::Simulator).with_sdk("iOS 17.5"),
            Device::new("c", "iPhone 16 Pro", DeviceKind::Simulator).with_sdk("iOS 18.2"),
        ];

        // No booted simulator: newest iPhone wins.
        assert_eq!(fallback_simulator(&inventory).unwrap().udid, "c");

        // A booted one beats everything else.
        let mut with_booted = inventory.clone();
        with_booted[0] = with_booted[0].clone().with_state(DeviceState::Booted);
        assert_eq!(fallback_simulator(&with_booted).unwrap().udid, "a");
    }

    #[test]
    fn test_fallback_ignores_physical_devices() {
        let inventory = vec![Device::new("dev", "My iPhone", DeviceKind::Physical)];
        assert!(fallback_simulator(&inventory).is_none());
        assert!(fallback_simulator(&[]).is_none());
    }

    #[test]
    fn test_sdk_version_key() {
        assert_eq!(sdk_version_key("iOS 18.2"), (18, 2));
        assert_eq!(sdk_version_key("17.5"), (17, 5));
        assert_eq!(sdk_version_key("garbage"), (0, 0));
        assert!(sdk_version_key("iOS 18.0") > sdk_version_key("iOS 17.5"));
    }
}
