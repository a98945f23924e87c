//! Device inventory feeds
//!
//! Two independent feeds are consulted and later reconciled by udid
//! (see [`crate::inventory`]):
//!
//! - the availability feed from `xcrun xctrace list devices` (identity,
//!   OS version, reachability), parsed from sectioned text output
//! - the runtime-state feed from `xcrun simctl list --json devices`
//!   (boot state per simulator runtime)

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use tokio::process::Command;
use xcrunner_core::prelude::*;
use xcrunner_core::types::{DeviceKind, DeviceState, Platform};

/// Static regex for one xctrace device line:
/// "iPhone 16 Pro (18.2) (1A2B3C4D-0000-4000-8000-1234567890AB)"
static DEVICE_LINE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^(?P<name>.+?)(?:\s+Simulator)?\s+\((?P<version>[0-9.]+)\)\s+\((?P<udid>[0-9A-Fa-f-]+)\)$")
        .expect("Invalid device line regex")
});

/// A record from the availability feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityEntry {
    pub udid: String,
    pub name: String,
    pub kind: DeviceKind,
    /// Bare OS version, e.g. "18.2". The listing never names the OS
    /// family; simulators get theirs from the runtime feed, hardware
    /// has none (see [`crate::inventory::merge`]).
    pub sdk: String,
    pub is_available: bool,
}

/// The runtime-state feed: boot state per udid, plus the simulator
/// runtime it belongs to
#[derive(Debug, Clone, Default)]
pub struct RuntimeFeed {
    entries: HashMap<String, RuntimeEntry>,
}

/// One runtime-feed record
#[derive(Debug, Clone)]
pub struct RuntimeEntry {
    pub udid: String,
    pub name: String,
    pub state: DeviceState,
    pub is_available: bool,
    /// Friendly runtime name, e.g. "iOS 18.2"
    pub runtime: String,
}

impl RuntimeFeed {
    pub fn lookup(&self, udid: &str) -> Option<&RuntimeEntry> {
        self.entries.get(udid)
    }

    pub fn entries(&self) -> impl Iterator<Item = &RuntimeEntry> {
        self.entries.values()
    }

    /// Booted entries for a platform, in deterministic (udid) order
    pub fn booted(&self, platform: Platform) -> Vec<&RuntimeEntry> {
        let mut booted: Vec<&RuntimeEntry> = self
            .entries
            .values()
            .filter(|e| {
                e.state == DeviceState::Booted
                    && e.is_available
                    && e.runtime.starts_with(platform.runtime_fragment())
            })
            .collect();
        booted.sort_by(|a, b| a.udid.cmp(&b.udid));
        booted
    }

    #[cfg(test)]
    pub fn from_entries(entries: Vec<RuntimeEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.udid.clone(), e)).collect(),
        }
    }
}

/// Fetch the availability feed via `xcrun xctrace list devices`
///
/// Fails with [`Error::ToolInvocation`] if the enumeration utility
/// cannot run; an empty device list is not an error.
pub async fn fetch_availability_feed() -> Result<Vec<AvailabilityEntry>> {
    let output = Command::new("xcrun")
        .args(["xctrace", "list", "devices"])
        .output()
        .await
        .map_err(|e| Error::tool("xcrun xctrace", e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool(
            "xcrun xctrace",
            format!("list devices failed: {}", stderr.trim()),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_xctrace_output(&stdout))
}

/// Fetch the runtime-state feed via `xcrun simctl list --json devices`
pub async fn fetch_runtime_feed() -> Result<RuntimeFeed> {
    let output = Command::new("xcrun")
        .args(["simctl", "list", "--json", "devices"])
        .output()
        .await
        .map_err(|e| Error::tool("xcrun simctl", e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool(
            "xcrun simctl",
            format!("list devices failed: {}", stderr.trim()),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_simctl_output(&stdout)
}

/// Current section of the xctrace listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Devices,
    OfflineDevices,
    Simulators,
    None,
}

/// Parse the sectioned text output of `xcrun xctrace list devices`
///
/// ```text
/// == Devices ==
/// My iPhone (18.1) (00008120-001E30EC0AF0C01E)
///
/// == Devices Offline ==
/// Old iPhone (16.7) (00008030-000D15E23C41802E)
///
/// == Simulators ==
/// iPhone 16 Pro (18.2) (1A2B3C4D-0000-4000-8000-1234567890AB)
/// ```
///
/// The host Mac also appears under `== Devices ==` without a version;
/// lines that do not match the device pattern are skipped.
fn parse_xctrace_output(output: &str) -> Vec<AvailabilityEntry> {
    let mut section = Section::None;
    let mut entries = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("==") {
            section = match line {
                "== Devices ==" => Section::Devices,
                "== Devices Offline ==" => Section::OfflineDevices,
                "== Simulators ==" => Section::Simulators,
                _ => Section::None,
            };
            continue;
        }

        let Some(caps) = DEVICE_LINE.captures(line) else {
            trace!("Skipping non-device line: {}", line);
            continue;
        };

        let (kind, is_available) = match section {
            Section::Devices => (DeviceKind::Physical, true),
            Section::OfflineDevices => (DeviceKind::Physical, false),
            Section::Simulators => (DeviceKind::Simulator, true),
            Section::None => continue,
        };

        entries.push(AvailabilityEntry {
            udid: caps["udid"].to_string(),
            name: caps["name"].to_string(),
            kind,
            sdk: caps["version"].to_string(),
            is_available,
        });
    }

    entries
}

/// JSON shape of `xcrun simctl list --json devices`
#[derive(Debug, Deserialize)]
struct SimctlOutput {
    devices: HashMap<String, Vec<SimctlDevice>>,
}

#[derive(Debug, Deserialize)]
struct SimctlDevice {
    udid: String,
    name: String,
    state: String,
    #[serde(rename = "isAvailable", default)]
    is_available: Option<bool>,
}

fn parse_simctl_output(json_str: &str) -> Result<RuntimeFeed> {
    let parsed: SimctlOutput = serde_json::from_str(json_str)
        .map_err(|e| Error::protocol(format!("Failed to parse simctl output: {}", e)))?;

    let mut entries = HashMap::new();
    for (runtime_key, devices) in parsed.devices {
        let runtime = parse_runtime_name(&runtime_key);
        for device in devices {
            entries.insert(
                device.udid.clone(),
                RuntimeEntry {
                    udid: device.udid,
                    name: device.name,
                    state: DeviceState::from(device.state.as_str()),
                    is_available: device.is_available != Some(false),
                    runtime: runtime.clone(),
                },
            );
        }
    }

    Ok(RuntimeFeed { entries })
}

/// Parse runtime identifier to friendly name
/// "com.apple.CoreSimulator.SimRuntime.iOS-18-2" -> "iOS 18.2"
pub fn parse_runtime_name(identifier: &str) -> String {
    if let Some(suffix) = identifier.strip_prefix("com.apple.CoreSimulator.SimRuntime.") {
        if let Some((os_name, version)) = suffix.split_once('-') {
            format!("{} {}", os_name, version.replace('-', "."))
        } else {
            suffix.to_string()
        }
    } else {
        identifier.to_string()
    }
}
