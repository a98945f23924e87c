//! Domain types for device resolution and run orchestration

use serde::{Deserialize, Serialize};

/// Apple platform an app can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Ios,
    TvOs,
    VisionOs,
    MacOs,
}

impl Platform {
    /// Whether connected hardware can be resolved for this platform.
    /// The device listing does not name an OS family for hardware, so
    /// only iOS hardware is dispatched; other platforms resolve
    /// simulators only.
    pub fn supports_physical(&self) -> bool {
        matches!(self, Platform::Ios)
    }

    /// Simulator runtime identifier fragment
    /// ("com.apple.CoreSimulator.SimRuntime.iOS-18-2" contains "iOS").
    pub fn runtime_fragment(&self) -> &'static str {
        match self {
            Platform::Ios => "iOS",
            Platform::TvOs => "tvOS",
            Platform::VisionOs => "xrOS",
            Platform::MacOs => "macOS",
        }
    }

    /// Whether this platform builds for the host machine itself.
    /// Desktop builds have no device dispatch and no log tail.
    pub fn is_desktop(&self) -> bool {
        matches!(self, Platform::MacOs)
    }

    /// Directory name conventionally holding the platform project
    pub fn project_dir_name(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::TvOs => "tvos",
            Platform::VisionOs => "visionos",
            Platform::MacOs => "macos",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Ios => write!(f, "iOS"),
            Platform::TvOs => write!(f, "tvOS"),
            Platform::VisionOs => write!(f, "visionOS"),
            Platform::MacOs => write!(f, "macOS"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "tvos" => Ok(Platform::TvOs),
            "visionos" | "xros" => Ok(Platform::VisionOs),
            "macos" => Ok(Platform::MacOs),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Whether a device is a simulator profile or connected hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Simulator,
    Physical,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Simulator => write!(f, "simulator"),
            DeviceKind::Physical => write!(f, "device"),
        }
    }
}

/// Runtime state of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceState {
    Booted,
    Shutdown,
    #[default]
    Unknown,
}

impl From<&str> for DeviceState {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "booted" => DeviceState::Booted,
            "shutdown" => DeviceState::Shutdown,
            _ => DeviceState::Unknown,
        }
    }
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceState::Booted => write!(f, "Booted"),
            DeviceState::Shutdown => write!(f, "Shutdown"),
            DeviceState::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A resolved execution target, reconciled from the availability and
/// runtime feeds by udid
///
/// Constructed fresh on every inventory query; only the udid is ever
/// persisted (as the last-used preference).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Unique device identifier (UDID)
    pub udid: String,

    /// Human-readable name
    pub name: String,

    /// Simulator profile or connected hardware
    pub kind: DeviceKind,

    /// SDK tag (e.g. "iOS 18.2")
    pub sdk: String,

    /// Whether the enumeration utility reports the device usable
    pub is_available: bool,

    /// Boot state from the runtime feed; Unknown when the feed has no
    /// entry for this udid
    pub state: DeviceState,
}

impl Device {
    pub fn new(udid: impl Into<String>, name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            udid: udid.into(),
            name: name.into(),
            kind,
            sdk: String::new(),
            is_available: true,
            state: DeviceState::Unknown,
        }
    }

    /// Set the SDK tag (builder pattern)
    pub fn with_sdk(mut self, sdk: impl Into<String>) -> Self {
        self.sdk = sdk.into();
        self
    }

    /// Set the boot state (builder pattern)
    pub fn with_state(mut self, state: DeviceState) -> Self {
        self.state = state;
        self
    }

    pub fn is_booted(&self) -> bool {
        self.state == DeviceState::Booted
    }

    /// Check if a free-text specifier matches this device's name
    /// (case-insensitive substring)
    pub fn matches_name(&self, specifier: &str) -> bool {
        self.name
            .to_lowercase()
            .contains(&specifier.to_lowercase())
    }

    /// Display string for lists and prompts
    pub fn display_string(&self) -> String {
        if self.sdk.is_empty() {
            format!("{} ({})", self.name, self.kind)
        } else {
            format!("{} ({}) ({})", self.name, self.sdk, self.kind)
        }
    }
}

/// Output of the selection policy, consumed exactly once by the run
/// orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunTarget {
    /// One explicitly resolved device
    Single(Device),

    /// All booted devices, physical first, inventory order preserved
    Many(Vec<Device>),

    /// Nothing booted and nothing requested: resolve and launch the
    /// default simulator profile
    FallbackSimulator,

    /// Nothing to dispatch; the reason is reported to the user and the
    /// invocation ends normally
    None { reason: String },
}

/// Build configuration resolved once per invocation and shared
/// read-only across every device of a `Many` target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Xcode build configuration (e.g. "Debug", "Release")
    pub configuration: String,

    /// Scheme to build
    pub scheme: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_device(udid: &str, name: &str, kind: DeviceKind) -> Device {
        Device::new(udid, name, kind).with_sdk("iOS 18.2")
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("ios".parse::<Platform>().unwrap(), Platform::Ios);
        assert_eq!("tvOS".parse::<Platform>().unwrap(), Platform::TvOs);
        assert_eq!("visionos".parse::<Platform>().unwrap(), Platform::VisionOs);
        assert_eq!("macos".parse::<Platform>().unwrap(), Platform::MacOs);
        assert!("windows".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_is_desktop() {
        assert!(Platform::MacOs.is_desktop());
        assert!(!Platform::Ios.is_desktop());
        assert!(!Platform::TvOs.is_desktop());
    }

    #[test]
    fn test_platform_supports_physical() {
        assert!(Platform::Ios.supports_physical());
        assert!(!Platform::TvOs.supports_physical());
        assert!(!Platform::VisionOs.supports_physical());
        assert!(!Platform::MacOs.supports_physical());
    }

    #[test]
    fn test_device_state_from_str() {
        assert_eq!(DeviceState::from("Booted"), DeviceState::Booted);
        assert_eq!(DeviceState::from("booted"), DeviceState::Booted);
        assert_eq!(DeviceState::from("Shutdown"), DeviceState::Shutdown);
        assert_eq!(DeviceState::from("Creating"), DeviceState::Unknown);
    }

    #[test]
    fn test_device_matches_name() {
        let device = sample_device("id1", "iPhone 16 Pro Max", DeviceKind::Physical);

        assert!(device.matches_name("iPhone"));
        assert!(device.matches_name("iphone 16"));
        assert!(device.matches_name("Pro Max"));
        assert!(!device.matches_name("Pixel"));
    }

    #[test]
    fn test_device_display_string() {
        let device = sample_device("id1", "iPhone 16", DeviceKind::Simulator);
        assert_eq!(device.display_string(), "iPhone 16 (iOS 18.2) (simulator)");

        let bare = Device::new("id2", "My iPhone", DeviceKind::Physical);
        assert_eq!(bare.display_string(), "My iPhone (device)");
    }

    #[test]
    fn test_device_is_booted() {
        let device = sample_device("id1", "iPhone 16", DeviceKind::Simulator);
        assert!(!device.is_booted());
        assert!(device.with_state(DeviceState::Booted).is_booted());
    }
}
