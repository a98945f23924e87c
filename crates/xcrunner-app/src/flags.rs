//! Run flags
//!
//! A single immutable configuration value constructed once at the CLI
//! boundary and passed by reference into every stage. Stage-specific
//! fields are validated where they are consumed, never assumed
//! present.

use std::path::PathBuf;

/// Flags controlling device selection and the run pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFlags {
    /// Free-text physical device name (substring match)
    pub device: Option<String>,

    /// Exact device identifier
    pub udid: Option<String>,

    /// Simulator name
    pub simulator: Option<String>,

    /// Present the inventory and let the user pick
    pub list_devices: bool,

    /// Same flow as `list_devices`
    pub interactive: bool,

    /// Pre-built .app bundle; skips the build when set
    pub binary_path: Option<PathBuf>,

    /// Scheme override (defaults to the project name)
    pub scheme: Option<String>,

    /// Build configuration override (defaults to "Debug")
    pub configuration: Option<String>,

    /// Force dependency provisioning even when Pods/ looks current
    pub force_pods: bool,

    /// Forward the dev-server port to the launched app
    pub packager: bool,

    /// Dev-server port forwarded when `packager` is set
    pub port: u16,
}

impl RunFlags {
    /// Whether any explicit device-selecting flag is present
    pub fn has_selector(&self) -> bool {
        self.device.is_some() || self.udid.is_some() || self.simulator.is_some()
    }

    /// `--device` and `--udid` are mutually exclusive
    pub fn conflicting_selectors(&self) -> bool {
        self.device.is_some() && self.udid.is_some()
    }

    /// Whether the user asked for the interactive picker
    pub fn wants_prompt(&self) -> bool {
        self.list_devices || self.interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_selector() {
        assert!(!RunFlags::default().has_selector());

        let flags = RunFlags {
            udid: Some("ABC".to_string()),
            ..Default::default()
        };
        assert!(flags.has_selector());
    }

    #[test]
    fn test_conflicting_selectors() {
        assert!(!RunFlags::default().conflicting_selectors());

        let flags = RunFlags {
            device: Some("My iPhone".to_string()),
            udid: Some("ABC".to_string()),
            ..Default::default()
        };
        assert!(flags.conflicting_selectors());
    }

    #[test]
    fn test_wants_prompt() {
        assert!(!RunFlags::default().wants_prompt());
        assert!(RunFlags {
            list_devices: true,
            ..Default::default()
        }
        .wants_prompt());
        assert!(RunFlags {
            interactive: true,
            ..Default::default()
        }
        .wants_prompt());
    }
}
