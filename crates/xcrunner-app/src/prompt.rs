//! Interactive device picker
//!
//! A dialoguer select over the merged inventory, with the cached
//! last-used device pre-highlighted as the default.

use console::style;
use dialoguer::{theme::ColorfulTheme, Select};
use xcrunner_core::prelude::*;
use xcrunner_core::types::Device;

/// Prompt the user to pick one device
///
/// `default_udid` pre-highlights the cached preference when it is still
/// in the inventory. Returns `Ok(None)` when the user cancels.
pub fn prompt_select(devices: &[Device], default_udid: Option<&str>) -> Result<Option<Device>> {
    let items: Vec<String> = devices
        .iter()
        .map(|d| {
            if d.is_booted() {
                format!("{} {}", d.display_string(), style("[booted]").green())
            } else {
                d.display_string()
            }
        })
        .collect();

    let default_index = default_udid
        .and_then(|udid| devices.iter().position(|d| d.udid == udid))
        .unwrap_or(0);

    let chosen = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a device")
        .items(&items)
        .default(default_index)
        .interact_opt()
        .map_err(|e| Error::config(format!("Prompt failed: {}", e)))?;

    Ok(chosen.map(|index| devices[index].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xcrunner_core::types::DeviceKind;

    // The prompt itself needs a TTY; only the default-index resolution
    // is testable headlessly.
    #[test]
    fn test_default_index_resolution() {
        let devices = vec![
            Device::new("a", "iPhone 15", DeviceKind::Simulator),
            Device::new("b", "iPhone 16", DeviceKind::Simulator),
        ];

        let position = |udid: Option<&str>| {
            udid.and_then(|u| devices.iter().position(|d| d.udid == u))
                .unwrap_or(0)
        };

        assert_eq!(position(Some("b")), 1);
        assert_eq!(position(Some("missing")), 0);
        assert_eq!(position(None), 0);
    }
}
