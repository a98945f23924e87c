//! Physical-device launch collaborator
//!
//! Install and launch on connected hardware via `xcrun devicectl`
//! (Xcode 15+). Hardware is enumerated but never started or stopped
//! here.

use std::path::Path;
use tokio::process::Command;
use xcrunner_core::prelude::*;
use xcrunner_core::types::Device;

/// Install an app bundle onto a connected device
pub async fn install_app(device: &Device, app_path: &Path) -> Result<()> {
    info!("Installing {} on {}", app_path.display(), device.name);

    let output = Command::new("xcrun")
        .args(["devicectl", "device", "install", "app", "--device", &device.udid])
        .arg(app_path)
        .output()
        .await
        .map_err(|e| Error::tool("xcrun devicectl", e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::launch(
            &device.name,
            format!("devicectl install failed: {}", stderr.trim()),
        ));
    }
    Ok(())
}

/// Launch an installed app on a connected device
pub async fn launch_app(device: &Device, bundle_id: &str) -> Result<()> {
    info!("Launching {} on {}", bundle_id, device.name);

    let output = Command::new("xcrun")
        .args([
            "devicectl",
            "device",
            "process",
            "launch",
            "--device",
            &device.udid,
            bundle_id,
        ])
        .output()
        .await
        .map_err(|e| Error::tool("xcrun devicectl", e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::launch(
            &device.name,
            format!("devicectl launch failed: {}", stderr.trim()),
        ));
    }
    Ok(())
}
