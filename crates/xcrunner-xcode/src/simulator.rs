//! Simulator launch collaborator
//!
//! Boot, install and launch on an iOS simulator via `xcrun simctl`.

use std::path::Path;
use tokio::process::Command;
use xcrunner_core::prelude::*;
use xcrunner_core::types::Device;

/// Boot a simulator by udid
///
/// "Unable to boot device in current state: Booted" is not an error;
/// booting an already-booted simulator is a no-op.
pub async fn boot(device: &Device) -> Result<()> {
    let output = Command::new("xcrun")
        .args(["simctl", "boot", &device.udid])
        .output()
        .await
        .map_err(|e| Error::tool("xcrun simctl", e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.contains("Booted") {
            return Err(Error::launch(
                &device.name,
                format!("simctl boot failed: {}", stderr.trim()),
            ));
        }
    }

    debug!("Simulator {} booted", device.udid);
    Ok(())
}

/// Bring the Simulator.app window to the foreground so the user sees
/// the launch
pub async fn open_simulator_app() -> Result<()> {
    let status = Command::new("open")
        .args(["-a", "Simulator"])
        .status()
        .await
        .map_err(|e| Error::tool("open", e.to_string()))?;

    if !status.success() {
        warn!("Could not open Simulator.app (exit {:?})", status.code());
    }
    Ok(())
}

/// Install an app bundle onto a booted simulator
pub async fn install_app(device: &Device, app_path: &Path) -> Result<()> {
    info!("Installing {} on {}", app_path.display(), device.name);

    let output = Command::new("xcrun")
        .args(["simctl", "install", &device.udid])
        .arg(app_path)
        .output()
        .await
        .map_err(|e| Error::tool("xcrun simctl", e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::launch(
            &device.name,
            format!("simctl install failed: {}", stderr.trim()),
        ));
    }
    Ok(())
}

/// Launch an installed app on a booted simulator
///
/// `env` entries are forwarded to the app process via simctl's
/// `SIMCTL_CHILD_` prefix convention.
pub async fn launch_app(device: &Device, bundle_id: &str, env: &[(String, String)]) -> Result<()> {
    info!("Launching {} on {}", bundle_id, device.name);

    let mut command = Command::new("xcrun");
    command.args(["simctl", "launch", &device.udid, bundle_id]);
    for (key, value) in env {
        command.env(format!("SIMCTL_CHILD_{}", key), value);
    }

    let output = command
        .output()
        .await
        .map_err(|e| Error::tool("xcrun simctl", e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::launch(
            &device.name,
            format!("simctl launch failed: {}", stderr.trim()),
        ));
    }
    Ok(())
}
