//! Log tail controller
//!
//! Narrow, independently invokable flow: merge the inventories
//! restricted to booted simulators, pick one, and stream its log
//! output until the log process exits or is killed.

use crate::prompt::prompt_select;
use xcrunner_core::prelude::*;
use xcrunner_core::types::{Device, Platform};
use xcrunner_xcode::{
    fetch_availability_feed, fetch_runtime_feed, merge_booted, spawn_foreground,
};

/// Entry point for `xcr log`
pub async fn tail(platform: Platform, interactive: bool) -> Result<()> {
    let availability = fetch_availability_feed().await?;
    let runtime = fetch_runtime_feed().await?;
    let booted = merge_booted(&availability, &runtime, platform);

    let Some(device) = pick_booted(&booted, interactive)? else {
        return Ok(());
    };

    println!("Streaming logs from {}", device.display_string());
    stream_logs(&device).await
}

/// Choose the device to stream from
///
/// Zero booted devices is a reported miss, not an error. With several
/// booted devices the non-interactive pick is the first in inventory
/// order, deliberately deterministic.
fn pick_booted(booted: &[Device], interactive: bool) -> Result<Option<Device>> {
    match booted {
        [] => {
            println!("No booted simulators to stream logs from");
            Ok(None)
        }
        [only] => Ok(Some(only.clone())),
        many if interactive => {
            let chosen = prompt_select(many, None)?;
            if chosen.is_none() {
                println!("Selection cancelled.");
            }
            Ok(chosen)
        }
        many => Ok(Some(many[0].clone())),
    }
}

/// Attach `log stream` for the simulator with inherited stdio
///
/// Blocks until the log process ends; a spawn failure propagates as a
/// fatal error.
async fn stream_logs(device: &Device) -> Result<()> {
    spawn_foreground(
        "xcrun",
        &[
            "simctl",
            "spawn",
            &device.udid,
            "log",
            "stream",
            "--style",
            "compact",
        ],
    )
    .await
}
