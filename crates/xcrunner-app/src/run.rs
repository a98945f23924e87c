//! Run orchestrator
//!
//! Drives the fixed per-invocation pipeline: platform validation,
//! conditional dependency provisioning, build-settings resolution,
//! then a sequential per-device dispatch. All state is threaded through
//! an explicit [`RunContext`]; nothing mutates process-wide state and
//! the working directory is never changed.

use crate::cache::DeviceCache;
use crate::flags::RunFlags;
use crate::prompt::prompt_select;
use crate::select::{select, Selection};
use std::path::{Path, PathBuf};
use xcrunner_core::prelude::*;
use xcrunner_core::types::{BuildSettings, Device, DeviceKind, Platform, RunTarget};
use xcrunner_xcode::build::{build_project, bundle_id_of_app, BuiltProduct};
use xcrunner_xcode::project::{find_xcode_project, XcodeProject};
use xcrunner_xcode::{
    fallback_simulator, fetch_availability_feed, fetch_runtime_feed, install_pods, merge,
    physical, pods_out_of_date, resolve_build_settings, simulator,
};

/// Everything one invocation needs, resolved up front
#[derive(Debug)]
pub struct RunContext {
    pub source_dir: PathBuf,
    pub platform_dir: PathBuf,
    pub platform: Platform,
    pub flags: RunFlags,
    pub project: XcodeProject,
}

/// Outcome of one device dispatch in a multi-device run
#[derive(Debug)]
pub struct DispatchOutcome {
    pub device: Device,
    pub result: Result<()>,
}

/// Entry point for `xcr run`
pub async fn run(source_dir: &Path, platform: Platform, flags: RunFlags) -> Result<()> {
    // Pure flag validation comes before anything with side effects,
    // pod install in particular.
    if flags.conflicting_selectors() {
        return Err(Error::ConflictingSelectors);
    }

    let mut ctx = prepare_context(source_dir, platform, flags)?;

    provision_dependencies(&mut ctx).await?;

    let prebuilt = resolve_prebuilt_binary(&ctx).await?;
    let settings = resolve_build_settings(
        &ctx.project,
        ctx.flags.scheme.as_deref(),
        ctx.flags.configuration.as_deref(),
    )?;

    // Desktop builds have no device dispatch and no log tail.
    if ctx.platform.is_desktop() {
        let destination = format!("platform={}", ctx.platform);
        build_project(&ctx.project, &settings, &destination).await?;
        println!("Build finished ({} {})", settings.scheme, settings.configuration);
        return Ok(());
    }

    let availability = fetch_availability_feed().await?;
    let runtime = fetch_runtime_feed().await?;
    let inventory = merge(&availability, &runtime, ctx.platform);

    match select(&inventory, &ctx.flags) {
        Selection::Conflict => Err(Error::ConflictingSelectors),
        Selection::Prompt => {
            dispatch_interactive(&ctx, &settings, prebuilt.as_ref(), &inventory).await
        }
        Selection::Target(target) => {
            dispatch_target(&ctx, &settings, prebuilt.as_ref(), &inventory, target).await
        }
    }
}

/// Validate the platform configuration and locate the project
///
/// Absence of either is fatal before any device-specific work.
fn prepare_context(source_dir: &Path, platform: Platform, flags: RunFlags) -> Result<RunContext> {
    let platform_dir = source_dir.join(platform.project_dir_name());
    if !platform_dir.is_dir() {
        return Err(Error::no_platform_config(platform.to_string(), platform_dir));
    }

    let project = find_xcode_project(&platform_dir)?
        .ok_or_else(|| Error::no_project(platform_dir.clone()))?;

    info!(
        "Resolved project {} for platform {}",
        project.path.display(),
        platform
    );

    Ok(RunContext {
        source_dir: source_dir.to_path_buf(),
        platform_dir,
        platform,
        flags,
        project,
    })
}

/// Conditionally provision pods, then re-resolve the project descriptor
///
/// Provisioning can generate a workspace next to the project, so the
/// descriptor is re-resolved afterwards. Re-resolution is best-effort:
/// on failure the previously known descriptor is kept.
async fn provision_dependencies(ctx: &mut RunContext) -> Result<()> {
    let needed = ctx.flags.force_pods || pods_out_of_date(&ctx.platform_dir);
    if !needed {
        debug!("Skipping pod install");
        return Ok(());
    }

    install_pods(&ctx.source_dir, &ctx.platform_dir).await?;

    match find_xcode_project(&ctx.platform_dir) {
        Ok(Some(project)) => ctx.project = project,
        Ok(None) | Err(_) => {
            warn!("Could not re-resolve the Xcode project after pod install; keeping the previous one");
        }
    }
    Ok(())
}

/// Validate `--binary-path`, bypassing the build when present
async fn resolve_prebuilt_binary(ctx: &RunContext) -> Result<Option<BuiltProduct>> {
    let Some(binary_path) = &ctx.flags.binary_path else {
        return Ok(None);
    };

    let app_path = binary_path
        .canonicalize()
        .map_err(|_| Error::BinaryNotFound {
            path: binary_path.clone(),
        })?;
    if !app_path.exists() {
        return Err(Error::BinaryNotFound { path: app_path });
    }

    let bundle_id = bundle_id_of_app(&app_path).await?;
    info!(
        "Using pre-built binary {} ({})",
        app_path.display(),
        bundle_id
    );
    Ok(Some(BuiltProduct {
        app_path,
        bundle_id,
    }))
}

/// List/interactive mode: prompt with the cached preference as
/// default, persist a changed choice, dispatch by the chosen kind
async fn dispatch_interactive(
    ctx: &RunContext,
    settings: &BuildSettings,
    prebuilt: Option<&BuiltProduct>,
    inventory: &[Device],
) -> Result<()> {
    if inventory.is_empty() {
        println!("No devices found for {}", ctx.platform);
        return Ok(());
    }

    let mut cache = DeviceCache::load();
    let project_name = ctx.project.name();

    let Some(chosen) = prompt_select(inventory, cache.get(&project_name))? else {
        println!("Selection cancelled.");
        return Ok(());
    };

    if let Err(e) = cache.set(&project_name, &chosen.udid) {
        // A broken cache should not stop the run.
        warn!("Could not persist device preference: {}", e);
    }

    dispatch_device(ctx, settings, prebuilt, &chosen).await
}

/// Dispatch a resolved run target
async fn dispatch_target(
    ctx: &RunContext,
    settings: &BuildSettings,
    prebuilt: Option<&BuiltProduct>,
    inventory: &[Device],
    target: RunTarget,
) -> Result<()> {
    match target {
        RunTarget::None { reason } => {
            // Resolution miss: user-facing message, normal exit.
            println!("{}", reason);
            Ok(())
        }
        RunTarget::Single(device) => dispatch_device(ctx, settings, prebuilt, &device).await,
        RunTarget::FallbackSimulator => match fallback_simulator(inventory) {
            Some(device) => {
                info!("Falling back to simulator {}", device.name);
                dispatch_device(ctx, settings, prebuilt, &device).await
            }
            None => {
                println!("No simulators available for {}", ctx.platform);
                Ok(())
            }
        },
        RunTarget::Many(devices) => {
            let mut outcomes = Vec::with_capacity(devices.len());
            for device in devices {
                // Best-effort fan-out: one failure does not stop the
                // remaining devices.
                let result = dispatch_device(ctx, settings, prebuilt, &device).await;
                if let Err(e) = &result {
                    error!("Dispatch to {} failed: {}", device.name, e);
                }
                outcomes.push(DispatchOutcome { device, result });
            }

            println!("{}", summarize(&outcomes));

            match outcomes.into_iter().find(|o| o.result.is_err()) {
                Some(failed) => failed.result,
                None => Ok(()),
            }
        }
    }
}

/// Run the build-install-launch sequence against one device
async fn dispatch_device(
    ctx: &RunContext,
    settings: &BuildSettings,
    prebuilt: Option<&BuiltProduct>,
    device: &Device,
) -> Result<()> {
    println!(
        "Running {} ({}) on {}",
        settings.scheme,
        settings.configuration,
        device.display_string()
    );

    let destination = format!("id={}", device.udid);
    let product = match prebuilt {
        Some(product) => product.clone(),
        None => build_project(&ctx.project, settings, &destination).await?,
    };

    match device.kind {
        DeviceKind::Simulator => {
            simulator::boot(device).await?;
            simulator::open_simulator_app().await?;
            simulator::install_app(device, &product.app_path).await?;
            simulator::launch_app(device, &product.bundle_id, &launch_env(&ctx.flags)).await
        }
        DeviceKind::Physical => {
            physical::install_app(device, &product.app_path).await?;
            physical::launch_app(device, &product.bundle_id).await
        }
    }
}

/// Environment forwarded to the launched app
fn launch_env(flags: &RunFlags) -> Vec<(String, String)> {
    if flags.packager {
        vec![("DEV_SERVER_PORT".to_string(), flags.port.to_string())]
    } else {
        Vec::new()
    }
}

/// Human-readable per-device outcome summary for a multi-device run
fn summarize(outcomes: &[DispatchOutcome]) -> String {
    let mut lines = vec!["Run summary:".to_string()];
    for outcome in outcomes {
        match &outcome.result {
            Ok(()) => lines.push(format!("  ok      {}", outcome.device.display_string())),
            Err(e) => lines.push(format!(
                "  failed  {}: {}",
                outcome.device.display_string(),
                e
            )),
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_device(udid: &str, name: &str, kind: DeviceKind) -> Device {
        Device::new(udid, name, kind).with_sdk("iOS 18.2")
    }

    #[test]
    fn test_prepare_context_missing_platform_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            prepare_context(dir.path(), Platform::Ios, RunFlags::default()).unwrap_err();
        assert!(matches!(err, Error::NoPlatformConfig { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_prepare_context_missing_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("ios")).unwrap();

        let err =
            prepare_context(dir.path(), Platform::Ios, RunFlags::default()).unwrap_err();
        assert!(matches!(err, Error::NoProject { .. }));
    }

    #[test]
    fn test_prepare_context_finds_project() {
        let dir = tempfile::tempdir().unwrap();
        let ios = dir.path().join("ios");
        std::fs::create_dir(&ios).unwrap();
        std::fs::create_dir(ios.join("Demo.xcodeproj")).unwrap();

        let ctx = prepare_context(dir.path(), Platform::Ios, RunFlags::default()).unwrap();
        assert_eq!(ctx.project.name(), "Demo");
        assert_eq!(ctx.platform_dir, ios);
    }

    #[tokio::test]
    async fn test_conflicting_selectors_rejected_before_any_work() {
        // The tempdir has no platform directory: if validation ran any
        // later, NoPlatformConfig would surface instead.
        let dir = tempfile::tempdir().unwrap();
        let flags = RunFlags {
            device: Some("My iPhone".to_string()),
            udid: Some("00008120-001E30EC0AF0C01E".to_string()),
            ..Default::default()
        };

        let err = run(dir.path(), Platform::Ios, flags.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConflictingSelectors));

        // The desktop branch skips device selection entirely, so the
        // conflict must be caught here too.
        let err = run(dir.path(), Platform::MacOs, flags).await.unwrap_err();
        assert!(matches!(err, Error::ConflictingSelectors));
    }

    #[tokio::test]
    async fn test_missing_binary_path_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ios = dir.path().join("ios");
        std::fs::create_dir(&ios).unwrap();
        std::fs::create_dir(ios.join("Demo.xcodeproj")).unwrap();

        let flags = RunFlags {
            binary_path: Some(dir.path().join("missing/Demo.app")),
            ..Default::default()
        };
        let ctx = prepare_context(dir.path(), Platform::Ios, flags).unwrap();

        let err = resolve_prebuilt_binary(&ctx).await.unwrap_err();
        assert!(matches!(err, Error::BinaryNotFound { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_launch_env() {
        let flags = RunFlags {
            packager: true,
            port: 8081,
            ..Default::default()
        };
        assert_eq!(
            launch_env(&flags),
            vec![("DEV_SERVER_PORT".to_string(), "8081".to_string())]
        );
        assert!(launch_env(&RunFlags::default()).is_empty());
    }

    #[test]
    fn test_summarize_reports_each_device() {
        let outcomes = vec![
            DispatchOutcome {
                device: sample_device("a", "My iPhone", DeviceKind::Physical),
                result: Ok(()),
            },
            DispatchOutcome {
                device: sample_device("b", "iPhone 16", DeviceKind::Simulator),
                result: Err(Error::launch("iPhone 16", "install failed")),
            },
        ];

        let summary = summarize(&outcomes);
        assert!(summary.contains("ok      My iPhone"));
        assert!(summary.contains("failed  iPhone 16"));
        assert!(summary.contains("install failed"));
    }
}
