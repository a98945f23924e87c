//! CocoaPods dependency provisioning
//!
//! Runs `pod install` inside the platform directory, through bundler
//! when a Gemfile pins the CocoaPods version. Output is inherited so
//! the user sees pod resolution progress live.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use xcrunner_core::prelude::*;

/// Whether the platform directory requests pod provisioning at all
pub fn has_podfile(platform_dir: &Path) -> bool {
    platform_dir.join("Podfile").exists()
}

/// Whether an install is needed (no Pods/ checkout yet)
///
/// A full lockfile comparison belongs to CocoaPods itself; `pod
/// install` is a no-op when everything is in sync, so this only gates
/// the (slow) invocation when there is clearly nothing to do.
pub fn pods_out_of_date(platform_dir: &Path) -> bool {
    has_podfile(platform_dir) && !platform_dir.join("Pods").exists()
}

/// Run `pod install` in the platform directory
///
/// Uses `bundle exec` when a Gemfile is present in the source root so
/// the pinned CocoaPods version is honored.
pub async fn install_pods(source_dir: &Path, platform_dir: &Path) -> Result<()> {
    let use_bundler = source_dir.join("Gemfile").exists();

    let (program, args): (&str, Vec<&str>) = if use_bundler {
        ("bundle", vec!["exec", "pod", "install"])
    } else {
        ("pod", vec!["install"])
    };

    info!(
        "Installing pods in {} (bundler: {})",
        platform_dir.display(),
        use_bundler
    );

    let status = Command::new(program)
        .args(&args)
        .current_dir(platform_dir)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::provision(format!(
                    "'{}' not found on PATH; install CocoaPods first",
                    program
                ))
            } else {
                Error::provision(format!("Failed to run {}: {}", program, e))
            }
        })?;

    if !status.success() {
        return Err(Error::provision(format!(
            "pod install exited with code {:?}",
            status.code()
        )));
    }

    info!("Pod install completed");
    Ok(())
}
