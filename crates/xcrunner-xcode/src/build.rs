//! xcodebuild invocation and build-settings resolution

use crate::project::XcodeProject;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;
use xcrunner_core::prelude::*;
use xcrunner_core::types::BuildSettings;

/// Static regex for one `-showBuildSettings` line: "    KEY = VALUE"
static SETTING_LINE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^\s*(?P<key>[A-Z_][A-Z0-9_]*)\s=\s(?P<value>.*)$")
        .expect("Invalid setting line regex")
});

/// The product of a successful build (or a user-supplied binary)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltProduct {
    /// Path to the built `.app` bundle
    pub app_path: PathBuf,

    /// CFBundleIdentifier, needed to launch the app after install
    pub bundle_id: String,
}

/// Resolve the build configuration once per invocation
///
/// The scheme defaults to the project name; the configuration defaults
/// to "Debug". The result is shared read-only across every device of a
/// multi-device dispatch.
pub fn resolve_build_settings(
    project: &XcodeProject,
    scheme: Option<&str>,
    configuration: Option<&str>,
) -> Result<BuildSettings> {
    let scheme = match scheme {
        Some(s) => s.to_string(),
        None => {
            let name = project.name();
            if name.is_empty() {
                return Err(Error::config(format!(
                    "Cannot derive a scheme from {}; pass --scheme",
                    project.path.display()
                )));
            }
            name
        }
    };

    let configuration = configuration.unwrap_or("Debug").to_string();

    debug!(
        "Resolved build settings: scheme={}, configuration={}",
        scheme, configuration
    );

    Ok(BuildSettings {
        configuration,
        scheme,
    })
}

/// Build the app for a destination and locate the built product
///
/// xcodebuild output is inherited so build progress is visible; the
/// product location is then read back via `-showBuildSettings`.
pub async fn build_project(
    project: &XcodeProject,
    settings: &BuildSettings,
    destination: &str,
) -> Result<BuiltProduct> {
    let project_path = project.path.to_string_lossy().into_owned();
    let args = [
        project.build_flag(),
        project_path.as_str(),
        "-scheme",
        &settings.scheme,
        "-configuration",
        &settings.configuration,
        "-destination",
        destination,
        "build",
    ];

    info!("xcodebuild {}", args.join(" "));

    let status = Command::new("xcodebuild")
        .args(args)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|e| Error::tool("xcodebuild", e.to_string()))?;

    if !status.success() {
        return Err(Error::build(format!(
            "xcodebuild exited with code {:?} (scheme '{}', configuration '{}')",
            status.code(),
            settings.scheme,
            settings.configuration
        )));
    }

    locate_built_product(project, settings, destination).await
}

/// Query xcodebuild for the built product path and bundle identifier
async fn locate_built_product(
    project: &XcodeProject,
    settings: &BuildSettings,
    destination: &str,
) -> Result<BuiltProduct> {
    let project_path = project.path.to_string_lossy().into_owned();
    let output = Command::new("xcodebuild")
        .args([
            project.build_flag(),
            project_path.as_str(),
            "-scheme",
            &settings.scheme,
            "-configuration",
            &settings.configuration,
            "-destination",
            destination,
            "-showBuildSettings",
        ])
        .output()
        .await
        .map_err(|e| Error::tool("xcodebuild", e.to_string()))?;

    if !output.status.success() {
        return Err(Error::build(format!(
            "-showBuildSettings exited with code {:?}",
            output.status.code()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_build_settings_output(&stdout)
}

fn parse_build_settings_output(output: &str) -> Result<BuiltProduct> {
    let mut build_dir = None;
    let mut product_name = None;
    let mut bundle_id = None;

    for line in output.lines() {
        let Some(caps) = SETTING_LINE.captures(line) else {
            continue;
        };
        match &caps["key"] {
            "TARGET_BUILD_DIR" => build_dir = Some(caps["value"].to_string()),
            "FULL_PRODUCT_NAME" => product_name = Some(caps["value"].to_string()),
            "PRODUCT_BUNDLE_IDENTIFIER" => bundle_id = Some(caps["value"].to_string()),
            _ => {}
        }
    }

    match (build_dir, product_name, bundle_id) {
        (Some(dir), Some(name), Some(bundle_id)) => Ok(BuiltProduct {
            app_path: PathBuf::from(dir).join(name),
            bundle_id,
        }),
        _ => Err(Error::build(
            "Could not read TARGET_BUILD_DIR / FULL_PRODUCT_NAME / PRODUCT_BUNDLE_IDENTIFIER \
             from -showBuildSettings output",
        )),
    }
}

/// Read the bundle identifier of an already-built `.app` bundle
///
/// Used for `--binary-path` runs, which skip the build (and therefore
/// `-showBuildSettings`) entirely.
pub async fn bundle_id_of_app(app_path: &Path) -> Result<String> {
    let plist = app_path.join("Info.plist");
    let output = Command::new("/usr/libexec/PlistBuddy")
        .args(["-c", "Print :CFBundleIdentifier"])
        .arg(&plist)
        .output()
        .await
        .map_err(|e| Error::tool("PlistBuddy", e.to_string()))?;

    if !output.status.success() {
        return Err(Error::build(format!(
            "Could not read CFBundleIdentifier from {}",
            plist.display()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
