//! Xcode project discovery
//!
//! Locates the `.xcworkspace` or `.xcodeproj` bundle inside a platform
//! directory. Workspaces are preferred: a CocoaPods install generates
//! one next to the project, and building the bare project would miss
//! the pod targets.

use std::path::{Path, PathBuf};
use xcrunner_core::prelude::*;

/// A located Xcode build descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XcodeProject {
    /// Path to the `.xcworkspace` or `.xcodeproj` bundle
    pub path: PathBuf,

    /// True for a workspace, false for a bare project
    pub is_workspace: bool,
}

impl XcodeProject {
    /// Project name without the bundle extension, used as the default
    /// scheme
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The xcodebuild selector flag for this descriptor
    pub fn build_flag(&self) -> &'static str {
        if self.is_workspace {
            "-workspace"
        } else {
            "-project"
        }
    }
}

/// Find the Xcode project or workspace in a directory
///
/// Returns `None` when the directory holds neither; re-resolution after
/// pod install treats that as best-effort (the caller keeps its
/// previously known descriptor).
pub fn find_xcode_project(dir: &Path) -> Result<Option<XcodeProject>> {
    let mut workspace: Option<PathBuf> = None;
    let mut project: Option<PathBuf> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        match path.extension().and_then(|e| e.to_str()) {
            Some("xcworkspace") => {
                // Deterministic pick when several are present
                if workspace.as_ref().is_none_or(|w| path < *w) {
                    workspace = Some(path);
                }
            }
            Some("xcodeproj") => {
                if project.as_ref().is_none_or(|p| path < *p) {
                    project = Some(path);
                }
            }
            _ => {}
        }
    }

    if let Some(path) = workspace {
        debug!("Found Xcode workspace: {}", path.display());
        return Ok(Some(XcodeProject {
            path,
            is_workspace: true,
        }));
    }
    if let Some(path) = project {
        debug!("Found Xcode project: {}", path.display());
        return Ok(Some(XcodeProject {
            path,
            is_workspace: false,
        }));
    }

    Ok(None)
}
