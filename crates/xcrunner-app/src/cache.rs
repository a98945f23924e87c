//! Last-used device preference cache
//!
//! A single TOML table under the user cache directory, keyed by project
//! name, holding the udid of the last interactively chosen device. Read
//! before every interactive selection to pre-highlight a default;
//! written only when the new choice differs from the cached value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use xcrunner_core::prelude::*;

const CACHE_FILENAME: &str = "devices.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    last_used: BTreeMap<String, String>,
}

/// On-disk preference cache
#[derive(Debug)]
pub struct DeviceCache {
    path: PathBuf,
    data: CacheFile,
}

impl DeviceCache {
    /// Load the cache from the user cache directory; a missing or
    /// unreadable file is an empty cache, never an error
    pub fn load() -> Self {
        let path = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("xcrunner")
            .join(CACHE_FILENAME);
        Self::load_from(path)
    }

    fn load_from(path: PathBuf) -> Self {
        let data = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, data }
    }

    /// Last-used udid for a project
    pub fn get(&self, project: &str) -> Option<&str> {
        self.data.last_used.get(project).map(|s| s.as_str())
    }

    /// Persist a new choice; returns whether a write happened
    ///
    /// Re-confirming the already cached value writes nothing.
    pub fn set(&mut self, project: &str, udid: &str) -> Result<bool> {
        if self.get(project) == Some(udid) {
            debug!("Device preference for '{}' unchanged, not writing", project);
            return Ok(false);
        }

        self.data
            .last_used
            .insert(project.to_string(), udid.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::config(format!("Failed to create cache directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(&self.data)
            .map_err(|e| Error::config(format!("Failed to serialize device cache: {}", e)))?;
        std::fs::write(&self.path, content)
            .map_err(|e| Error::config(format!("Failed to write device cache: {}", e)))?;

        info!("Cached device '{}' for project '{}'", udid, project);
        Ok(true)
    }

    #[cfg(test)]
    fn at(path: PathBuf) -> Self {
        Self::load_from(path)
    }
}
