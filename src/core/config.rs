// ─── Launcher Configuration ───
// Read-only view of the launcher settings this glue layer depends on.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{DistroError, DistroResult};

const APP_DIR_NAME: &str = "LauncherDistro";
const CONFIG_FILE: &str = "launcher_config.json";

/// Narrow read-only accessor over the launcher's persistent configuration.
///
/// The distribution and repair facades only ever read these five values;
/// everything else in the config store stays out of this crate.
pub trait ConfigProvider: Send + Sync {
    fn launcher_directory(&self) -> PathBuf;
    fn common_directory(&self) -> PathBuf;
    fn instance_directory(&self) -> PathBuf;
    fn distribution_branch(&self) -> String;
    fn ignored_validation_files(&self) -> Vec<String>;
}

/// File-backed launcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    pub launcher_directory: PathBuf,
    pub common_directory: PathBuf,
    pub instance_directory: PathBuf,
    #[serde(default = "default_branch")]
    pub distribution_branch: String,
    #[serde(default)]
    pub ignored_validation_files: Vec<String>,
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for LauncherConfig {
    fn default() -> Self {
        let launcher_directory = default_launcher_dir();
        let common_directory = launcher_directory.join("common");
        let instance_directory = launcher_directory.join("instances");
        Self {
            launcher_directory,
            common_directory,
            instance_directory,
            distribution_branch: default_branch(),
            ignored_validation_files: Vec::new(),
        }
    }
}

impl LauncherConfig {
    /// Load the config from `<launcher dir>/launcher_config.json`, falling
    /// back to defaults when the file is missing or unreadable.
    pub fn load_or_default(launcher_dir: &Path) -> Self {
        let path = launcher_dir.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Corrupt config at {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist the config as pretty JSON under the launcher directory.
    pub fn save(&self) -> DistroResult<()> {
        let path = self.launcher_directory.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::create_dir_all(&self.launcher_directory).map_err(|source| DistroError::Io {
            path: self.launcher_directory.clone(),
            source,
        })?;
        std::fs::write(&path, json).map_err(|source| DistroError::Io { path, source })
    }
}

impl ConfigProvider for LauncherConfig {
    fn launcher_directory(&self) -> PathBuf {
        self.launcher_directory.clone()
    }

    fn common_directory(&self) -> PathBuf {
        self.common_directory.clone()
    }

    fn instance_directory(&self) -> PathBuf {
        self.instance_directory.clone()
    }

    fn distribution_branch(&self) -> String {
        self.distribution_branch.clone()
    }

    fn ignored_validation_files(&self) -> Vec<String> {
        self.ignored_validation_files.clone()
    }
}

fn default_launcher_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
