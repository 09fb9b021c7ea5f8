//! Project location and `unite.json` access

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The subset of `unite.json` the command handlers read
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UniteConfiguration {
    pub package_name: Option<String>,
    pub title: Option<String>,
    pub application_framework: String,
    pub package_manager: String,
    pub unit_test_runner: String,
    pub e2e_test_runner: String,
    pub dirs: UniteDirectories,
    pub build_configurations: BTreeMap<String, serde_json::Value>,
    pub client_packages: BTreeMap<String, serde_json::Value>,
    pub platforms: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UniteDirectories {
    pub www_root: String,
}

impl UniteConfiguration {
    pub fn has_unit_test_runner(&self) -> bool {
        is_configured(&self.unit_test_runner)
    }

    pub fn has_e2e_test_runner(&self) -> bool {
        is_configured(&self.e2e_test_runner)
    }

    pub fn has_platform(&self, platform: &str) -> bool {
        self.platforms.contains_key(platform)
    }

    pub fn build_configuration_names(&self) -> Vec<String> {
        self.build_configurations.keys().cloned().collect()
    }

    pub fn client_package_names(&self) -> Vec<String> {
        self.client_packages.keys().cloned().collect()
    }

    pub fn platform_names(&self) -> Vec<String> {
        self.platforms.keys().cloned().collect()
    }
}

fn is_configured(value: &str) -> bool {
    !value.is_empty() && value != "None"
}

/// A project root and the name of its configuration file
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config_filename: String,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config_filename: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            config_filename: config_filename.into(),
        }
    }

    /// Locate the project containing `start`.
    pub fn discover(start: &Path, config_filename: &str) -> Self {
        Self::new(resolve_project_root(start, config_filename), config_filename)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(&self.config_filename)
    }

    /// Read `unite.json`; `None` when it is missing or unreadable.
    pub fn load_configuration(&self) -> Option<UniteConfiguration> {
        let path = self.config_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No project configuration at {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Folder holding the project's `package.json`.
    pub fn www_root(&self, config: &UniteConfiguration) -> PathBuf {
        let www_root = config.dirs.www_root.trim();
        if www_root.is_empty() {
            self.root.clone()
        } else {
            self.root.join(www_root)
        }
    }
}

/// Walk up from `start` to the first folder containing `config_filename`.
///
/// Falls back to `start` itself so a new project can be created there.
pub fn resolve_project_root(start: &Path, config_filename: &str) -> PathBuf {
    let initial = absolute(start);

    for dir in initial.ancestors() {
        if dir.join(config_filename).is_file() {
            debug!("Found {} in {}", config_filename, dir.display());
            return dir.to_path_buf();
        }
    }

    debug!(
        "No {} found above {}, using it as the project root",
        config_filename,
        initial.display()
    );
    initial
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
