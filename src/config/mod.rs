//! Configuration management module
//!
//! Handles loading, validation, and management of the tool's own settings.
//! The project's `unite.json` lives in [`crate::project`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Logging level
    pub log_level: String,

    /// File-based logging configuration
    pub log: LogConfig,

    /// Terminal channel configuration
    pub terminal: TerminalConfig,

    /// Project discovery configuration
    pub project: ProjectConfig,

    /// Option catalogs overriding the built-in ones
    #[serde(default)]
    pub catalogs: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Display name of the shared channel
    pub name: String,

    /// Shell program hosting the channel, `$SHELL` when unset
    pub shell: Option<String>,

    /// Clear the channel before each submitted command
    pub clear_before_submit: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Name of the project configuration file searched for upwards
    pub config_filename: String,

    /// Value passed as `--ides` when configuring a new project
    pub ides: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Absolute or relative path to the log file
    pub file_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log: LogConfig::default(),
            terminal: TerminalConfig::default(),
            project: ProjectConfig::default(),
            catalogs: BTreeMap::new(),
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            name: "Unite".to_string(),
            shell: None,
            clear_before_submit: true,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            config_filename: "unite.json".to_string(),
            ides: "vscode".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_path: "logs/unitectl.log".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from file with environment variable overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path.as_ref(), |key| env::var(key).ok())
    }

    fn load_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        settings.apply_overrides(lookup);

        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // UNITECTL_LOG_LEVEL - logging level
        if let Some(log_level) = lookup("UNITECTL_LOG_LEVEL") {
            self.log_level = log_level;
        }

        // UNITECTL_LOG_FILE_PATH - logging destination file
        if let Some(file_path) = lookup("UNITECTL_LOG_FILE_PATH") {
            if !file_path.trim().is_empty() {
                self.log.file_path = file_path;
            }
        }

        // UNITECTL_TERMINAL_NAME - channel display name
        if let Some(name) = lookup("UNITECTL_TERMINAL_NAME") {
            if !name.trim().is_empty() {
                self.terminal.name = name;
            }
        }

        // UNITECTL_SHELL - shell hosting the channel
        if let Some(shell) = lookup("UNITECTL_SHELL") {
            if !shell.trim().is_empty() {
                self.terminal.shell = Some(shell);
            }
        }

        // UNITECTL_CLEAR_BEFORE_SUBMIT - clear the channel before commands
        if let Some(clear) = lookup("UNITECTL_CLEAR_BEFORE_SUBMIT") {
            self.terminal.clear_before_submit =
                clear.parse().unwrap_or(self.terminal.clear_before_submit);
        }

        // UNITECTL_CONFIG_FILENAME - project configuration file name
        if let Some(filename) = lookup("UNITECTL_CONFIG_FILENAME") {
            if !filename.trim().is_empty() {
                self.project.config_filename = filename;
            }
        }
    }

    /// Save settings to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory: {}", parent.display())
                })?;
            }
        }

        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write settings file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Load settings with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_or_default_with(path.as_ref(), |key| env::var(key).ok())
    }

    /// Environment overrides apply on every fallback path.
    fn load_or_default_with<F>(path: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if path.exists() {
            match Self::load_with(path, &lookup) {
                Ok(settings) => return settings,
                Err(err) => tracing::warn!("Failed to load settings: {:#}, using defaults", err),
            }
        }

        let mut settings = Self::default();
        settings.apply_overrides(lookup);
        settings
    }

    /// Validate settings values
    pub fn validate(&self) -> Result<()> {
        if self.terminal.name.trim().is_empty() {
            anyhow::bail!("terminal.name must not be empty");
        }

        if self.project.config_filename.trim().is_empty() {
            anyhow::bail!("project.config_filename must not be empty");
        }

        if self.log.file_path.trim().is_empty() {
            anyhow::bail!("Log file path must not be empty");
        }

        if let Some(shell) = &self.terminal.shell {
            if shell.trim().is_empty() {
                anyhow::bail!("terminal.shell must not be empty when set");
            }
        }

        for (key, items) in &self.catalogs {
            if items.is_empty() {
                anyhow::bail!("Catalog '{}' must list at least one option", key);
            }
        }

        Ok(())
    }

    /// Display formatted settings
    pub fn display(&self) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        println!("Current settings:");
        println!("{}", content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.terminal.name, "Unite");
        assert_eq!(settings.project.config_filename, "unite.json");
        assert!(settings.terminal.clear_before_submit);
    }

    #[test]
    fn test_settings_serialization() {
        let mut settings = Settings::default();
        settings
            .catalogs
            .insert("bundler".to_string(), vec!["Webpack".to_string()]);
        let serialized = toml::to_string(&settings).unwrap();
        let deserialized: Settings = toml::from_str(&serialized).unwrap();
        assert_eq!(settings.terminal.name, deserialized.terminal.name);
        assert_eq!(deserialized.catalogs["bundler"], vec!["Webpack"]);
    }

    #[test]
    fn test_settings_file_operations() {
        let settings = Settings::default();
        let temp_file = NamedTempFile::new().unwrap();

        settings.save_to_file(temp_file.path()).unwrap();

        let loaded = Settings::load_from_file(temp_file.path()).unwrap();
        assert_eq!(settings.project.ides, loaded.project.ides);
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let content = r#"
log_level = "debug"

[log]
file_path = "unite.log"

[terminal]
name = "Build"

[project]
"#;
        let settings: Settings = toml::from_str(content).unwrap();
        assert_eq!(settings.terminal.name, "Build");
        assert!(settings.terminal.clear_before_submit);
        assert_eq!(settings.project.config_filename, "unite.json");
        assert!(settings.catalogs.is_empty());
    }

    fn lookup(key: &str) -> Option<String> {
        match key {
            "UNITECTL_TERMINAL_NAME" => Some("Overridden".to_string()),
            "UNITECTL_CLEAR_BEFORE_SUBMIT" => Some("false".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_unparsable_file_falls_back_with_overrides() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "log_level = [not toml").unwrap();

        let settings = Settings::load_or_default_with(temp_file.path(), lookup);
        assert_eq!(settings.terminal.name, "Overridden");
        assert!(!settings.terminal.clear_before_submit);
        assert_eq!(settings.project.config_filename, "unite.json");
    }

    #[test]
    fn test_missing_file_falls_back_with_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = Settings::load_or_default_with(&dir.path().join("absent.toml"), lookup);
        assert_eq!(settings.terminal.name, "Overridden");
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let mut settings = Settings::default();
        settings.catalogs.insert("linter".to_string(), Vec::new());
        assert!(settings.validate().is_err());
    }
}
