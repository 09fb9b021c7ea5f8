//! Command Line Interface module
//!
//! Implements the CLI commands and argument parsing for unitectl.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::UniteCommand;

#[derive(Parser, Debug, Clone)]
#[command(name = "unitectl")]
#[command(about = "UniteJS command builder")]
#[command(
    long_about = "Builds unite, gulp and package manager command lines through guided prompts and runs them in a shared terminal"
)]
#[command(version, disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Settings file path
    #[arg(long, default_value = "unitectl.toml")]
    pub settings_file: String,

    /// Log level (trace, debug, info, warn, error), overrides the settings file
    #[arg(long)]
    pub log_level: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Folder to start looking for unite.json from, defaults to the current directory
    #[arg(long)]
    pub project_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(flatten)]
    Unite(UniteCommand),

    /// Settings management
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    /// Show current settings
    Show,

    /// Write the default settings file
    Init,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if we're running in interactive mode
    pub fn is_interactive_mode(&self) -> bool {
        self.command.is_none()
    }

    /// Log level from flags, falling back to `configured`
    pub fn effective_log_level(&self, configured: &str) -> String {
        if self.verbose {
            "debug".to_string()
        } else {
            self.log_level
                .clone()
                .unwrap_or_else(|| configured.to_string())
        }
    }
}
