//! Command handlers
//!
//! Every command runs an optional wizard, builds one argument vector and hands
//! it to the shared session. `unite` commands always reset the channel; gulp
//! tasks and package installs relocate to the project's `wwwRoot` and reuse it.

pub mod tasks;
pub mod unite;

use clap::Subcommand;
use tracing::{debug, info};

use crate::project::{Project, UniteConfiguration};
use crate::session::{SessionError, SessionManager};
use crate::wizard::{Answers, ArgumentVector, OptionProvider, Prompter, Wizard, WizardError};

/// Commands that build and dispatch a command line
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum UniteCommand {
    /// Show the installed unite version
    Version,
    /// Show unite help
    Help,
    /// Re-run configure for an existing project
    ConfigureUpdate,
    /// Configure a new project from a profile
    ConfigureProfile,
    /// Configure a new project choosing every option
    ConfigureOptions {
        /// Type the command without running it
        #[arg(long)]
        stage: bool,
    },
    /// Install packages with the configured package manager
    InstallPackages,
    /// Add a build configuration
    BuildConfigurationAdd,
    /// Remove a build configuration
    BuildConfigurationRemove,
    /// Generate a new item for the application framework
    Generate,
    /// Add a client package from a profile
    ClientPackageAddProfile,
    /// Add a client package by name
    ClientPackageAdd,
    /// Remove a client package
    ClientPackageRemove,
    /// Add a platform
    PlatformAdd,
    /// Remove a platform
    PlatformRemove,
    /// gulp build
    TaskBuild,
    /// gulp build for a chosen build configuration
    TaskBuildConfiguration,
    /// gulp build --watch
    TaskBuildWatch,
    /// gulp theme-build
    TaskThemeBuild,
    /// gulp unit
    TaskUnit,
    /// gulp unit for a single test
    TaskUnitSingle,
    /// gulp unit --watch
    TaskUnitWatch,
    /// gulp unit with options
    TaskUnitOptions,
    /// gulp e2e-install
    TaskE2eInstall,
    /// gulp e2e-install with chosen drivers
    TaskE2eInstallOptions,
    /// gulp e2e
    TaskE2e,
    /// gulp e2e for a single test
    TaskE2eSingle,
    /// gulp e2e with options
    TaskE2eOptions,
    /// gulp serve
    TaskServe,
    /// gulp serve with options
    TaskServeOptions,
    /// gulp platform-cordova-dev
    TaskPlatformCordovaDev,
    /// gulp platform-cordova-dev with options
    TaskPlatformCordovaDevOptions,
    /// gulp platform-cordova-theme
    TaskPlatformCordovaTheme,
    /// gulp platform-cordova-theme with options
    TaskPlatformCordovaThemeOptions,
    /// gulp platform-docker-package
    TaskPlatformDockerPackage,
    /// gulp platform-docker-package with options
    TaskPlatformDockerPackageOptions,
    /// gulp platform-electron-dev
    TaskPlatformElectronDev,
    /// gulp platform-electron-dev with options
    TaskPlatformElectronDevOptions,
    /// gulp platform-electron-package
    TaskPlatformElectronPackage,
    /// gulp platform-electron-package with options
    TaskPlatformElectronPackageOptions,
    /// gulp platform-web-package
    TaskPlatformWebPackage,
}

impl UniteCommand {
    /// Run the command against `ctx`.
    pub async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        info!("Running command: {:?}", self);

        match self {
            UniteCommand::Version => unite::version(ctx).await,
            UniteCommand::Help => unite::help(ctx).await,
            UniteCommand::ConfigureUpdate => unite::configure_update(ctx).await,
            UniteCommand::ConfigureProfile => unite::configure_profile(ctx).await,
            UniteCommand::ConfigureOptions { stage } => unite::configure_options(ctx, !stage).await,
            UniteCommand::BuildConfigurationAdd => unite::build_configuration_add(ctx).await,
            UniteCommand::BuildConfigurationRemove => unite::build_configuration_remove(ctx).await,
            UniteCommand::Generate => unite::generate(ctx).await,
            UniteCommand::ClientPackageAddProfile => unite::client_package_add_profile(ctx).await,
            UniteCommand::ClientPackageAdd => unite::client_package_add(ctx).await,
            UniteCommand::ClientPackageRemove => unite::client_package_remove(ctx).await,
            UniteCommand::PlatformAdd => unite::platform_add(ctx).await,
            UniteCommand::PlatformRemove => unite::platform_remove(ctx).await,
            UniteCommand::InstallPackages => tasks::install_packages(ctx).await,
            UniteCommand::TaskBuildConfiguration => tasks::build_configuration(ctx).await,
            task => tasks::run_task(task, ctx).await,
        }
    }

    /// Whether this command recreates the channel before dispatching.
    pub fn resets_channel(&self) -> bool {
        matches!(
            self,
            UniteCommand::Version
                | UniteCommand::Help
                | UniteCommand::ConfigureUpdate
                | UniteCommand::ConfigureProfile
                | UniteCommand::ConfigureOptions { .. }
                | UniteCommand::BuildConfigurationAdd
                | UniteCommand::BuildConfigurationRemove
                | UniteCommand::Generate
                | UniteCommand::ClientPackageAddProfile
                | UniteCommand::ClientPackageAdd
                | UniteCommand::ClientPackageRemove
                | UniteCommand::PlatformAdd
                | UniteCommand::PlatformRemove
        )
    }
}

/// Error types for command handlers
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(
        "Failed to load unite.json configuration file, make sure you have created a UniteJS installation using 'unite configure'"
    )]
    ConfigurationMissing,
    #[error("{0}")]
    PreconditionUnmet(String),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl CommandError {
    /// Notices are shown as a single line rather than as a failure.
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            CommandError::ConfigurationMissing | CommandError::PreconditionUnmet(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A command line reached the session
    Dispatched,
    /// The user dismissed a prompt; nothing was dispatched
    Cancelled,
}

/// Everything a handler may touch
pub struct CommandContext<'a> {
    pub session: &'a mut SessionManager,
    pub options: &'a dyn OptionProvider,
    pub prompter: &'a dyn Prompter,
    pub project: &'a Project,
    /// Value of `--ides` for new projects
    pub ides: &'a str,
}

impl CommandContext<'_> {
    pub fn require_configuration(&self) -> Result<UniteConfiguration, CommandError> {
        self.project
            .load_configuration()
            .ok_or(CommandError::ConfigurationMissing)
    }

    /// Run `wizard`; `None` when the user cancelled.
    pub async fn ask(
        &self,
        wizard: &Wizard,
        options: &dyn OptionProvider,
    ) -> Result<Option<Answers>, CommandError> {
        let outcome = wizard.run(options, self.prompter).await?;
        Ok(outcome.completed())
    }

    /// Dispatch on a fresh channel.
    pub async fn dispatch_reset(
        &mut self,
        args: ArgumentVector,
        execute: bool,
    ) -> Result<CommandOutcome, CommandError> {
        self.session.dispatch(args, true, execute).await?;
        Ok(CommandOutcome::Dispatched)
    }

    /// Dispatch a `unite` command targeting the project root on a fresh channel.
    pub async fn dispatch_unite(
        &mut self,
        mut args: ArgumentVector,
        execute: bool,
    ) -> Result<CommandOutcome, CommandError> {
        args.quoted_flag("outputDirectory", &self.project.root().to_string_lossy());
        self.dispatch_reset(args, execute).await
    }

    /// Move the live channel to the project's `wwwRoot` and run `args` there.
    pub async fn dispatch_in_www_root(
        &mut self,
        config: &UniteConfiguration,
        args: ArgumentVector,
    ) -> Result<CommandOutcome, CommandError> {
        let www_root = self.project.www_root(config);
        debug!("Relocating to {}", www_root.display());

        self.session.relocate(&www_root).await?;
        self.session.dispatch(args, false, true).await?;
        Ok(CommandOutcome::Dispatched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    #[command(no_binary_name = true, disable_help_subcommand = true)]
    struct Line {
        #[command(subcommand)]
        command: UniteCommand,
    }

    fn parse(line: &str) -> UniteCommand {
        Line::try_parse_from(line.split_whitespace()).unwrap().command
    }

    #[test]
    fn test_subcommand_names() {
        assert_eq!(parse("help"), UniteCommand::Help);
        assert_eq!(parse("configure-options --stage"), UniteCommand::ConfigureOptions { stage: true });
        assert_eq!(parse("task-e2e-options"), UniteCommand::TaskE2eOptions);
        assert_eq!(
            parse("task-platform-electron-package-options"),
            UniteCommand::TaskPlatformElectronPackageOptions
        );
    }

    #[test]
    fn test_reset_policy_by_family() {
        assert!(UniteCommand::Version.resets_channel());
        assert!(UniteCommand::ConfigureOptions { stage: false }.resets_channel());
        assert!(UniteCommand::PlatformRemove.resets_channel());
        assert!(!UniteCommand::InstallPackages.resets_channel());
        assert!(!UniteCommand::TaskServe.resets_channel());
        assert!(!UniteCommand::TaskPlatformWebPackage.resets_channel());
    }

    #[test]
    fn test_notice_classification() {
        assert!(CommandError::ConfigurationMissing.is_notice());
        assert!(CommandError::PreconditionUnmet("x".to_string()).is_notice());
        assert!(!CommandError::Wizard(WizardError::Prompt("tty".to_string())).is_notice());
    }
}
