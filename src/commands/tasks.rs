//! Gulp tasks and package installation
//!
//! These run inside the project's `wwwRoot` on the existing channel. The
//! project requirements are checked before any prompt; the relocation is only
//! issued once the wizard completed, so a cancelled task dispatches nothing.

use tracing::debug;

use super::{CommandContext, CommandError, CommandOutcome, UniteCommand};
use crate::catalog::{BOOLEAN, LayeredOptions, NONE_OPTION, REVERSE_BOOLEAN};
use crate::project::UniteConfiguration;
use crate::wizard::{ArgumentVector, Step, Wizard, build};

const BUILD_CONFIGURATIONS: &str = "buildConfigurations";

/// What the project must provide before a task can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Only a loaded `unite.json`
    Configuration,
    UnitTestRunner,
    E2eTestRunner,
    Platform(&'static str),
}

impl Requirement {
    pub fn check(&self, config: &UniteConfiguration) -> Result<(), CommandError> {
        let unmet = match self {
            Requirement::Configuration => None,
            Requirement::UnitTestRunner if !config.has_unit_test_runner() => {
                Some("Your UniteJS configuration does not specify a unit test runner".to_string())
            }
            Requirement::E2eTestRunner if !config.has_e2e_test_runner() => {
                Some("Your UniteJS configuration does not specify an e2e test runner".to_string())
            }
            Requirement::Platform(platform) if !config.has_platform(platform) => Some(format!(
                "You need to add {} as a platform before you can run this task.",
                platform
            )),
            _ => None,
        };

        match unmet {
            Some(notice) => Err(CommandError::PreconditionUnmet(notice)),
            None => Ok(()),
        }
    }
}

/// A gulp invocation with its optional wizard
pub struct GulpTask {
    pub base: &'static [&'static str],
    pub requirement: Requirement,
    steps: fn(&UniteConfiguration) -> Vec<Step>,
}

impl GulpTask {
    fn plain(base: &'static [&'static str], requirement: Requirement) -> Self {
        Self {
            base,
            requirement,
            steps: |_| Vec::new(),
        }
    }

    fn with_steps(
        base: &'static [&'static str],
        requirement: Requirement,
        steps: fn(&UniteConfiguration) -> Vec<Step>,
    ) -> Self {
        Self {
            base,
            requirement,
            steps,
        }
    }

    pub fn steps(&self, config: &UniteConfiguration) -> Vec<Step> {
        (self.steps)(config)
    }
}

/// Table of the gulp tasks that need no special handling.
pub fn gulp_task(command: &UniteCommand) -> Option<GulpTask> {
    use Requirement::*;

    let task = match command {
        UniteCommand::TaskBuild => GulpTask::plain(&["gulp", "build"], Configuration),
        UniteCommand::TaskBuildWatch => GulpTask::plain(&["gulp", "build", "--watch"], Configuration),
        UniteCommand::TaskThemeBuild => GulpTask::plain(&["gulp", "theme-build"], Configuration),
        UniteCommand::TaskUnit => GulpTask::plain(&["gulp", "unit"], UnitTestRunner),
        UniteCommand::TaskUnitSingle => {
            GulpTask::with_steps(&["gulp", "unit"], UnitTestRunner, |_| vec![grep("Which test to run ?")])
        }
        UniteCommand::TaskUnitWatch => GulpTask::plain(&["gulp", "unit", "--watch"], UnitTestRunner),
        UniteCommand::TaskUnitOptions => {
            GulpTask::with_steps(&["gulp", "unit"], UnitTestRunner, unit_options_steps)
        }
        UniteCommand::TaskE2eInstall => GulpTask::plain(&["gulp", "e2e-install"], E2eTestRunner),
        UniteCommand::TaskE2eInstallOptions => {
            GulpTask::with_steps(&["gulp", "e2e-install"], E2eTestRunner, |_| {
                vec![Step::text(
                    "drivers",
                    "Which drivers to install comma separated (chrome/edge/firefox/ie) ?",
                )]
            })
        }
        UniteCommand::TaskE2e => GulpTask::plain(&["gulp", "e2e"], E2eTestRunner),
        UniteCommand::TaskE2eSingle => {
            GulpTask::with_steps(&["gulp", "e2e"], E2eTestRunner, |_| vec![grep("Which test to run ?")])
        }
        UniteCommand::TaskE2eOptions => GulpTask::with_steps(&["gulp", "e2e"], E2eTestRunner, |_| {
            vec![
                grep("Which test to run ?"),
                secure(),
                port(),
                Step::choice("browser", "Which browser to launch (leave blank for chrome headless) ?")
                    .catalog("e2eBrowser"),
            ]
        }),
        UniteCommand::TaskServe => GulpTask::plain(&["gulp", "serve"], Configuration),
        UniteCommand::TaskServeOptions => {
            GulpTask::with_steps(&["gulp", "serve"], Configuration, |_| vec![secure(), port()])
        }
        UniteCommand::TaskPlatformCordovaDev => {
            GulpTask::plain(&["gulp", "platform-cordova-dev"], Platform("Cordova"))
        }
        UniteCommand::TaskPlatformCordovaDevOptions => {
            GulpTask::with_steps(&["gulp", "platform-cordova-dev"], Platform("Cordova"), |_| {
                vec![cordova_platforms(), save()]
            })
        }
        UniteCommand::TaskPlatformCordovaTheme => {
            GulpTask::plain(&["gulp", "platform-cordova-theme"], Platform("Cordova"))
        }
        UniteCommand::TaskPlatformCordovaThemeOptions => {
            GulpTask::with_steps(&["gulp", "platform-cordova-theme"], Platform("Cordova"), |_| {
                vec![cordova_platforms()]
            })
        }
        UniteCommand::TaskPlatformDockerPackage => {
            GulpTask::plain(&["gulp", "platform-docker-package"], Platform("Docker"))
        }
        UniteCommand::TaskPlatformDockerPackageOptions => {
            GulpTask::with_steps(&["gulp", "platform-docker-package"], Platform("Docker"), |_| {
                vec![
                    Step::text("image", "Image (leave blank for default) ?"),
                    Step::text("www", "www folder location in image (leave blank for default) ?"),
                    save(),
                ]
            })
        }
        UniteCommand::TaskPlatformElectronDev => {
            GulpTask::plain(&["gulp", "platform-electron-dev"], Platform("Electron"))
        }
        UniteCommand::TaskPlatformElectronDevOptions => GulpTask::with_steps(
            &["gulp", "platform-electron-dev"],
            Platform("Electron"),
            |_| electron_steps(),
        ),
        UniteCommand::TaskPlatformElectronPackage => {
            GulpTask::plain(&["gulp", "platform-electron-package"], Platform("Electron"))
        }
        UniteCommand::TaskPlatformElectronPackageOptions => GulpTask::with_steps(
            &["gulp", "platform-electron-package"],
            Platform("Electron"),
            |_| electron_steps(),
        ),
        UniteCommand::TaskPlatformWebPackage => {
            GulpTask::plain(&["gulp", "platform-web-package"], Platform("Web"))
        }
        _ => return None,
    };

    Some(task)
}

/// Run a table-driven gulp task.
pub async fn run_task(
    command: &UniteCommand,
    ctx: &mut CommandContext<'_>,
) -> Result<CommandOutcome, CommandError> {
    let task = gulp_task(command).ok_or_else(|| {
        CommandError::PreconditionUnmet(format!("'{:?}' is not a gulp task", command))
    })?;

    let config = ctx.require_configuration()?;
    task.requirement.check(&config)?;

    let wizard = Wizard::new(task.steps(&config))?;
    let Some(answers) = ctx.ask(&wizard, ctx.options).await? else {
        return Ok(CommandOutcome::Cancelled);
    };

    let args = build(task.base, &answers, wizard.steps());
    ctx.dispatch_in_www_root(&config, args).await
}

/// `gulp build` for a chosen build configuration; `None` builds the default one.
pub async fn build_configuration(ctx: &mut CommandContext<'_>) -> Result<CommandOutcome, CommandError> {
    let config = ctx.require_configuration()?;

    let options =
        LayeredOptions::new(ctx.options).with(BUILD_CONFIGURATIONS, config.build_configuration_names());
    let wizard = Wizard::new(vec![
        Step::choice("buildConfiguration", "Build configuration (None for default) ?")
            .catalog(BUILD_CONFIGURATIONS)
            .with_none()
            .hidden(),
    ])?;

    let Some(answers) = ctx.ask(&wizard, &options).await? else {
        return Ok(CommandOutcome::Cancelled);
    };

    let mut args = ArgumentVector::new(["gulp", "build"]);
    if let Some(name) = answers
        .get("buildConfiguration")
        .filter(|name| *name != NONE_OPTION)
    {
        args.flag("buildConfiguration", name);
    }

    ctx.dispatch_in_www_root(&config, args).await
}

/// `npm install` or `yarn install` depending on the configured package manager.
pub async fn install_packages(ctx: &mut CommandContext<'_>) -> Result<CommandOutcome, CommandError> {
    let config = ctx.require_configuration()?;

    let program = match config.package_manager.to_lowercase().as_str() {
        "npm" => "npm",
        "yarn" => "yarn",
        other => {
            return Err(CommandError::PreconditionUnmet(format!(
                "Package manager '{}' is not supported, use Npm or Yarn",
                other
            )));
        }
    };
    debug!("Installing packages with {}", program);

    ctx.dispatch_in_www_root(&config, ArgumentVector::new([program, "install"]))
        .await
}

fn unit_options_steps(config: &UniteConfiguration) -> Vec<Step> {
    let mut steps = vec![grep("Which test to run (leave blank for all) ?")];

    // only karma can launch a chosen browser
    if config.unit_test_runner.eq_ignore_ascii_case("karma") {
        steps.push(
            Step::choice("browser", "Which browser to launch (leave blank for headless) ?")
                .catalog("unitBrowser"),
        );
    }

    steps.push(
        Step::choice("watch", "Continue to watch ?")
            .catalog(REVERSE_BOOLEAN)
            .presence(),
    );
    steps
}

fn electron_steps() -> Vec<Step> {
    vec![
        Step::text("runtimeVersion", "Runtime Version (leave blank for default) ?"),
        Step::text(
            "platformArch",
            "Platform Architectures e.g. win32/ia32,win32/x64 (leave blank for default) ?",
        ),
        save(),
    ]
}

fn grep(prompt: &str) -> Step {
    Step::text("grep", prompt)
}

fn secure() -> Step {
    Step::choice("secure", "Secure (leave blank for default) ?")
        .catalog(REVERSE_BOOLEAN)
        .presence()
}

fn port() -> Step {
    Step::text("port", "Port (leave blank for default) ?")
}

fn save() -> Step {
    Step::choice("save", "Save as defaults ?").catalog(BOOLEAN).presence()
}

fn cordova_platforms() -> Step {
    Step::text("platforms", "Platforms comma separated (leave blank for default) ?")
}
