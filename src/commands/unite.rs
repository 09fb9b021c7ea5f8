//! `unite` commands; every one of them runs on a fresh channel

use tracing::info;

use super::{CommandContext, CommandError, CommandOutcome};
use crate::catalog::{BOOLEAN, LayeredOptions};
use crate::wizard::{ArgumentVector, Condition, Step, Wizard, build};

const BUILD_CONFIGURATIONS: &str = "buildConfigurations";
const CLIENT_PACKAGES: &str = "clientPackages";
const PLATFORMS: &str = "platforms";
const REMAINING_PLATFORMS: &str = "remainingPlatforms";

pub async fn version(ctx: &mut CommandContext<'_>) -> Result<CommandOutcome, CommandError> {
    ctx.dispatch_reset(ArgumentVector::new(["unite", "version"]), true).await
}

pub async fn help(ctx: &mut CommandContext<'_>) -> Result<CommandOutcome, CommandError> {
    ctx.dispatch_reset(ArgumentVector::new(["unite", "help"]), true).await
}

pub async fn configure_update(ctx: &mut CommandContext<'_>) -> Result<CommandOutcome, CommandError> {
    ctx.dispatch_unite(ArgumentVector::new(["unite", "configure"]), true).await
}

pub async fn configure_profile(ctx: &mut CommandContext<'_>) -> Result<CommandOutcome, CommandError> {
    let wizard = Wizard::new(vec![
        Step::choice("profile", "Configuration profile ?").catalog("profile.configure"),
        Step::text("packageName", "Please enter a package name ?"),
        Step::text("title", "Please enter a title ?").quoted(),
    ])?;

    let Some(answers) = ctx.ask(&wizard, ctx.options).await? else {
        return Ok(CommandOutcome::Cancelled);
    };

    let args = build(&["unite", "configure"], &answers, wizard.steps());
    ctx.dispatch_unite(args, true).await
}

/// Full project configuration; `execute = false` only stages the command line.
pub async fn configure_options(
    ctx: &mut CommandContext<'_>,
    execute: bool,
) -> Result<CommandOutcome, CommandError> {
    let wizard = Wizard::new(configure_options_steps())?;

    let Some(answers) = ctx.ask(&wizard, ctx.options).await? else {
        info!("Configure cancelled, nothing written");
        return Ok(CommandOutcome::Cancelled);
    };

    let mut args = build(&["unite", "configure"], &answers, wizard.steps());
    args.flag("ides", ctx.ides);
    ctx.dispatch_unite(args, execute).await
}

/// Steps of `configure-options`, in prompt and flag order.
pub fn configure_options_steps() -> Vec<Step> {
    let with_unit_runner = || Condition::not_equals("unitTestRunner", "None");

    vec![
        Step::text("packageName", "Please enter a package name ?"),
        Step::text("title", "Please enter a title ?").quoted(),
        Step::choice("license", "License"),
        Step::choice("appFramework", "appFramework ?").catalog("applicationFramework"),
        Step::choice("sourceLanguage", "sourceLanguage ?").catalog("language"),
        Step::choice("linter", "linter ?").with_none(),
        Step::choice("moduleType", "moduleType ?"),
        Step::choice("bundler", "bundler ?"),
        Step::choice("unitTestRunner", "unitTestRunner ?").with_none(),
        Step::choice("unitTestFramework", "unitTestFramework ?")
            .catalog("testFramework")
            .visible_when(with_unit_runner()),
        Step::choice("unitTestEngine", "unitTestEngine ?").visible_when(with_unit_runner()),
        Step::choice("e2eTestRunner", "e2eTestRunner ?").with_none(),
        Step::choice("e2eTestFramework", "e2eTestFramework ?")
            .catalog("testFramework")
            .visible_when(Condition::not_equals("e2eTestRunner", "None")),
        Step::choice("cssPre", "cssPre ?"),
        Step::choice("cssPost", "cssPost ?"),
        Step::choice("cssLinter", "cssLinter ?"),
        Step::choice("packageManager", "packageManager ?"),
    ]
}

pub async fn build_configuration_add(
    ctx: &mut CommandContext<'_>,
) -> Result<CommandOutcome, CommandError> {
    let wizard = Wizard::new(vec![
        Step::text("configurationName", "Please enter a build configuration name ?"),
        Step::choice("bundle", "Bundle the build ?").catalog(BOOLEAN),
        Step::choice("minify", "Minify the build ?").catalog(BOOLEAN),
        Step::choice("sourcemaps", "Add sourcemaps to the build ?").catalog(BOOLEAN),
        Step::choice("pwa", "Enable PWA for the build ?").catalog(BOOLEAN),
    ])?;

    let Some(answers) = ctx.ask(&wizard, ctx.options).await? else {
        return Ok(CommandOutcome::Cancelled);
    };

    let args = build(
        &["unite", "buildConfiguration", "--operation=add"],
        &answers,
        wizard.steps(),
    );
    ctx.dispatch_unite(args, true).await
}

pub async fn build_configuration_remove(
    ctx: &mut CommandContext<'_>,
) -> Result<CommandOutcome, CommandError> {
    let config = ctx.require_configuration()?;
    let names = non_empty(
        config.build_configuration_names(),
        "There are no build configurations to remove.",
    )?;

    let options = LayeredOptions::new(ctx.options).with(BUILD_CONFIGURATIONS, names);
    let wizard = Wizard::new(vec![
        Step::choice("configurationName", "Build configuration to remove ?")
            .catalog(BUILD_CONFIGURATIONS),
    ])?;

    let Some(answers) = ctx.ask(&wizard, &options).await? else {
        return Ok(CommandOutcome::Cancelled);
    };

    let args = build(
        &["unite", "buildConfiguration", "--operation=remove"],
        &answers,
        wizard.steps(),
    );
    ctx.dispatch_unite(args, true).await
}

pub async fn generate(ctx: &mut CommandContext<'_>) -> Result<CommandOutcome, CommandError> {
    let config = ctx.require_configuration()?;
    let catalog = format!("generate.{}", config.application_framework.to_lowercase());

    let wizard = Wizard::new(vec![
        Step::choice("type", "Generate type ?").catalog(catalog),
        Step::text("name", "Please enter a human name for your new item ?").quoted(),
    ])?;

    let Some(answers) = ctx.ask(&wizard, ctx.options).await? else {
        return Ok(CommandOutcome::Cancelled);
    };

    let args = build(&["unite", "generate"], &answers, wizard.steps());
    ctx.dispatch_unite(args, true).await
}

pub async fn client_package_add_profile(
    ctx: &mut CommandContext<'_>,
) -> Result<CommandOutcome, CommandError> {
    let wizard = Wizard::new(vec![
        Step::choice("profile", "Client package profile ?").catalog("profile.clientPackage"),
    ])?;

    let Some(answers) = ctx.ask(&wizard, ctx.options).await? else {
        return Ok(CommandOutcome::Cancelled);
    };

    let args = build(
        &["unite", "clientPackage", "--operation=add"],
        &answers,
        wizard.steps(),
    );
    ctx.dispatch_unite(args, true).await
}

pub async fn client_package_add(ctx: &mut CommandContext<'_>) -> Result<CommandOutcome, CommandError> {
    let wizard = Wizard::new(vec![
        Step::text("packageName", "Package name ?"),
        // blank means latest
        Step::text("version", "Version (leave blank for latest) ?"),
    ])?;

    let Some(answers) = ctx.ask(&wizard, ctx.options).await? else {
        return Ok(CommandOutcome::Cancelled);
    };

    let args = build(
        &["unite", "clientPackage", "--operation=add"],
        &answers,
        wizard.steps(),
    );
    ctx.dispatch_unite(args, true).await
}

pub async fn client_package_remove(
    ctx: &mut CommandContext<'_>,
) -> Result<CommandOutcome, CommandError> {
    let config = ctx.require_configuration()?;
    let names = non_empty(
        config.client_package_names(),
        "There are no client packages to remove.",
    )?;

    let options = LayeredOptions::new(ctx.options).with(CLIENT_PACKAGES, names);
    let wizard = Wizard::new(vec![
        Step::choice("packageName", "Client package to remove ?").catalog(CLIENT_PACKAGES),
    ])?;

    let Some(answers) = ctx.ask(&wizard, &options).await? else {
        return Ok(CommandOutcome::Cancelled);
    };

    let args = build(
        &["unite", "clientPackage", "--operation=remove"],
        &answers,
        wizard.steps(),
    );
    ctx.dispatch_unite(args, true).await
}

pub async fn platform_add(ctx: &mut CommandContext<'_>) -> Result<CommandOutcome, CommandError> {
    let config = ctx.require_configuration()?;

    let available = ctx.options.options("platform", false).await?;
    let remaining: Vec<String> = available
        .into_iter()
        .filter(|platform| !config.has_platform(platform))
        .collect();
    let remaining = non_empty(remaining, "You have already added all the available platforms.")?;

    let options = LayeredOptions::new(ctx.options).with(REMAINING_PLATFORMS, remaining);
    let wizard = Wizard::new(vec![
        Step::choice("platformName", "Platform to add ?").catalog(REMAINING_PLATFORMS),
    ])?;

    let Some(answers) = ctx.ask(&wizard, &options).await? else {
        return Ok(CommandOutcome::Cancelled);
    };

    let args = build(
        &["unite", "platform", "--operation=add"],
        &answers,
        wizard.steps(),
    );
    ctx.dispatch_unite(args, true).await
}

pub async fn platform_remove(ctx: &mut CommandContext<'_>) -> Result<CommandOutcome, CommandError> {
    let config = ctx.require_configuration()?;
    let names = non_empty(config.platform_names(), "There are no platforms to remove.")?;

    let options = LayeredOptions::new(ctx.options).with(PLATFORMS, names);
    let wizard = Wizard::new(vec![
        Step::choice("platformName", "Platform to remove ?").catalog(PLATFORMS),
    ])?;

    let Some(answers) = ctx.ask(&wizard, &options).await? else {
        return Ok(CommandOutcome::Cancelled);
    };

    let args = build(
        &["unite", "platform", "--operation=remove"],
        &answers,
        wizard.steps(),
    );
    ctx.dispatch_unite(args, true).await
}

fn non_empty(items: Vec<String>, notice: &str) -> Result<Vec<String>, CommandError> {
    if items.is_empty() {
        Err(CommandError::PreconditionUnmet(notice.to_string()))
    } else {
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::Answers;

    #[test]
    fn test_configure_options_steps_are_valid() {
        let wizard = Wizard::new(configure_options_steps()).unwrap();
        assert_eq!(wizard.steps().len(), 17);
    }

    #[test]
    fn test_configure_options_flag_order() {
        let steps = configure_options_steps();
        let mut answers = Answers::default();
        answers.insert("packageName", "my-app");
        answers.insert("title", "My App");
        answers.insert("license", "MIT");
        answers.insert("unitTestRunner", "None");
        answers.insert("packageManager", "Yarn");

        let args = build(&["unite", "configure"], &answers, &steps);
        assert_eq!(
            args.command_line(),
            "unite configure --packageName=my-app --title=\"My App\" --license=MIT --unitTestRunner=None --packageManager=Yarn"
        );
    }

    #[test]
    fn test_non_empty() {
        assert!(non_empty(vec!["Web".to_string()], "none").is_ok());
        let err = non_empty(Vec::new(), "nothing left").unwrap_err();
        assert_eq!(err.to_string(), "nothing left");
    }
}
