use anyhow::Result;
use std::sync::Arc;
use unitectl::{
    app::App,
    cli::{Cli, Commands, SettingsAction},
    config::Settings,
    init_logging,
    project::Project,
    session::ShellHost,
    ui::DialoguerPrompter,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load settings
    let settings = Settings::load_or_default(&cli.settings_file);

    // Initialize logging
    let _guard = init_logging(
        &cli.effective_log_level(&settings.log_level),
        &settings.log.file_path,
    )?;

    tracing::info!("unitectl starting...");
    tracing::debug!("CLI arguments: {:?}", cli);

    if let Some(Commands::Settings { action }) = &cli.command {
        return handle_settings(action.clone(), &settings, &cli.settings_file);
    }

    // Locate the project
    let start = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let project = Project::discover(&start, &settings.project.config_filename);
    tracing::info!("Project root: {}", project.root().display());

    let host = Arc::new(ShellHost::new(settings.terminal.shell.clone()));
    let mut app = App::new(settings, host, Box::new(DialoguerPrompter::new()), project);

    if cli.is_interactive_mode() {
        app.run_interactive().await?;
    } else if let Some(Commands::Unite(command)) = &cli.command {
        app.execute(command).await;
    }

    app.shutdown().await?;
    Ok(())
}

fn handle_settings(action: Option<SettingsAction>, settings: &Settings, path: &str) -> Result<()> {
    match action.unwrap_or(SettingsAction::Show) {
        SettingsAction::Show => settings.display(),
        SettingsAction::Init => {
            Settings::default().save_to_file(path)?;
            println!("Wrote default settings to {}", path);
            Ok(())
        }
    }
}
