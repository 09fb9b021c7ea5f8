//! Application wiring: one session shared by every command

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::CatalogProvider;
use crate::commands::{CommandContext, CommandError, CommandOutcome, UniteCommand};
use crate::config::Settings;
use crate::project::Project;
use crate::session::{
    CommandRouter, InteractiveCommand, SessionConfig, SessionManager, TerminalHost,
};
use crate::ui;
use crate::wizard::{PromptResponse, Prompter};

pub struct App {
    settings: Settings,
    session: SessionManager,
    catalogs: CatalogProvider,
    prompter: Box<dyn Prompter>,
    project: Project,
    router: CommandRouter,
}

impl App {
    pub fn new(
        settings: Settings,
        host: Arc<dyn TerminalHost>,
        prompter: Box<dyn Prompter>,
        project: Project,
    ) -> Self {
        let session = SessionManager::new(SessionConfig::from(&settings), host);
        let catalogs = CatalogProvider::from_settings(&settings);

        Self {
            settings,
            session,
            catalogs,
            prompter,
            project,
            router: CommandRouter::new(),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Run one command without reporting its result.
    pub async fn run_command(
        &mut self,
        command: &UniteCommand,
    ) -> Result<CommandOutcome, CommandError> {
        let mut ctx = CommandContext {
            session: &mut self.session,
            options: &self.catalogs,
            prompter: self.prompter.as_ref(),
            project: &self.project,
            ides: &self.settings.project.ides,
        };

        command.execute(&mut ctx).await
    }

    /// Run one command and report its result.
    pub async fn execute(&mut self, command: &UniteCommand) -> Option<CommandOutcome> {
        let result = self.run_command(command).await;
        ui::report(&result);
        result.ok()
    }

    /// Read commands until the user quits.
    pub async fn run_interactive(&mut self) -> Result<()> {
        info!("Starting interactive command loop");
        println!(
            "Unite project: {} (type /help for commands, an empty line for a list)",
            self.project.root().display()
        );

        loop {
            let line = match self.prompter.text_input("unite").await? {
                PromptResponse::Value(line) => line,
                PromptResponse::Cancelled => break,
            };

            let command = match self.router.parse_interactive_command(&line) {
                Ok(command) => command,
                Err(e) => {
                    ui::notice(&e.to_string());
                    continue;
                }
            };

            match command {
                InteractiveCommand::Run(command) => {
                    self.execute(&command).await;
                }
                InteractiveCommand::Palette => {
                    if let Some(command) = self.pick_command().await? {
                        self.execute(&command).await;
                    }
                }
                InteractiveCommand::Status => {
                    let open = self.session.is_open();
                    ui::display_status(self.session.name(), open, self.session.get_stats());
                }
                InteractiveCommand::Help => self.router.show_help(),
                InteractiveCommand::Quit => break,
            }
        }

        info!("Interactive command loop finished");
        Ok(())
    }

    /// Let submitted commands finish and release the channel.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.session.shutdown().await?;
        Ok(())
    }

    async fn pick_command(&self) -> Result<Option<UniteCommand>> {
        let names = self.router.command_names();
        let name = match self.prompter.choose("Command ?", &names).await? {
            PromptResponse::Value(name) => name,
            PromptResponse::Cancelled => return Ok(None),
        };
        debug!("Picked {} from the palette", name);

        match self.router.parse_interactive_command(&name)? {
            InteractiveCommand::Run(command) => Ok(Some(command)),
            _ => Ok(None),
        }
    }
}
