//! Command Router for interactive command processing

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::debug;

use crate::commands::UniteCommand;

/// Interactive commands for the command loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveCommand {
    /// Build and dispatch a command line
    Run(UniteCommand),
    /// Pick a command from the full list
    Palette,
    /// Show session statistics
    Status,
    /// Show the interactive help
    Help,
    /// Quit the application
    Quit,
}

/// One line typed at the interactive prompt
#[derive(Parser, Debug)]
#[command(
    name = "unitectl",
    no_binary_name = true,
    disable_help_subcommand = true,
    disable_help_flag = true
)]
struct InteractiveLine {
    #[command(subcommand)]
    command: UniteCommand,
}

/// Command router for processing interactive input
#[derive(Debug, Default)]
pub struct CommandRouter;

impl CommandRouter {
    pub fn new() -> Self {
        Self
    }

    /// Parse interactive command from string input
    pub fn parse_interactive_command(&self, input: &str) -> Result<InteractiveCommand> {
        let input = input.trim();

        if input.is_empty() {
            return Ok(InteractiveCommand::Palette);
        }

        match input {
            "/help" | "?" => return Ok(InteractiveCommand::Help),
            "/status" => return Ok(InteractiveCommand::Status),
            "/quit" | "/exit" | "/q" => return Ok(InteractiveCommand::Quit),
            _ => {}
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        debug!("Parsing interactive command: {:?}", parts);

        match InteractiveLine::try_parse_from(parts.iter().copied()) {
            Ok(line) => Ok(InteractiveCommand::Run(line.command)),
            Err(_) => Err(anyhow::anyhow!(
                "Unknown command: {}. Type '/help' for available commands.",
                input
            )),
        }
    }

    /// Names of every command, in declaration order.
    pub fn command_names(&self) -> Vec<String> {
        self.help_entries().into_iter().map(|(name, _)| name).collect()
    }

    /// Name and one-line description of every command.
    pub fn help_entries(&self) -> Vec<(String, String)> {
        InteractiveLine::command()
            .get_subcommands()
            .map(|sub| {
                let about = sub.get_about().map(|about| about.to_string()).unwrap_or_default();
                (sub.get_name().to_string(), about)
            })
            .collect()
    }

    /// Show interactive command help
    pub fn show_help(&self) {
        println!("\nUnite Interactive Commands:");
        for (name, about) in self.help_entries() {
            println!("  {:<42} - {}", name, about);
        }
        println!();
        println!("  {:<42} - {}", "<empty line>", "Pick a command from a list");
        println!("  {:<42} - {}", "/status", "Show session statistics");
        println!("  {:<42} - {}", "/help", "Show this help");
        println!("  {:<42} - {}", "/quit", "Exit the application");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let router = CommandRouter::new();

        assert_eq!(
            router.parse_interactive_command("version").unwrap(),
            InteractiveCommand::Run(UniteCommand::Version)
        );
        assert_eq!(
            router.parse_interactive_command("  configure-options --stage ").unwrap(),
            InteractiveCommand::Run(UniteCommand::ConfigureOptions { stage: true })
        );
        assert_eq!(
            router.parse_interactive_command("help").unwrap(),
            InteractiveCommand::Run(UniteCommand::Help)
        );
    }

    #[test]
    fn test_parse_builtins() {
        let router = CommandRouter::new();

        assert_eq!(router.parse_interactive_command("").unwrap(), InteractiveCommand::Palette);
        assert_eq!(router.parse_interactive_command("/help").unwrap(), InteractiveCommand::Help);
        assert_eq!(router.parse_interactive_command("/status").unwrap(), InteractiveCommand::Status);
        assert_eq!(router.parse_interactive_command("/q").unwrap(), InteractiveCommand::Quit);
    }

    #[test]
    fn test_unknown_command() {
        let router = CommandRouter::new();
        let err = router.parse_interactive_command("deploy now").unwrap_err();
        assert!(err.to_string().contains("Unknown command: deploy now"));
    }

    #[test]
    fn test_command_names_follow_declaration_order() {
        let names = CommandRouter::new().command_names();
        assert_eq!(names.first().map(String::as_str), Some("version"));
        assert_eq!(names.last().map(String::as_str), Some("task-platform-web-package"));
        assert_eq!(names.len(), 40);
    }
}
