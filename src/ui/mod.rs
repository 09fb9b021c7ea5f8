//! User Interface module
//!
//! Terminal prompts plus the single place where command results are shown.

/// dialoguer-backed prompts
pub mod prompter;

pub use prompter::DialoguerPrompter;

use colored::Colorize;
use tracing::{error, warn};

use crate::commands::{CommandError, CommandOutcome};
use crate::session::SessionStats;

/// Show a one-line notice
pub fn notice(message: &str) {
    eprintln!("{} {}", "!".yellow().bold(), message);
}

/// Text shown for a failed command
pub fn format_failure(err: &CommandError) -> String {
    if err.is_notice() {
        err.to_string()
    } else {
        format!("There was a problem running the command: {}", err)
    }
}

/// Report the result of one command.
///
/// Cancellation is silent, notices take one line, and every other failure is
/// rendered as a problem report.
pub fn report(result: &Result<CommandOutcome, CommandError>) {
    match result {
        Ok(_) => {}
        Err(err) if err.is_notice() => {
            warn!("{}", err);
            notice(&format_failure(err));
        }
        Err(err) => {
            error!("Command failed: {}", err);
            eprintln!("{}", format_failure(err).red());
        }
    }
}

/// Display session statistics
pub fn display_status(name: &str, open: bool, stats: &SessionStats) {
    println!("🔍 Terminal '{}':", name);
    println!("   Open: {}", if open { "yes".green() } else { "no".yellow() });
    println!(
        "   Running since: {}",
        stats.start_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("   Commands dispatched: {}", stats.commands_dispatched);
    println!("   Channels created: {}", stats.channels_created);
    println!("   Channels reset: {}", stats.channels_disposed);
    println!("   Closed externally: {}", stats.external_closes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::WizardError;

    #[test]
    fn test_failure_text() {
        let err = CommandError::Wizard(WizardError::CatalogUnavailable("bundler".to_string()));
        assert_eq!(
            format_failure(&err),
            "There was a problem running the command: Option catalog unavailable: bundler"
        );

        let notice = CommandError::PreconditionUnmet(
            "You have already added all the available platforms.".to_string(),
        );
        assert_eq!(
            format_failure(&notice),
            "You have already added all the available platforms."
        );
    }
}
