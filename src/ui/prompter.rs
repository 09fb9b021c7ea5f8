//! Terminal prompts backed by dialoguer

use async_trait::async_trait;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::io::ErrorKind;
use tracing::debug;

use crate::wizard::{PromptResponse, Prompter, WizardError};

/// Prompter running dialoguer widgets on the blocking pool
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prompter for DialoguerPrompter {
    async fn choose(
        &self,
        prompt: &str,
        options: &[String],
    ) -> Result<PromptResponse, WizardError> {
        if options.is_empty() {
            super::notice(&format!("{} There is nothing to choose from.", prompt));
            return Ok(PromptResponse::Cancelled);
        }

        let prompt = prompt.to_string();
        let items = options.to_vec();

        let selection = tokio::task::spawn_blocking(move || {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .items(&items)
                .default(0)
                .interact_opt()
                .map(|index| index.and_then(|index| items.get(index).cloned()))
        })
        .await
        .map_err(|e| WizardError::Prompt(e.to_string()))?;

        match selection {
            Ok(Some(value)) => Ok(PromptResponse::Value(value)),
            Ok(None) => {
                debug!("Selection dismissed");
                Ok(PromptResponse::Cancelled)
            }
            Err(e) => cancelled_or_error(e),
        }
    }

    async fn text_input(&self, prompt: &str) -> Result<PromptResponse, WizardError> {
        let prompt = prompt.to_string();

        let input = tokio::task::spawn_blocking(move || {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        })
        .await
        .map_err(|e| WizardError::Prompt(e.to_string()))?;

        match input {
            Ok(value) => Ok(PromptResponse::Value(value)),
            Err(e) => cancelled_or_error(e),
        }
    }
}

/// Ctrl-C inside a widget counts as dismissing it.
fn cancelled_or_error(err: dialoguer::Error) -> Result<PromptResponse, WizardError> {
    match err {
        dialoguer::Error::IO(io) if io.kind() == ErrorKind::Interrupted => {
            debug!("Prompt interrupted");
            Ok(PromptResponse::Cancelled)
        }
        other => Err(WizardError::Prompt(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_is_cancel() {
        let err = dialoguer::Error::IO(std::io::Error::new(ErrorKind::Interrupted, "ctrl-c"));
        assert_eq!(cancelled_or_error(err).unwrap(), PromptResponse::Cancelled);
    }

    #[test]
    fn test_io_failure_is_error() {
        let err = dialoguer::Error::IO(std::io::Error::new(ErrorKind::NotConnected, "not a tty"));
        assert!(matches!(cancelled_or_error(err), Err(WizardError::Prompt(_))));
    }

    #[tokio::test]
    async fn test_empty_choice_is_cancelled() {
        let prompter = DialoguerPrompter::new();
        let response = prompter.choose("Platform to add ?", &[]).await.unwrap();
        assert!(response.is_cancelled());
    }
}
