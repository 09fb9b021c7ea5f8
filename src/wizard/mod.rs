//! Wizard engine module
//!
//! Runs ordered, conditionally visible prompt steps and turns the collected
//! answers into an argument vector for the terminal session.

pub mod args;
pub mod engine;
pub mod mock;
pub mod step;

pub use args::{ArgumentVector, build, quote_value};
pub use engine::{Answers, Wizard, WizardOutcome, run};
pub use step::{Condition, FlagStyle, Step, StepInput};

use async_trait::async_trait;

/// Result of a single prompt.
///
/// `Cancelled` means the user dismissed the prompt. It is never conflated with
/// an empty answer, which is a legitimate value for free-text steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    Value(String),
    Cancelled,
}

impl PromptResponse {
    pub fn value(text: impl Into<String>) -> Self {
        PromptResponse::Value(text.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PromptResponse::Cancelled)
    }
}

/// Error types for wizard operations
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Invalid step '{key}': {reason}")]
    InvalidStep { key: String, reason: String },
    #[error("Option catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("Prompt error: {0}")]
    Prompt(String),
}

/// Supplies the choices for enumerated steps.
#[async_trait]
pub trait OptionProvider: Send + Sync {
    /// Ordered options for `catalog_key`, with a leading `"None"` when
    /// `include_none` is set.
    async fn options(
        &self,
        catalog_key: &str,
        include_none: bool,
    ) -> Result<Vec<String>, WizardError>;
}

/// Presents prompts to the user.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn choose(
        &self,
        prompt: &str,
        options: &[String],
    ) -> Result<PromptResponse, WizardError>;

    async fn text_input(&self, prompt: &str) -> Result<PromptResponse, WizardError>;
}

#[async_trait]
impl<P: Prompter + ?Sized> Prompter for std::sync::Arc<P> {
    async fn choose(
        &self,
        prompt: &str,
        options: &[String],
    ) -> Result<PromptResponse, WizardError> {
        (**self).choose(prompt, options).await
    }

    async fn text_input(&self, prompt: &str) -> Result<PromptResponse, WizardError> {
        (**self).text_input(prompt).await
    }
}
