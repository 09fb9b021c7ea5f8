//! Scripted prompter for tests
//!
//! Replays a fixed sequence of responses and records every prompt shown.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{PromptResponse, Prompter, WizardError};

/// A prompt as presented to the scripted user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRecord {
    pub prompt: String,
    /// `None` for free-text prompts
    pub options: Option<Vec<String>>,
}

/// Prompter that answers from a prepared script
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    responses: Mutex<VecDeque<PromptResponse>>,
    prompts: Mutex<Vec<PromptRecord>>,
}

impl ScriptedPrompter {
    pub fn new(responses: Vec<PromptResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand for a script made only of values.
    pub fn answering(values: &[&str]) -> Self {
        Self::new(values.iter().map(|v| PromptResponse::value(*v)).collect())
    }

    /// Every prompt shown so far, in order
    pub fn prompts(&self) -> Vec<PromptRecord> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    /// Responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .map(|responses| responses.len())
            .unwrap_or_default()
    }

    fn next(&self, record: PromptRecord) -> Result<PromptResponse, WizardError> {
        let prompt = record.prompt.clone();
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(record);
        }

        self.responses
            .lock()
            .map_err(|e| WizardError::Prompt(e.to_string()))?
            .pop_front()
            .ok_or_else(|| WizardError::Prompt(format!("No scripted response for '{}'", prompt)))
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn choose(
        &self,
        prompt: &str,
        options: &[String],
    ) -> Result<PromptResponse, WizardError> {
        self.next(PromptRecord {
            prompt: prompt.to_string(),
            options: Some(options.to_vec()),
        })
    }

    async fn text_input(&self, prompt: &str) -> Result<PromptResponse, WizardError> {
        self.next(PromptRecord {
            prompt: prompt.to_string(),
            options: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn test_replays_script_in_order() {
        let prompter = ScriptedPrompter::answering(&["Karma", ""]);

        block_on(async {
            let options = vec!["Karma".to_string(), "Jest".to_string()];
            assert_eq!(
                prompter.choose("Runner ?", &options).await.unwrap(),
                PromptResponse::value("Karma")
            );
            assert_eq!(
                prompter.text_input("Grep ?").await.unwrap(),
                PromptResponse::value("")
            );
        });

        let prompts = prompter.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].options.as_ref().map(Vec::len), Some(2));
        assert_eq!(prompts[1].options, None);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_exhausted_script_is_an_error() {
        let prompter = ScriptedPrompter::default();

        let err = block_on(prompter.text_input("Name ?")).unwrap_err();
        assert!(matches!(err, WizardError::Prompt(message) if message.contains("Name ?")));
    }
}
