//! Linear wizard state machine

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::step::{Step, StepInput};
use super::{OptionProvider, PromptResponse, Prompter, WizardError};

/// Values collected by a wizard, keyed by step key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    values: HashMap<String, String>,
}

impl Answers {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Terminal state of a wizard run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    Completed(Answers),
    Cancelled,
}

impl WizardOutcome {
    pub fn completed(self) -> Option<Answers> {
        match self {
            WizardOutcome::Completed(answers) => Some(answers),
            WizardOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WizardOutcome::Cancelled)
    }
}

/// Validated, immutable step sequence.
#[derive(Debug, Clone)]
pub struct Wizard {
    steps: Vec<Step>,
}

impl Wizard {
    /// Build a wizard, rejecting duplicate keys and conditions that read a
    /// key not declared by an earlier step.
    pub fn new(steps: Vec<Step>) -> Result<Self, WizardError> {
        let mut seen: HashSet<&str> = HashSet::new();

        for step in &steps {
            if let Some(condition) = &step.visible_when {
                for key in condition.referenced_keys() {
                    if !seen.contains(key) {
                        return Err(WizardError::InvalidStep {
                            key: step.key.clone(),
                            reason: format!("condition references '{}' before it is declared", key),
                        });
                    }
                }
            }

            if !seen.insert(step.key.as_str()) {
                return Err(WizardError::InvalidStep {
                    key: step.key.clone(),
                    reason: "duplicate step key".to_string(),
                });
            }
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Resolve every visible step in order.
    ///
    /// Returns `Cancelled` as soon as any prompt is dismissed; answers
    /// gathered up to that point are dropped.
    pub async fn run(
        &self,
        options: &dyn OptionProvider,
        prompter: &dyn Prompter,
    ) -> Result<WizardOutcome, WizardError> {
        let mut state = WizardState::new(&self.steps);

        while let Some(step) = state.current() {
            if !step.is_visible(&state.answers) {
                debug!("Skipping hidden step: {}", step.key);
                state.advance();
                continue;
            }

            let response = match &step.input {
                StepInput::Choice { .. } => {
                    let catalog_key = step.catalog_key().unwrap_or(step.key.as_str());
                    let choices = options.options(catalog_key, step.includes_none()).await?;
                    prompter.choose(&step.prompt, &choices).await?
                }
                StepInput::Text => prompter.text_input(&step.prompt).await?,
            };

            match response {
                PromptResponse::Value(value) => {
                    debug!("Step {} answered with {:?}", step.key, value);
                    state.record(value);
                }
                PromptResponse::Cancelled => {
                    info!("Wizard cancelled at step {} ({})", state.cursor, step.key);
                    return Ok(WizardOutcome::Cancelled);
                }
            }
        }

        Ok(WizardOutcome::Completed(state.answers))
    }
}

/// Validate `steps` and run them once.
pub async fn run(
    steps: Vec<Step>,
    options: &dyn OptionProvider,
    prompter: &dyn Prompter,
) -> Result<WizardOutcome, WizardError> {
    Wizard::new(steps)?.run(options, prompter).await
}

struct WizardState<'a> {
    steps: &'a [Step],
    answers: Answers,
    cursor: usize,
}

impl<'a> WizardState<'a> {
    fn new(steps: &'a [Step]) -> Self {
        Self {
            steps,
            answers: Answers::default(),
            cursor: 0,
        }
    }

    fn current(&self) -> Option<&'a Step> {
        self.steps.get(self.cursor)
    }

    fn record(&mut self, value: String) {
        if let Some(step) = self.current() {
            self.answers.insert(step.key.clone(), value);
        }
        self.advance();
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogProvider;
    use crate::wizard::mock::ScriptedPrompter;
    use crate::wizard::step::Condition;

    fn runner_steps() -> Vec<Step> {
        vec![
            Step::choice("runner", "runner ?").with_none(),
            Step::choice("framework", "framework ?")
                .visible_when(Condition::not_equals("runner", "None")),
        ]
    }

    fn runner_options() -> CatalogProvider {
        CatalogProvider::empty()
            .with("runner", &["Karma", "Jest"])
            .with("framework", &["Jasmine", "MochaChai"])
    }

    #[tokio::test]
    async fn test_hidden_step_is_never_prompted() {
        let prompter = ScriptedPrompter::new(vec![PromptResponse::value("None")]);
        let outcome = run(runner_steps(), &runner_options(), &prompter)
            .await
            .unwrap();

        let answers = outcome.completed().unwrap();
        assert_eq!(answers.get("runner"), Some("None"));
        assert!(!answers.contains("framework"));
        assert_eq!(answers.len(), 1);

        let prompts = prompter.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(
            prompts[0].options,
            Some(vec!["None".to_string(), "Karma".to_string(), "Jest".to_string()])
        );
    }

    #[tokio::test]
    async fn test_visible_step_is_prompted() {
        let prompter = ScriptedPrompter::new(vec![
            PromptResponse::value("Jest"),
            PromptResponse::value("Jasmine"),
        ]);
        let answers = run(runner_steps(), &runner_options(), &prompter)
            .await
            .unwrap()
            .completed()
            .unwrap();

        assert_eq!(answers.get("framework"), Some("Jasmine"));
        assert_eq!(prompter.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_stops_remaining_steps() {
        let steps = vec![
            Step::text("name", "name ?"),
            Step::text("title", "title ?"),
            Step::text("version", "version ?"),
        ];
        let prompter = ScriptedPrompter::new(vec![
            PromptResponse::value("app"),
            PromptResponse::Cancelled,
            PromptResponse::value("never asked"),
        ]);

        let outcome = run(steps, &CatalogProvider::empty(), &prompter).await.unwrap();
        assert!(outcome.is_cancelled());
        assert_eq!(prompter.prompts().len(), 2);
        assert_eq!(prompter.remaining(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_is_a_value() {
        let steps = vec![Step::text("version", "Version (leave blank for latest) ?")];
        let prompter = ScriptedPrompter::new(vec![PromptResponse::value("")]);

        let answers = run(steps, &CatalogProvider::empty(), &prompter)
            .await
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(answers.get("version"), Some(""));
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let steps = vec![Step::choice("bundler", "bundler ?")];
        let prompter = ScriptedPrompter::new(vec![PromptResponse::value("Webpack")]);

        let result = run(steps, &CatalogProvider::empty(), &prompter).await;
        assert!(matches!(result, Err(WizardError::CatalogUnavailable(key)) if key == "bundler"));
        assert!(prompter.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_override_is_queried() {
        let steps = vec![Step::choice("e2eTestFramework", "e2eTestFramework ?").catalog("testFramework")];
        let options = CatalogProvider::empty().with("testFramework", &["Jasmine"]);
        let prompter = ScriptedPrompter::new(vec![PromptResponse::value("Jasmine")]);

        let answers = run(steps, &options, &prompter)
            .await
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(answers.get("e2eTestFramework"), Some("Jasmine"));
    }

    #[test]
    fn test_forward_reference_rejected() {
        let steps = vec![
            Step::choice("framework", "framework ?")
                .visible_when(Condition::not_equals("runner", "None")),
            Step::choice("runner", "runner ?"),
        ];
        let err = Wizard::new(steps).unwrap_err();
        assert!(matches!(err, WizardError::InvalidStep { key, .. } if key == "framework"));
    }

    #[test]
    fn test_self_reference_and_duplicates_rejected() {
        let self_ref = vec![
            Step::choice("runner", "runner ?").visible_when(Condition::equals("runner", "Jest")),
        ];
        assert!(Wizard::new(self_ref).is_err());

        let duplicate = vec![Step::text("name", "a"), Step::text("name", "b")];
        assert!(Wizard::new(duplicate).is_err());
    }
}
