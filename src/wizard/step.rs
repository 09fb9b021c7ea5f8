//! Step declarations and visibility conditions

use super::engine::Answers;

/// How a step collects its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    /// Pick one entry from an option catalog.
    Choice {
        catalog_key: Option<String>,
        include_none: bool,
    },
    /// Free text; an empty answer is kept as a value.
    Text,
}

/// How a collected value is rendered into the argument vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagStyle {
    /// `--key=value`, quoted only when the value contains whitespace
    Value,
    /// `--key="value"` regardless of content
    Quoted,
    /// bare `--key` when the value is `"true"`, nothing otherwise
    Presence,
    /// never emitted; the handler consumes the value itself
    Hidden,
}

/// Visibility predicate over previously collected answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals { key: String, value: String },
    NotEquals { key: String, value: String },
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::Equals {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn not_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::NotEquals {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Evaluate against the answers collected so far.
    ///
    /// A key that was never answered (its step was skipped) compares unequal
    /// to every value.
    pub fn evaluate(&self, answers: &Answers) -> bool {
        match self {
            Condition::Equals { key, value } => answers.get(key) == Some(value.as_str()),
            Condition::NotEquals { key, value } => answers.get(key) != Some(value.as_str()),
            Condition::All(conditions) => conditions.iter().all(|c| c.evaluate(answers)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.evaluate(answers)),
        }
    }

    /// Every step key this condition reads.
    pub fn referenced_keys(&self) -> Vec<&str> {
        match self {
            Condition::Equals { key, .. } | Condition::NotEquals { key, .. } => vec![key.as_str()],
            Condition::All(conditions) | Condition::Any(conditions) => conditions
                .iter()
                .flat_map(|c| c.referenced_keys())
                .collect(),
        }
    }
}

/// One prompt in a wizard sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub key: String,
    pub prompt: String,
    pub input: StepInput,
    pub flag_style: FlagStyle,
    pub flag_name: Option<String>,
    pub visible_when: Option<Condition>,
}

impl Step {
    /// Enumerated step reading the catalog named after `key`.
    pub fn choice(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            input: StepInput::Choice {
                catalog_key: None,
                include_none: false,
            },
            flag_style: FlagStyle::Value,
            flag_name: None,
            visible_when: None,
        }
    }

    /// Free-text step.
    pub fn text(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            input: StepInput::Text,
            flag_style: FlagStyle::Value,
            flag_name: None,
            visible_when: None,
        }
    }

    /// Read options from a different catalog than `key`.
    pub fn catalog(mut self, key: impl Into<String>) -> Self {
        if let StepInput::Choice { catalog_key, .. } = &mut self.input {
            *catalog_key = Some(key.into());
        }
        self
    }

    /// Prepend a synthetic `"None"` option.
    pub fn with_none(mut self) -> Self {
        if let StepInput::Choice { include_none, .. } = &mut self.input {
            *include_none = true;
        }
        self
    }

    pub fn quoted(mut self) -> Self {
        self.flag_style = FlagStyle::Quoted;
        self
    }

    pub fn presence(mut self) -> Self {
        self.flag_style = FlagStyle::Presence;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.flag_style = FlagStyle::Hidden;
        self
    }

    /// Emit under a different flag name than `key`.
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.flag_name = Some(name.into());
        self
    }

    pub fn visible_when(mut self, condition: Condition) -> Self {
        self.visible_when = Some(condition);
        self
    }

    /// Catalog queried for this step, `None` for text steps.
    pub fn catalog_key(&self) -> Option<&str> {
        match &self.input {
            StepInput::Choice { catalog_key, .. } => {
                Some(catalog_key.as_deref().unwrap_or(self.key.as_str()))
            }
            StepInput::Text => None,
        }
    }

    pub fn includes_none(&self) -> bool {
        matches!(
            self.input,
            StepInput::Choice {
                include_none: true,
                ..
            }
        )
    }

    pub fn flag_name(&self) -> &str {
        self.flag_name.as_deref().unwrap_or(self.key.as_str())
    }

    pub fn is_visible(&self, answers: &Answers) -> bool {
        self.visible_when
            .as_ref()
            .is_none_or(|condition| condition.evaluate(answers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, &str)]) -> Answers {
        let mut answers = Answers::default();
        for (key, value) in pairs {
            answers.insert(*key, *value);
        }
        answers
    }

    #[test]
    fn test_condition_evaluation() {
        let runner = answers(&[("unitTestRunner", "Karma")]);
        let none = answers(&[("unitTestRunner", "None")]);

        let cond = Condition::not_equals("unitTestRunner", "None");
        assert!(cond.evaluate(&runner));
        assert!(!cond.evaluate(&none));

        let cond = Condition::equals("unitTestRunner", "Karma");
        assert!(cond.evaluate(&runner));
        assert!(!cond.evaluate(&none));
    }

    #[test]
    fn test_condition_on_skipped_key() {
        let empty = Answers::default();
        assert!(Condition::not_equals("runner", "None").evaluate(&empty));
        assert!(!Condition::equals("runner", "None").evaluate(&empty));
    }

    #[test]
    fn test_compound_conditions() {
        let state = answers(&[("a", "1"), ("b", "2")]);
        let all = Condition::All(vec![Condition::equals("a", "1"), Condition::equals("b", "3")]);
        let any = Condition::Any(vec![Condition::equals("a", "1"), Condition::equals("b", "3")]);
        assert!(!all.evaluate(&state));
        assert!(any.evaluate(&state));
        assert_eq!(all.referenced_keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_step_builders() {
        let step = Step::choice("unitTestFramework", "unitTestFramework ?")
            .catalog("testFramework")
            .with_none();
        assert_eq!(step.catalog_key(), Some("testFramework"));
        assert!(step.includes_none());
        assert_eq!(step.flag_name(), "unitTestFramework");

        let text = Step::text("title", "Title ?").quoted().catalog("ignored");
        assert_eq!(text.catalog_key(), None);
        assert_eq!(text.flag_style, FlagStyle::Quoted);
        assert!(!text.includes_none());
    }

    #[test]
    fn test_step_visibility() {
        let step = Step::choice("framework", "framework ?")
            .visible_when(Condition::not_equals("runner", "None"));
        assert!(!step.is_visible(&answers(&[("runner", "None")])));
        assert!(step.is_visible(&answers(&[("runner", "Jest")])));
        assert!(Step::text("name", "name ?").is_visible(&Answers::default()));
    }
}
