//! Argument vector construction
//!
//! Produces the exact token shape the target CLIs parse: positional tokens,
//! `--key=value` and bare `--key` flags, whitespace-bearing values quoted.

use std::borrow::Cow;
use std::fmt;

use super::engine::Answers;
use super::step::{FlagStyle, Step};

/// Ordered tokens of one command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentVector {
    tokens: Vec<String>,
}

impl ArgumentVector {
    pub fn new<I, S>(base: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: base.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a positional token as-is.
    pub fn push(&mut self, token: impl Into<String>) -> &mut Self {
        self.tokens.push(token.into());
        self
    }

    /// Append `--name=value`; an empty value appends nothing.
    pub fn flag(&mut self, name: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.tokens.push(format!("--{}={}", name, quote_value(value)));
        }
        self
    }

    /// Append `--name="value"`; an empty value appends nothing.
    pub fn quoted_flag(&mut self, name: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.tokens.push(format!("--{}={}", name, force_quotes(value)));
        }
        self
    }

    /// Append a bare `--name`.
    pub fn switch(&mut self, name: &str) -> &mut Self {
        self.tokens.push(format!("--{}", name));
        self
    }

    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Space-joined command line
    pub fn command_line(&self) -> String {
        self.tokens.join(" ")
    }

    fn push_step(&mut self, step: &Step, value: &str) {
        let name = step.flag_name();
        match step.flag_style {
            FlagStyle::Value => {
                self.flag(name, value);
            }
            FlagStyle::Quoted => {
                self.quoted_flag(name, value);
            }
            FlagStyle::Presence => {
                if value == "true" {
                    self.switch(name);
                }
            }
            FlagStyle::Hidden => {}
        }
    }
}

impl fmt::Display for ArgumentVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Build a command line from `base` followed by one flag per answered step,
/// in step declaration order.
pub fn build<S: AsRef<str>>(base: &[S], answers: &Answers, steps: &[Step]) -> ArgumentVector {
    let mut args = ArgumentVector::new(base.iter().map(|token| token.as_ref().to_string()));

    for step in steps {
        if let Some(value) = answers.get(&step.key) {
            args.push_step(step, value);
        }
    }

    args
}

/// Wrap `value` in double quotes when it contains whitespace or a character
/// the shell would otherwise interpret.
pub fn quote_value(value: &str) -> Cow<'_, str> {
    if value.chars().any(needs_quotes) {
        Cow::Owned(force_quotes(value))
    } else {
        Cow::Borrowed(value)
    }
}

/// Double-quote `value`, escaping what stays special inside double quotes.
fn force_quotes(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn needs_quotes(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | '$' | '`')
}
