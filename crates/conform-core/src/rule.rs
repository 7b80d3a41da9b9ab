//! Rules: reusable checks made of a predicate and a failure message
//!
//! A predicate returns an [`Outcome`] or a [`RuleError`]. Rule errors are
//! contained here and turned into one generic validation error, so a broken
//! rule never aborts the rest of a validation run.
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use crate::error::{Bindings, Message, ValidationError};
use crate::path::Path;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Message used when a failing rule has no message of its own
pub const GENERIC_MESSAGE: &str = "is invalid";

/// Message reported when a predicate or message function fails
pub const RULE_FAILURE_MESSAGE: &str = "an exception was raised while evaluating a rule";

/// Failure while evaluating a rule, as opposed to the rule rejecting a value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("rule evaluation failed: {message}")]
pub struct RuleError {
    pub message: String,
}

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for RuleError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for RuleError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Result of running a predicate against a value
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass,
    /// Rejected; the rule's own message is used
    Fail,
    /// Rejected with a message that overrides the rule's message
    FailWith(Message),
}

impl From<bool> for Outcome {
    fn from(passed: bool) -> Self {
        if passed {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }
}

pub type Predicate = Arc<dyn Fn(&Value) -> Result<Outcome, RuleError> + Send + Sync>;
pub type ValueMessageFn = Arc<dyn Fn(&Value) -> Result<Message, RuleError> + Send + Sync>;
pub type PathMessageFn = Arc<dyn Fn(&Value, &Path) -> Result<Message, RuleError> + Send + Sync>;

/// Source of the message reported when a rule fails
#[derive(Clone)]
pub enum RuleMessage {
    Text(String),
    Template { template: String, bindings: Bindings },
    FromValue(ValueMessageFn),
    FromValueAndPath(PathMessageFn),
}

impl RuleMessage {
    fn resolve(&self, value: &Value, path: &Path) -> Result<Message, RuleError> {
        match self {
            RuleMessage::Text(text) => Ok(Message::Text(text.clone())),
            RuleMessage::Template { template, bindings } => Ok(Message::Template {
                template: template.clone(),
                bindings: bindings.clone(),
            }),
            RuleMessage::FromValue(f) => f(value),
            RuleMessage::FromValueAndPath(f) => f(value, path),
        }
    }

    /// Number of arguments the message function takes, if it is one
    pub fn arity(&self) -> Option<u8> {
        match self {
            RuleMessage::Text(_) | RuleMessage::Template { .. } => None,
            RuleMessage::FromValue(_) => Some(1),
            RuleMessage::FromValueAndPath(_) => Some(2),
        }
    }
}

impl PartialEq for RuleMessage {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RuleMessage::Text(a), RuleMessage::Text(b)) => a == b,
            (
                RuleMessage::Template { template: t1, bindings: b1 },
                RuleMessage::Template { template: t2, bindings: b2 },
            ) => t1 == t2 && b1 == b2,
            // Functions compare by identity
            (RuleMessage::FromValue(a), RuleMessage::FromValue(b)) => Arc::ptr_eq(a, b),
            (RuleMessage::FromValueAndPath(a), RuleMessage::FromValueAndPath(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for RuleMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleMessage::Text(text) => f.debug_tuple("Text").field(text).finish(),
            RuleMessage::Template { template, bindings } => f
                .debug_struct("Template")
                .field("template", template)
                .field("bindings", bindings)
                .finish(),
            RuleMessage::FromValue(_) => write!(f, "FromValue(<fn/1>)"),
            RuleMessage::FromValueAndPath(_) => write!(f, "FromValueAndPath(<fn/2>)"),
        }
    }
}

/// A named predicate with an optional failure message
#[derive(Clone)]
pub struct Rule {
    name: String,
    predicate: Predicate,
    message: Option<RuleMessage>,
}

impl Rule {
    /// Create a rule from a fallible predicate
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> Result<Outcome, RuleError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            message: None,
        }
    }

    /// Create a rule from an infallible boolean predicate
    pub fn check<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(name, move |value| Ok(Outcome::from(predicate(value))))
    }

    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        self.message = Some(RuleMessage::Text(text.into()));
        self
    }

    /// Use a `%{name}` template as the failure message
    pub fn with_template<I, K, V>(mut self, template: impl Into<String>, bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.message = Some(RuleMessage::Template {
            template: template.into(),
            bindings: bindings
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        });
        self
    }

    /// Compute the failure message from the rejected value
    pub fn with_message_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Message, RuleError> + Send + Sync + 'static,
    {
        self.message = Some(RuleMessage::FromValue(Arc::new(f)));
        self
    }

    /// Compute the failure message from the rejected value and its path
    pub fn with_path_message_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Path) -> Result<Message, RuleError> + Send + Sync + 'static,
    {
        self.message = Some(RuleMessage::FromValueAndPath(Arc::new(f)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> Option<&RuleMessage> {
        self.message.as_ref()
    }

    /// Run the rule, producing at most one error
    pub fn evaluate(&self, value: &Value, path: &Path) -> Option<ValidationError> {
        let message = match (self.predicate)(value) {
            Ok(Outcome::Pass) => return None,
            Ok(Outcome::FailWith(message)) => Ok(message),
            Ok(Outcome::Fail) => self.failure_message(value, path),
            Err(error) => Err(error),
        };

        match message {
            Ok(message) => Some(ValidationError::new(message, path.clone())),
            Err(error) => {
                tracing::debug!(
                    rule = %self.name,
                    path = %path,
                    error = %error,
                    "rule evaluation failed"
                );
                Some(ValidationError::new(RULE_FAILURE_MESSAGE, path.clone()))
            }
        }
    }

    fn failure_message(&self, value: &Value, path: &Path) -> Result<Message, RuleError> {
        match &self.message {
            Some(message) => message.resolve(value, path),
            None => Ok(Message::text(GENERIC_MESSAGE)),
        }
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && Arc::ptr_eq(&self.predicate, &other.predicate)
            && self.message == other.message
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Run rules in order, collecting their errors
///
/// With `stop_early` set, evaluation ends at the first failing rule.
pub fn evaluate_all(
    rules: &[Rule],
    value: &Value,
    path: &Path,
    stop_early: bool,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for rule in rules {
        if let Some(error) = rule.evaluate(value, path) {
            errors.push(error);
            if stop_early {
                break;
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positive() -> Rule {
        Rule::check("positive", |v| v.as_f64().is_some_and(|n| n > 0.0))
    }

    #[test]
    fn test_pass_produces_nothing() {
        assert!(positive().evaluate(&Value::Integer(3), &Path::root()).is_none());
    }

    #[test]
    fn test_fail_without_message_uses_generic_message() {
        let error = positive().evaluate(&Value::Integer(-3), &Path::root()).unwrap();
        assert_eq!(error.render(), GENERIC_MESSAGE);
    }

    #[test]
    fn test_fail_uses_rule_message() {
        let rule = positive().with_message("must be positive");
        let error = rule.evaluate(&Value::Integer(-3), &Path::root()).unwrap();
        assert_eq!(error.render(), "must be positive");
    }

    #[test]
    fn test_template_message() {
        let rule = Rule::check("max", |v| v.as_i64().is_some_and(|n| n <= 10))
            .with_template("must be ≤ %{max}", [("max", 10)]);
        let error = rule.evaluate(&Value::Integer(15), &Path::root()).unwrap();
        assert_eq!(error.render(), "must be ≤ 10");
    }

    #[test]
    fn test_explicit_message_overrides_rule_message() {
        let rule = Rule::new("explicit", |_| Ok(Outcome::FailWith(Message::text("from predicate"))))
            .with_message("from rule");
        let error = rule.evaluate(&Value::Null, &Path::root()).unwrap();
        assert_eq!(error.render(), "from predicate");
    }

    #[test]
    fn test_message_functions_see_value_and_path() {
        let path = Path::root().child("age");
        let rule = positive().with_message_fn(|v| Ok(Message::text(format!("{} is not positive", v))));
        assert_eq!(rule.evaluate(&Value::Integer(-1), &path).unwrap().render(), "-1 is not positive");

        let rule = positive().with_path_message_fn(|v, p| Ok(Message::text(format!("{} at {}", v, p))));
        assert_eq!(rule.evaluate(&Value::Integer(-1), &path).unwrap().render(), "-1 at $.age");
    }

    #[test]
    fn test_predicate_failure_is_contained() {
        let rule = Rule::new("reads_missing_field", |v| {
            let other = v.field("other")?;
            Ok(Outcome::from(other == v))
        })
        .with_message("never shown");
        let error = rule.evaluate(&Value::map([("a", 1)]), &Path::root().child("a")).unwrap();
        assert_eq!(error.render(), RULE_FAILURE_MESSAGE);
        assert_eq!(error.path, Path::root().child("a"));
    }

    #[test]
    fn test_message_failure_is_contained() {
        let rule = positive().with_message_fn(|_| Err(RuleError::from("boom")));
        let error = rule.evaluate(&Value::Integer(-1), &Path::root()).unwrap();
        assert_eq!(error.render(), RULE_FAILURE_MESSAGE);
    }

    #[test]
    fn test_evaluate_all_respects_stop_early() {
        let rules = vec![
            positive().with_message("first"),
            positive().with_message("second"),
        ];
        let value = Value::Integer(-1);
        assert_eq!(evaluate_all(&rules, &value, &Path::root(), false).len(), 2);

        let errors = evaluate_all(&rules, &value, &Path::root(), true);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].render(), "first");
    }

    #[test]
    fn test_rules_compare_by_identity() {
        let rule = positive();
        assert_eq!(rule, rule.clone());
        assert_ne!(positive(), positive());
    }
}
