//! Validation error types, grouping and message templating
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use crate::path::Path;
use crate::value::Value;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Named values substituted into a message template
pub type Bindings = BTreeMap<String, Value>;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"%\{(\w+)\}").expect("Valid regex pattern"))
}

/// Render a template, replacing each `%{name}` with its binding
///
/// Placeholders without a binding are replaced by their bare name.
pub fn render_template(template: &str, bindings: &Bindings) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            bindings
                .get(name)
                .map(Value::to_plain_string)
                .unwrap_or_else(|| name.to_string())
        })
        .into_owned()
}

/// Message carried by a validation error
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Plain text
    Text(String),
    /// Template rendered lazily against its bindings
    Template { template: String, bindings: Bindings },
    /// Several messages reported at the same path
    List(Vec<Message>),
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text(text.into())
    }

    /// Create a template message from name/value pairs
    pub fn template<I, K, V>(template: impl Into<String>, bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Message::Template {
            template: template.into(),
            bindings: bindings
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Render to a single line; grouped messages are joined with `; `
    pub fn render(&self) -> String {
        self.rendered_parts().join("; ")
    }

    /// Render each message of a group separately
    pub fn rendered_parts(&self) -> Vec<String> {
        match self {
            Message::Text(text) => vec![text.clone()],
            Message::Template { template, bindings } => vec![render_template(template, bindings)],
            Message::List(messages) => messages.iter().flat_map(Message::rendered_parts).collect(),
        }
    }

    fn into_parts(self) -> Vec<Message> {
        match self {
            Message::List(messages) => messages.into_iter().flat_map(Message::into_parts).collect(),
            other => vec![other],
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Message::List(_) => self.rendered_parts().serialize(serializer),
            _ => serializer.serialize_str(&self.render()),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

/// A single validation failure located by its path
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub struct ValidationError {
    /// Location of the offending value
    pub path: Path,
    /// What went wrong
    pub message: Message,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation error at '{}': {}", self.path, self.message)
    }
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(message: impl Into<Message>, path: Path) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// Rendered message text
    pub fn render(&self) -> String {
        self.message.render()
    }

    /// Move this error below `parent`
    pub fn prefixed(mut self, parent: &Path) -> Self {
        self.path = self.path.prefixed(parent);
        self
    }
}

/// Merge errors reported at the same path into one error per path
///
/// Paths keep the order of their first appearance and messages keep their
/// original order. A path with a single message keeps it unwrapped.
pub fn group_by_path(errors: Vec<ValidationError>) -> Vec<ValidationError> {
    let mut order: Vec<Path> = Vec::new();
    let mut groups: HashMap<Path, Vec<Message>> = HashMap::new();

    for error in errors {
        let messages = groups.entry(error.path.clone()).or_insert_with(|| {
            order.push(error.path.clone());
            Vec::new()
        });
        messages.extend(error.message.into_parts());
    }

    order
        .into_iter()
        .filter_map(|path| {
            let mut messages = groups.remove(&path)?;
            let message = if messages.len() == 1 {
                messages.remove(0)
            } else {
                Message::List(messages)
            };
            Some(ValidationError { path, message })
        })
        .collect()
}

/// Ordered collection of validation errors
#[derive(Debug, Clone, Default, PartialEq, Error, Serialize)]
pub struct ValidationErrors {
    /// List of validation errors
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s):", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl ValidationErrors {
    /// Create a new validation errors collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add several errors, keeping their order
    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Convert to result - Ok if no errors, Err if any errors exist
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Fatal errors raised instead of an error list
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The schema itself failed the meta-schema check
    #[error("invalid schema: {errors}")]
    InvalidSchema { errors: ValidationErrors },
}

impl SchemaError {
    /// The meta-schema errors describing what is wrong with the schema
    pub fn errors(&self) -> &ValidationErrors {
        match self {
            SchemaError::InvalidSchema { errors } => errors,
        }
    }
}
