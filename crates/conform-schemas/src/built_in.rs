//! Built-in rules for common constraints
//!
//! Builders record constraint options; [`rule_for`] turns each option into a
//! rule for the node's declared type, or refuses when the option does not
//! apply to that type.
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use conform_core::{Rule, TypeTag, Value};
use regex::Regex;
use thiserror::Error;

/// Errors raised while building a schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("option `{option}` does not apply to type `{declared}`")]
    Unsupported {
        option: &'static str,
        declared: TypeTag,
    },

    #[error("option `{option}` expects {expected}")]
    InvalidArgument {
        option: &'static str,
        expected: &'static str,
    },

    #[error("invalid pattern for `format`: {0}")]
    InvalidPattern(String),
}

/// A constraint option recorded by a builder
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltIn {
    Min(Value),
    Max(Value),
    Between(Value, Value),
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
    Format(String),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Unique,
    NonEmpty,
}

impl BuiltIn {
    /// Option name, also used as the rule name
    pub fn name(&self) -> &'static str {
        match self {
            BuiltIn::Min(_) => "min",
            BuiltIn::Max(_) => "max",
            BuiltIn::Between(_, _) => "between",
            BuiltIn::MinLength(_) => "min_length",
            BuiltIn::MaxLength(_) => "max_length",
            BuiltIn::Length(_) => "length",
            BuiltIn::Format(_) => "format",
            BuiltIn::In(_) => "in",
            BuiltIn::NotIn(_) => "not_in",
            BuiltIn::Unique => "unique",
            BuiltIn::NonEmpty => "non_empty",
        }
    }

    fn applies_to(&self, declared: TypeTag) -> bool {
        use TypeTag::*;
        match self {
            BuiltIn::Min(_) | BuiltIn::Max(_) | BuiltIn::Between(_, _) => {
                matches!(declared, Number | Integer | Float)
            }
            BuiltIn::MinLength(_) | BuiltIn::MaxLength(_) | BuiltIn::Length(_) => {
                matches!(declared, String | List | Tuple | Map)
            }
            BuiltIn::Format(_) => declared == String,
            BuiltIn::In(_) | BuiltIn::NotIn(_) => true,
            BuiltIn::Unique => declared == List,
            BuiltIn::NonEmpty => matches!(declared, String | List | Map),
        }
    }
}

/// Look up the rule implementing `option` for values of type `declared`
pub fn rule_for(option: &BuiltIn, declared: TypeTag) -> Result<Rule, BuildError> {
    let name = option.name();
    if !option.applies_to(declared) {
        return Err(BuildError::Unsupported {
            option: name,
            declared,
        });
    }

    let rule = match option {
        BuiltIn::Min(min) => {
            let bound = numeric(name, min)?;
            Rule::check(name, move |v| v.as_f64().is_some_and(|n| n >= bound))
                .with_template("must be ≥ %{min}", [("min", min.clone())])
        }
        BuiltIn::Max(max) => {
            let bound = numeric(name, max)?;
            Rule::check(name, move |v| v.as_f64().is_some_and(|n| n <= bound))
                .with_template("must be ≤ %{max}", [("max", max.clone())])
        }
        BuiltIn::Between(min, max) => {
            let (low, high) = (numeric(name, min)?, numeric(name, max)?);
            if low > high {
                return Err(BuildError::InvalidArgument {
                    option: name,
                    expected: "a lower bound not above the upper bound",
                });
            }
            Rule::check(name, move |v| v.as_f64().is_some_and(|n| n >= low && n <= high))
                .with_template(
                    "must be between %{min} and %{max}",
                    [("min", min.clone()), ("max", max.clone())],
                )
        }
        BuiltIn::MinLength(min) => {
            let min = *min;
            Rule::check(name, move |v| v.len().is_some_and(|n| n >= min))
                .with_template("length must be ≥ %{min}", [("min", min as i64)])
        }
        BuiltIn::MaxLength(max) => {
            let max = *max;
            Rule::check(name, move |v| v.len().is_some_and(|n| n <= max))
                .with_template("length must be ≤ %{max}", [("max", max as i64)])
        }
        BuiltIn::Length(length) => {
            let length = *length;
            Rule::check(name, move |v| v.len() == Some(length))
                .with_template("length must be %{length}", [("length", length as i64)])
        }
        BuiltIn::Format(pattern) => {
            let regex = Regex::new(pattern).map_err(|e| BuildError::InvalidPattern(e.to_string()))?;
            Rule::check(name, move |v| v.as_str().is_some_and(|s| regex.is_match(s)))
                .with_template("must match the pattern %{pattern}", [("pattern", pattern.as_str())])
        }
        BuiltIn::In(values) => {
            let allowed = values.clone();
            Rule::check(name, move |v| allowed.contains(v))
                .with_template("must be one of %{values}", [("values", inspect_all(values))])
        }
        BuiltIn::NotIn(values) => {
            let forbidden = values.clone();
            Rule::check(name, move |v| !forbidden.contains(v))
                .with_template("must not be one of %{values}", [("values", inspect_all(values))])
        }
        BuiltIn::Unique => Rule::check(name, |v| {
            v.as_list().is_some_and(|items| {
                items
                    .iter()
                    .enumerate()
                    .all(|(i, item)| !items[..i].contains(item))
            })
        })
        .with_message("items must be unique"),
        BuiltIn::NonEmpty => {
            Rule::check(name, |v| v.len().is_some_and(|n| n > 0)).with_message("must not be empty")
        }
    };

    Ok(rule)
}

fn numeric(option: &'static str, bound: &Value) -> Result<f64, BuildError> {
    bound.as_f64().ok_or(BuildError::InvalidArgument {
        option,
        expected: "a numeric bound",
    })
}

fn inspect_all(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
