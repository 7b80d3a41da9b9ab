//! Validation of values against schemas
//!
//! The engine walks a value and a schema in lockstep and accumulates every
//! problem it finds as a [`ValidationError`]. Only a malformed schema, caught
//! when [`ValidationOptions::check_schema_first`] is set, is reported as a
//! [`SchemaError`] instead.
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

pub mod context;
mod engine;
mod fields;
mod union;

pub use context::ValidationContext;

use crate::error::{group_by_path, SchemaError, ValidationError, ValidationErrors};
use crate::meta;
use crate::schema::Schema;
use crate::value::Value;
use engine::Engine;
use serde::{Deserialize, Serialize};

/// Result of a validation that fails with every error found
pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// Options controlling a validation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Validate the schema against the meta-schema before the value
    pub check_schema_first: bool,
    /// Stop at the first error of each node
    pub stop_early: bool,
    /// Merge errors sharing a path into one error per path
    pub group_errors: bool,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_check_schema_first(mut self, check_schema_first: bool) -> Self {
        self.check_schema_first = check_schema_first;
        self
    }

    pub fn with_stop_early(mut self, stop_early: bool) -> Self {
        self.stop_early = stop_early;
        self
    }

    pub fn with_group_errors(mut self, group_errors: bool) -> Self {
        self.group_errors = group_errors;
        self
    }
}

/// Validate `value` against `schema`, returning every error found
///
/// # Examples
///
/// ```rust
/// use conform_core::{validate, MapSchema, Node, Schema, TypeTag, ValidationOptions, Value};
///
/// let schema = Schema::from(
///     MapSchema::new()
///         .required("name", Node::scalar(TypeTag::String))
///         .optional("age", Node::scalar(TypeTag::Integer)),
/// );
/// let value = Value::map([("name", Value::from("ada")), ("age", Value::Null)]);
///
/// let errors = validate(&value, &schema, &ValidationOptions::default()).unwrap();
/// assert!(errors.is_empty());
/// ```
pub fn validate(
    value: &Value,
    schema: &Schema,
    options: &ValidationOptions,
) -> Result<Vec<ValidationError>, SchemaError> {
    if options.check_schema_first {
        check_schema(schema)?;
    }
    Ok(run(value, schema, options))
}

/// Validate with default options; this form cannot fail on the schema
pub fn validate_value(value: &Value, schema: &Schema) -> Vec<ValidationError> {
    run(value, schema, &ValidationOptions::default())
}

/// Check that a schema is well formed by validating its description
pub fn check_schema(schema: &Schema) -> Result<(), SchemaError> {
    let errors = run(&schema.describe(), &meta::meta_schema(), &ValidationOptions::default());
    if errors.is_empty() {
        Ok(())
    } else {
        tracing::warn!(errors = errors.len(), "schema failed the meta-schema check");
        Err(SchemaError::InvalidSchema {
            errors: ValidationErrors::from(errors),
        })
    }
}

fn run(value: &Value, schema: &Schema, options: &ValidationOptions) -> Vec<ValidationError> {
    tracing::trace!(
        stop_early = options.stop_early,
        group_errors = options.group_errors,
        "validating value"
    );
    let errors = Engine::new(options).validate(value, schema, &ValidationContext::root());
    if options.group_errors {
        group_by_path(errors)
    } else {
        errors
    }
}

/// A schema paired with options, checked once and reused for many values
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Schema,
    options: ValidationOptions,
}

impl Validator {
    /// Create a validator, checking the schema when the options ask for it
    pub fn new(schema: impl Into<Schema>, options: ValidationOptions) -> Result<Self, SchemaError> {
        let schema = schema.into();
        if options.check_schema_first {
            check_schema(&schema)?;
        }
        Ok(Self { schema, options })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Collect all validation errors (non-failing)
    pub fn collect_errors(&self, value: &Value) -> Vec<ValidationError> {
        run(value, &self.schema, &self.options)
    }

    /// Ok if the value is valid, otherwise every error found
    pub fn validate(&self, value: &Value) -> ValidationResult<()> {
        ValidationErrors::from(self.collect_errors(value)).into_result()
    }
}
