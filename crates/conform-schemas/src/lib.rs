//! Conform Schemas - schema builders and batch validation
//!
//! This crate layers a builder API on top of `conform-core`.
//!
//! # Main Components
//!
//! - **Builders**: [`builder`] constructors with constraint options
//! - **Built-in rules**: the rule table behind builder options
//! - **Adapters**: date and time schemas backed by `chrono`
//! - **Batch validation**: [`validate_batch`] over many values with [`ValidationConfig`]
//!
//! # Example
//!
//! ```rust
//! use conform_schemas::builder::{map, number, string};
//! use conform_schemas::{validate_batch, MapSchema, TypeTag, ValidationConfig, Value};
//!
//! let schema = map(
//!     MapSchema::new()
//!         .required("name", string().min_length(1).build().unwrap())
//!         .required("score", number().cast_from(TypeTag::String).max(10).build().unwrap()),
//! )
//! .build()
//! .unwrap();
//!
//! let values = vec![
//!     Value::map([("name", Value::from("ada")), ("score", Value::from("7"))]),
//!     Value::map([("name", Value::from("bob")), ("score", Value::from(12))]),
//! ];
//! let errors = validate_batch(&values, &schema, &ValidationConfig::default()).unwrap_err();
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors.iter().next().unwrap().path.to_string(), "$[1].score");
//! ```
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

pub mod adapters;
pub mod builder;
pub mod built_in;

pub use built_in::{rule_for, BuildError, BuiltIn};
pub use builder::SchemaBuilder;
pub use conform_core::*;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for validating many values at once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Options applied to each value
    pub options: ValidationOptions,
    /// Stop at the first value that fails
    pub fail_fast: bool,
    /// Upper bound on collected errors
    pub max_errors: Option<usize>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            options: ValidationOptions::default(),
            fail_fast: false,
            max_errors: Some(100),
        }
    }
}

impl ValidationConfig {
    /// Check the schema before touching any value
    pub fn strict() -> Self {
        Self {
            options: ValidationOptions::default().with_check_schema_first(true),
            ..Self::default()
        }
    }

    /// Collect everything, grouped per path
    pub fn lenient() -> Self {
        Self {
            options: ValidationOptions::default().with_group_errors(true),
            max_errors: None,
            ..Self::default()
        }
    }

    pub fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    pub fn with_max_errors(mut self, max: usize) -> Self {
        self.max_errors = Some(max);
        self
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Validate a batch of values, locating each error under `[index]`
pub fn validate_batch(
    values: &[Value],
    schema: &Schema,
    config: &ValidationConfig,
) -> Result<(), ValidationErrors> {
    let validator = Validator::new(schema.clone(), config.options)
        .map_err(|e| ValidationErrors::from(ValidationError::new(e.to_string(), Path::root())))?;

    let mut errors = ValidationErrors::new();
    for (i, value) in values.iter().enumerate() {
        let item_path = Path::root().child_index(i);
        let found = validator.collect_errors(value);
        let failed = !found.is_empty();
        for error in found {
            if config.max_errors.is_some_and(|max| errors.len() >= max) {
                break;
            }
            errors.add(error.prefixed(&item_path));
        }

        if failed && config.fail_fast {
            debug!(index = i, "stopping batch at first failing value");
            break;
        }
        if config.max_errors.is_some_and(|max| errors.len() >= max) {
            debug!(index = i, "error limit reached");
            break;
        }
    }

    info!(values = values.len(), errors = errors.len(), "batch validated");
    errors.into_result()
}

/// Validate a JSON document
pub fn validate_json(json: &serde_json::Value, schema: &Schema) -> Result<(), ValidationErrors> {
    ValidationErrors::from(validate_value(&Value::from(json.clone()), schema)).into_result()
}
