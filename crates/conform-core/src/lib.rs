//! Conform Core - validation engine for nested data
//!
//! This crate validates dynamic values (maps, lists, tuples, structs and
//! scalars) against declarative schemas and reports every problem it finds as
//! a structured error instead of stopping at the first one.
//!
//! # Main Components
//!
//! - **Value model**: the dynamic [`Value`] walked by the engine
//! - **Type registry**: classification of values and casting between types
//! - **Rules**: predicates with messages, including templated messages
//! - **Schema model**: nodes with a common envelope, plus thunks, selectors and unions
//! - **Validation engine**: recursive matching with grouping and early stopping
//! - **Meta-schema**: a schema that checks schemas themselves
//!
//! # Example
//!
//! ```rust
//! use conform_core::{validate_value, MapSchema, Node, Rule, Schema, TypeTag, Value};
//!
//! let age = Node::scalar(TypeTag::Integer)
//!     .with_cast_from(TypeTag::String)
//!     .with_check(
//!         Rule::check("max", |v| v.as_i64().is_some_and(|n| n <= 150))
//!             .with_template("must be ≤ %{max}", [("max", 150)]),
//!     );
//! let schema = Schema::from(MapSchema::new().required("age", age));
//!
//! let errors = validate_value(&Value::map([("age", "200")]), &schema);
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors[0].to_string(), "Validation error at '$.age': must be ≤ 150");
//! ```
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod meta;
pub mod path;
pub mod rule;
pub mod schema;
pub mod types;
pub mod validation;
pub mod value;

// Re-export main types for convenience
pub use error::{
    group_by_path, render_template, Bindings, Message, SchemaError, ValidationError,
    ValidationErrors,
};
pub use meta::meta_schema;
pub use path::{Path, PathSegment};
pub use rule::{Outcome, Rule, RuleError, RuleMessage};
pub use schema::{CastSource, KeySpec, MapSchema, Node, Nullable, Schema, Variant};
pub use types::{cast, classify, matches_type, CastError, TypeTag};
pub use validation::{
    check_schema, validate, validate_value, ValidationContext, ValidationOptions,
    ValidationResult, Validator,
};
pub use value::{Function, Key, Map, Struct, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
