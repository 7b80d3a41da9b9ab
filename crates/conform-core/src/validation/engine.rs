//! Recursive validation of a value against a schema
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use super::context::ValidationContext;
use super::{fields, union, ValidationOptions};
use crate::error::{Message, ValidationError};
use crate::path::Path;
use crate::rule;
use crate::schema::{CastSource, Node, Schema, Variant};
use crate::types::{self, TypeTag};
use crate::value::Value;
use std::borrow::Cow;

pub(super) const NULL_MESSAGE: &str = "value cannot be null";
pub(super) const NO_SCHEMA_MESSAGE: &str = "value does not match any of the possible schemas";

pub(super) struct Engine<'a> {
    options: &'a ValidationOptions,
}

impl<'a> Engine<'a> {
    pub(super) fn new(options: &'a ValidationOptions) -> Self {
        Self { options }
    }

    pub(super) fn stop_early(&self) -> bool {
        self.options.stop_early
    }

    pub(super) fn validate(
        &self,
        value: &Value,
        schema: &Schema,
        ctx: &ValidationContext,
    ) -> Vec<ValidationError> {
        match schema {
            Schema::Node(node) => self.validate_node(value, node, ctx),
            Schema::Thunk(thunk) => self.validate(value, &thunk.resolve(), ctx),
            Schema::Selector(selector) => match selector.select(value) {
                Some(selected) => self.validate(value, &selected, ctx),
                None if value.is_null() && ctx.null_allowed => Vec::new(),
                None => {
                    tracing::debug!(
                        selector = selector.name(),
                        path = %ctx.path,
                        "selector found no schema"
                    );
                    vec![ValidationError::new(NO_SCHEMA_MESSAGE, ctx.path.clone())]
                }
            },
            Schema::Union(members) => union::validate_union(self, value, members, ctx),
        }
    }

    fn validate_node(
        &self,
        value: &Value,
        node: &Node,
        ctx: &ValidationContext,
    ) -> Vec<ValidationError> {
        let errors = self.node_errors(value, node, ctx);
        match &node.on_error {
            Some(message) => replace_own_errors(errors, message, &ctx.path),
            None => errors,
        }
    }

    fn node_errors(
        &self,
        value: &Value,
        node: &Node,
        ctx: &ValidationContext,
    ) -> Vec<ValidationError> {
        if value.is_null() {
            return if node.nullable.resolve(ctx.null_allowed, node.declared_type) {
                Vec::new()
            } else {
                vec![ValidationError::new(NULL_MESSAGE, ctx.path.clone())]
            };
        }

        let value = match resolve_type(value, node, &ctx.path) {
            Ok(value) => value,
            Err(error) => return vec![error],
        };

        let stop_early = self.stop_early();
        let mut errors = rule::evaluate_all(&node.checks, &value, &ctx.path, stop_early);
        if stop_early && !errors.is_empty() {
            return errors;
        }

        errors.extend(self.validate_variant(&value, &node.variant, ctx));

        if errors.is_empty() {
            errors = rule::evaluate_all(&node.late_checks, &value, &ctx.path, stop_early);
        }
        errors
    }

    fn validate_variant(
        &self,
        value: &Value,
        variant: &Variant,
        ctx: &ValidationContext,
    ) -> Vec<ValidationError> {
        match variant {
            Variant::Scalar(None) => Vec::new(),
            Variant::Scalar(Some(map_schema)) => match value {
                Value::Map(entries) => fields::validate_fields(self, entries, map_schema, ctx),
                Value::Struct(record) => {
                    fields::validate_fields(self, &record.fields, map_schema, ctx)
                }
                other => vec![type_error(TypeTag::Map, other, &ctx.path)],
            },
            Variant::Struct { name, fields: map_schema } => match value {
                Value::Struct(record) if record.name == *name => match map_schema {
                    Some(map_schema) => {
                        fields::validate_fields(self, &record.fields, map_schema, ctx)
                    }
                    None => Vec::new(),
                },
                Value::Struct(record) => vec![ValidationError::new(
                    Message::template(
                        "expected struct `%{expected}`, got `%{actual}`",
                        [("expected", name.as_str()), ("actual", record.name.as_str())],
                    ),
                    ctx.path.clone(),
                )],
                other => vec![ValidationError::new(
                    Message::template(
                        "expected struct `%{expected}`, got %{value}",
                        [("expected", Value::from(name.as_str())), ("value", inspect(other))],
                    ),
                    ctx.path.clone(),
                )],
            },
            Variant::Sequence(item) => match value {
                Value::List(items) => self.validate_items(items, |_| item, ctx),
                other => vec![type_error(TypeTag::List, other, &ctx.path)],
            },
            Variant::Tuple(elements) => match value {
                Value::Tuple(items) if items.len() != elements.len() => vec![ValidationError::new(
                    Message::template(
                        "expected a tuple of size %{expected}, got size %{actual}",
                        [("expected", elements.len() as i64), ("actual", items.len() as i64)],
                    ),
                    ctx.path.clone(),
                )],
                Value::Tuple(items) => self.validate_items(items, |index| &elements[index], ctx),
                other => vec![type_error(TypeTag::Tuple, other, &ctx.path)],
            },
            Variant::Literal(expected) if value == expected => Vec::new(),
            Variant::Literal(expected) => vec![ValidationError::new(
                Message::template(
                    "expected literal value %{expected}, got %{value}",
                    [("expected", inspect(expected)), ("value", inspect(value))],
                ),
                ctx.path.clone(),
            )],
        }
    }

    /// Validate list or tuple items in order, each at its own index
    fn validate_items<'s, F>(
        &self,
        items: &[Value],
        schema_at: F,
        ctx: &ValidationContext,
    ) -> Vec<ValidationError>
    where
        F: Fn(usize) -> &'s Schema,
    {
        let mut errors = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let item_errors = self.validate(item, schema_at(index), &ctx.child_index(index));
            let failed = !item_errors.is_empty();
            errors.extend(item_errors);
            if failed && self.stop_early() {
                break;
            }
        }
        errors
    }
}

/// Apply the node's declared type, casting when a source type matches
fn resolve_type<'v>(
    value: &'v Value,
    node: &Node,
    path: &Path,
) -> Result<Cow<'v, Value>, ValidationError> {
    if types::matches_type(value, node.declared_type) {
        return Ok(Cow::Borrowed(value));
    }

    let source = node
        .cast_from
        .iter()
        .find(|source| types::matches_type(value, source.from_type()));

    match source {
        Some(CastSource::Builtin(from)) => types::cast(value, *from, node.declared_type)
            .map(Cow::Owned)
            .map_err(|error| {
                tracing::debug!(path = %path, from = %error.from, to = %error.to, "cast failed");
                ValidationError::new(error.to_string(), path.clone())
            }),
        Some(CastSource::Custom { name, convert, .. }) => {
            convert(value).map(Cow::Owned).map_err(|message| {
                tracing::debug!(path = %path, converter = %name, "conversion failed");
                ValidationError::new(message, path.clone())
            })
        }
        None if matches!(node.variant, Variant::Literal(_)) => Ok(Cow::Borrowed(value)),
        None => Err(type_error(node.declared_type, value, path)),
    }
}

fn type_error(expected: TypeTag, value: &Value, path: &Path) -> ValidationError {
    ValidationError::new(
        Message::template(
            "expected type `%{expected}`, got %{value}",
            [("expected", expected.to_value()), ("value", inspect(value))],
        ),
        path.clone(),
    )
}

/// Inspect form of a value, bound into templates so strings keep their quotes
fn inspect(value: &Value) -> Value {
    Value::String(value.to_string())
}

/// Replace the errors reported at `path` itself by one override error
///
/// The override takes the position of the first replaced error; errors at
/// descendant paths are kept as they are.
fn replace_own_errors(
    errors: Vec<ValidationError>,
    message: &str,
    path: &Path,
) -> Vec<ValidationError> {
    if !errors.iter().any(|error| !error.path.is_descendant_of(path)) {
        return errors;
    }

    let mut replaced = false;
    let mut result = Vec::with_capacity(errors.len());
    for error in errors {
        if error.path.is_descendant_of(path) {
            result.push(error);
        } else if !replaced {
            result.push(ValidationError::new(message, path.clone()));
            replaced = true;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_own_errors_keeps_descendants() {
        let root = Path::root();
        let errors = vec![
            ValidationError::new("child", root.child("a")),
            ValidationError::new("own 1", root.clone()),
            ValidationError::new("own 2", root.clone()),
        ];
        let replaced = replace_own_errors(errors, "override", &root);
        assert_eq!(replaced.len(), 2);
        assert_eq!(replaced[0].render(), "child");
        assert_eq!(replaced[1].render(), "override");
    }

    #[test]
    fn test_replace_own_errors_without_own_errors() {
        let errors = vec![ValidationError::new("child", Path::root().child_index(0))];
        assert_eq!(replace_own_errors(errors.clone(), "override", &Path::root()), errors);
    }

    #[test]
    fn test_literal_skips_type_mismatch() {
        let node = Node::literal("on");
        let value = Value::Integer(1);
        let resolved = resolve_type(&value, &node, &Path::root()).unwrap();
        assert_eq!(resolved.as_ref(), &value);
    }

    #[test]
    fn test_first_matching_cast_source_wins() {
        let node = Node::scalar(TypeTag::Integer)
            .with_converter(TypeTag::String, "length", |v| {
                Ok(Value::Integer(v.len().unwrap_or(0) as i64))
            })
            .with_cast_from(TypeTag::String);
        let value = Value::from("12345");
        let resolved = resolve_type(&value, &node, &Path::root()).unwrap();
        assert_eq!(resolved.into_owned(), Value::Integer(5));
    }

    #[test]
    fn test_type_error_message() {
        let error = type_error(TypeTag::Integer, &Value::from("hi"), &Path::root());
        assert_eq!(error.render(), "expected type `integer`, got \"hi\"");
    }
}
