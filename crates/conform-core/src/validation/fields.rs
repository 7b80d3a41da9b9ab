//! Map-field matching
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use super::context::ValidationContext;
use super::engine::Engine;
use crate::error::{Message, ValidationError};
use crate::schema::{KeySpec, MapSchema};
use crate::value::{Key, Map};

/// Validate map or struct entries against a map-schema
///
/// Missing required keys come first as one error, then undeclared keys (only
/// without a catch-all entry), then each present declared key in declaration
/// order, then the keys handled by the catch-all entry.
pub(super) fn validate_fields(
    engine: &Engine<'_>,
    entries: &Map,
    schema: &MapSchema,
    ctx: &ValidationContext,
) -> Vec<ValidationError> {
    let stop_early = engine.stop_early();
    let mut errors = Vec::new();

    let missing: Vec<&Key> = schema
        .required_keys()
        .filter(|key| !entries.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        errors.push(key_list_error("missing required fields: %{fields}", &missing, ctx));
        if stop_early {
            return errors;
        }
    }

    let any_other = schema.any_other_schema();
    if any_other.is_none() {
        let unexpected: Vec<&Key> = entries.keys().filter(|key| !schema.declares(key)).collect();
        if !unexpected.is_empty() {
            errors.push(key_list_error("unexpected fields: %{fields}", &unexpected, ctx));
            if stop_early {
                return errors;
            }
        }
    }

    for (spec, field_schema) in schema.entries() {
        let (key, optional) = match spec {
            KeySpec::Required(key) => (key, false),
            KeySpec::Optional(key) => (key, true),
            KeySpec::AnyOther => continue,
        };
        let Some(field_value) = entries.get(key) else {
            continue;
        };

        let child = ctx.child(key.clone()).with_null_allowed(optional);
        let field_errors = engine.validate(field_value, field_schema, &child);
        let failed = !field_errors.is_empty();
        errors.extend(field_errors);
        if failed && stop_early {
            return errors;
        }
    }

    if let Some(any_schema) = any_other {
        for (key, field_value) in entries.iter().filter(|(key, _)| !schema.declares(key)) {
            let field_errors = engine.validate(field_value, any_schema, &ctx.child(key.clone()));
            let failed = !field_errors.is_empty();
            errors.extend(field_errors);
            if failed && stop_early {
                return errors;
            }
        }
    }

    errors
}

fn key_list_error(template: &str, keys: &[&Key], ctx: &ValidationContext) -> ValidationError {
    let names = keys
        .iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    ValidationError::new(Message::template(template, [("fields", names)]), ctx.path.clone())
}
