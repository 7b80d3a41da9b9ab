//! Union resolution
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use super::context::ValidationContext;
use super::engine::Engine;
use crate::error::{Message, ValidationError};
use crate::schema::Schema;
use crate::types::{self, TypeTag};
use crate::value::Value;

/// Validate against each member in turn; the first clean member wins
///
/// When every member fails and exactly one member declares a type the value
/// has, that member's errors are reported. Otherwise a single error lists
/// the declared types of all members.
pub(super) fn validate_union(
    engine: &Engine<'_>,
    value: &Value,
    members: &[Schema],
    ctx: &ValidationContext,
) -> Vec<ValidationError> {
    let members = Schema::flatten_members(members);
    let mut attempts = Vec::with_capacity(members.len());

    for member in &members {
        let errors = engine.validate(value, member, ctx);
        if errors.is_empty() {
            return errors;
        }
        attempts.push((member_type(member, value), errors));
    }

    let mut matching = attempts
        .iter()
        .filter(|(declared, _)| declared.is_some_and(|tag| types::matches_type(value, tag)));
    if let (Some((_, errors)), None) = (matching.next(), matching.next()) {
        return errors.clone();
    }

    let mut names: Vec<String> = Vec::new();
    for (declared, _) in &attempts {
        let name = match declared {
            Some(tag) => format!("`{}`", tag),
            None => "`?`".to_string(),
        };
        if !names.contains(&name) {
            names.push(name);
        }
    }
    let names = names.join(", ");
    vec![ValidationError::new(
        Message::template(
            "expected one of %{types}, got %{value}",
            [("types", Value::from(names)), ("value", Value::String(value.to_string()))],
        ),
        ctx.path.clone(),
    )]
}

/// Declared type of a member as seen by `value`
fn member_type(member: &Schema, value: &Value) -> Option<TypeTag> {
    match member {
        Schema::Node(node) => Some(node.declared_type),
        Schema::Thunk(thunk) => member_type(&thunk.resolve(), value),
        Schema::Selector(selector) => selector
            .select(value)
            .and_then(|selected| member_type(&selected, value)),
        Schema::Union(_) => None,
    }
}
