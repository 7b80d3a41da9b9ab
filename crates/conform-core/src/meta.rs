//! The meta-schema: a schema for schema descriptions
//!
//! [`meta_schema`] dispatches on the shape of a description (see
//! [`Schema::describe`]) and checks every envelope field recursively. Late
//! checks on node records tie the payload entries and the declared type to
//! the variant kind. The meta-schema is written with the same schema model it
//! validates, so its own building blocks must validate cleanly against it.
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use crate::error::Message;
use crate::rule::{Outcome, Rule, RuleError};
use crate::schema::describe::{
    ANY_OTHER_KEY, MAP_SCHEMA_RECORD, NODE_RECORD, NULLABLE_DEFAULT, RULE_RECORD, UNION_RECORD,
};
use crate::schema::{MapSchema, Node, Schema};
use crate::types::{self, TypeTag};
use crate::value::Value;

const KINDS: &[&str] = &["scalar", "struct", "sequence", "tuple", "literal"];
const PAYLOAD_KEYS: &[&str] = &["fields", "name", "item", "elements", "value"];

/// Schema validating any schema description
pub fn meta_schema() -> Schema {
    Schema::select("schema_shape", select_shape)
}

fn select_shape(description: &Value) -> Option<Schema> {
    let schema = match description {
        Value::Struct(record) => match record.name.as_str() {
            NODE_RECORD => node_record_schema(),
            UNION_RECORD => union_record_schema(),
            MAP_SCHEMA_RECORD => map_schema_record_schema(),
            _ => return None,
        },
        Value::List(_) => list_shortcut_schema(),
        Value::Tuple(_) => tuple_shortcut_schema(),
        Value::Function(_) => function_schema("deferred_schema", &[0, 1]).into_schema(),
        Value::Map(_) => compact_map_schema(),
        _ => literal_schema(),
    };
    Some(schema)
}

/// The schemas the meta-schema is assembled from, by name
pub fn building_blocks() -> Vec<(&'static str, Schema)> {
    vec![
        ("meta_schema", meta_schema()),
        ("node_record", node_record_schema()),
        ("union_record", union_record_schema()),
        ("map_schema_record", map_schema_record_schema()),
        ("list_shortcut", list_shortcut_schema()),
        ("tuple_shortcut", tuple_shortcut_schema()),
        ("compact_map", compact_map_schema()),
        ("literal", literal_schema()),
        ("rule", rule_schema()),
        ("message", message_schema()),
        ("cast_source", cast_source_schema()),
        ("key_spec", key_spec_schema()),
        ("type_tag", type_tag_schema(true).into_schema()),
    ]
}

fn nested() -> Schema {
    Schema::lazy("meta_schema", meta_schema)
}

/// Full node record: the envelope, the kind and its payload
pub fn node_record_schema() -> Schema {
    let fields = MapSchema::new()
        .required("type", type_tag_schema(true))
        .required("checks", Node::sequence(rule_schema()))
        .required("late_checks", Node::sequence(rule_schema()))
        .required("cast_from", Node::sequence(cast_source_schema()))
        .required("nullable", nullable_schema())
        .required("on_error", Node::scalar(TypeTag::String).with_nullable(true))
        .required("kind", symbol_in("variant_kind", KINDS))
        .optional("fields", map_schema_payload())
        .optional("name", Node::scalar(TypeTag::String))
        .optional("item", nested())
        .optional("elements", Node::sequence(nested()))
        .optional("value", Node::scalar(TypeTag::Any));

    Node::structure(NODE_RECORD, Some(fields))
        .with_late_check(Rule::new("payload_matches_kind", payload_matches_kind))
        .with_late_check(Rule::new("type_matches_kind", type_matches_kind))
        .into_schema()
}

pub fn union_record_schema() -> Schema {
    let members = Node::sequence(nested()).with_check(
        Rule::check("non_empty", |v| v.len().is_some_and(|n| n > 0))
            .with_message("a union needs at least one member"),
    );
    Node::structure(UNION_RECORD, Some(MapSchema::new().required("members", members))).into_schema()
}

pub fn map_schema_record_schema() -> Schema {
    let entries = Node::sequence(Node::tuple([key_spec_schema(), nested()])).with_late_check(
        Rule::check("single_any_other", |entries| {
            let any_other = Value::symbol(ANY_OTHER_KEY);
            entries.as_list().map_or(true, |items| {
                items
                    .iter()
                    .filter(|entry| entry.index(0).ok() == Some(&any_other))
                    .count()
                    <= 1
            })
        })
        .with_message("at most one any_other entry is allowed"),
    );
    Node::structure(MAP_SCHEMA_RECORD, Some(MapSchema::new().required("entries", entries)))
        .into_schema()
}

/// `[item]`: a list holding exactly one item schema
fn list_shortcut_schema() -> Schema {
    Node::sequence(nested())
        .with_check(
            Rule::check("single_item_schema", |v| v.len() == Some(1))
                .with_message("a list schema takes exactly one item schema"),
        )
        .into_schema()
}

/// `(a, b, ..)`: element schemas, read as a list
fn tuple_shortcut_schema() -> Schema {
    Node::sequence(nested())
        .with_cast_from(TypeTag::Tuple)
        .into_schema()
}

/// Plain map of field schemas
fn compact_map_schema() -> Schema {
    Node::map(MapSchema::new().any_other(nested())).into_schema()
}

/// Bare scalars are literal schemas
fn literal_schema() -> Schema {
    Node::scalar(TypeTag::Any).with_nullable(true).into_schema()
}

fn map_schema_payload() -> Schema {
    Schema::union([compact_map_schema(), map_schema_record_schema()])
}

fn key_spec_schema() -> Schema {
    let key = Schema::union([
        Node::scalar(TypeTag::String),
        Node::scalar(TypeTag::Symbol),
        Node::scalar(TypeTag::Integer),
    ]);
    Schema::union([
        Node::literal(Value::symbol(ANY_OTHER_KEY)).into_schema(),
        Node::tuple([
            symbol_in("key_requirement", &["required", "optional"]).into_schema(),
            key,
        ])
        .into_schema(),
    ])
}

fn rule_schema() -> Schema {
    let record = MapSchema::new()
        .required("predicate", function_schema("predicate", &[1]))
        .required("message", message_schema());
    Schema::union([
        function_schema("predicate", &[1]).into_schema(),
        Node::structure(RULE_RECORD, Some(record)).into_schema(),
    ])
}

fn message_schema() -> Schema {
    let any_binding = Node::scalar(TypeTag::Any).with_nullable(true);
    let bindings = Node::map(MapSchema::new().any_other(any_binding));
    Schema::union([
        Node::scalar(TypeTag::String),
        Node::tuple([Node::scalar(TypeTag::String), bindings]),
        function_schema("message_function", &[1, 2]),
    ])
}

fn cast_source_schema() -> Schema {
    Schema::union([
        type_tag_schema(false),
        Node::tuple([type_tag_schema(false), function_schema("converter", &[1])]),
    ])
}

fn nullable_schema() -> Schema {
    Schema::union([
        Node::literal(Value::symbol(NULLABLE_DEFAULT)),
        Node::scalar(TypeTag::Boolean),
    ])
}

fn type_tag_schema(allow_any: bool) -> Node {
    Node::scalar(TypeTag::Symbol).with_check(
        Rule::check("known_type", move |v| {
            v.as_symbol()
                .and_then(TypeTag::from_name)
                .is_some_and(|tag| allow_any || tag != TypeTag::Any)
        })
        .with_message_fn(|v| {
            Ok(Message::template("invalid type %{type}", [("type", v.to_string())]))
        }),
    )
}

fn symbol_in(name: &str, allowed: &'static [&'static str]) -> Node {
    Node::scalar(TypeTag::Symbol).with_check(
        Rule::check(name, move |v| v.as_symbol().is_some_and(|s| allowed.contains(&s)))
            .with_template("must be one of %{allowed}", [("allowed", allowed.join(", "))]),
    )
}

fn function_schema(name: &str, arities: &'static [u8]) -> Node {
    let expected = arities
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(" or ");
    Node::scalar(TypeTag::Function).with_check(
        Rule::check(name, move |v| {
            matches!(v, Value::Function(function) if arities.contains(&function.arity))
        })
        .with_template("expected a function of arity %{arity}", [("arity", expected)]),
    )
}

fn record_kind(record: &Value) -> Result<&str, RuleError> {
    record
        .field("kind")?
        .as_symbol()
        .ok_or_else(|| RuleError::new("kind is not a symbol"))
}

fn payload_matches_kind(record: &Value) -> Result<Outcome, RuleError> {
    let kind = record_kind(record)?;
    let (required, allowed): (&[&str], &[&str]) = match kind {
        "scalar" => (&[], &["fields"]),
        "struct" => (&["name"], &["name", "fields"]),
        "sequence" => (&["item"], &["item"]),
        "tuple" => (&["elements"], &["elements"]),
        "literal" => (&["value"], &["value"]),
        _ => return Ok(Outcome::Pass),
    };

    if let Some(key) = required.iter().find(|key| record.get(**key).is_none()) {
        return Ok(Outcome::FailWith(Message::template(
            "kind `%{kind}` requires a `%{key}` entry",
            [("kind", kind), ("key", *key)],
        )));
    }
    let extra = PAYLOAD_KEYS
        .iter()
        .find(|key| !allowed.contains(*key) && record.get(**key).is_some());
    if let Some(key) = extra {
        return Ok(Outcome::FailWith(Message::template(
            "kind `%{kind}` does not take a `%{key}` entry",
            [("kind", kind), ("key", *key)],
        )));
    }
    Ok(Outcome::Pass)
}

fn type_matches_kind(record: &Value) -> Result<Outcome, RuleError> {
    let kind = record_kind(record)?;
    let declared = record
        .field("type")?
        .as_symbol()
        .and_then(TypeTag::from_name)
        .ok_or_else(|| RuleError::new("type is not a known tag"))?;

    let consistent = match kind {
        "sequence" => declared == TypeTag::List,
        "tuple" => declared == TypeTag::Tuple,
        "struct" => declared == TypeTag::Struct,
        // a missing payload is reported by payload_matches_kind
        "literal" => record
            .get("value")
            .map_or(true, |value| declared == TypeTag::Any || types::matches_type(value, declared)),
        "scalar" => {
            record.get("fields").map_or(true, Value::is_null)
                || matches!(declared, TypeTag::Map | TypeTag::Any)
        }
        _ => true,
    };

    Ok(if consistent {
        Outcome::Pass
    } else {
        Outcome::FailWith(Message::template(
            "type `%{type}` does not fit kind `%{kind}`",
            [("type", declared.as_str()), ("kind", kind)],
        ))
    })
}
