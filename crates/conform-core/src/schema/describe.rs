//! Schema description: the value form of a schema
//!
//! Descriptions are what the meta-schema validates and what `Display` prints.
//! A node with a default envelope collapses to a compact shortcut where one
//! exists (`[item]`, `(a, b)`, a plain map of fields, a bare scalar literal);
//! every other node becomes a `schema` record. Closures are opaque and describe
//! as function handles carrying their name and arity.
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use super::{CastSource, KeySpec, MapSchema, Node, Nullable, Schema, Variant};
use crate::rule::{Rule, RuleMessage};
use crate::types;
use crate::value::{Map, Value};

/// Struct name of a full node record
pub const NODE_RECORD: &str = "schema";
/// Struct name of a union record
pub const UNION_RECORD: &str = "union";
/// Struct name of a map-schema record with optional or catch-all keys
pub const MAP_SCHEMA_RECORD: &str = "map_schema";
/// Struct name of a rule carrying a message
pub const RULE_RECORD: &str = "rule";
/// Key specifier for the catch-all entry of a map-schema record
pub const ANY_OTHER_KEY: &str = "any_other";
/// `nullable` value of a node deferring to its context
pub const NULLABLE_DEFAULT: &str = "default";

impl Schema {
    /// Describe the schema as a value
    pub fn describe(&self) -> Value {
        match self {
            Schema::Node(node) => node.describe(),
            Schema::Thunk(thunk) => Value::function(thunk.name(), 0),
            Schema::Selector(selector) => Value::function(selector.name(), 1),
            Schema::Union(members) => Value::structure(
                UNION_RECORD,
                [("members", Value::List(members.iter().map(Schema::describe).collect()))],
            ),
        }
    }
}

impl Node {
    pub fn describe(&self) -> Value {
        if self.has_default_envelope() {
            if let Some(compact) = self.describe_compact() {
                return compact;
            }
        }
        self.describe_record()
    }

    fn describe_compact(&self) -> Option<Value> {
        match (&self.variant, self.declared_type) {
            (Variant::Sequence(item), types::TypeTag::List) => {
                Some(Value::List(vec![item.describe()]))
            }
            (Variant::Tuple(elements), types::TypeTag::Tuple) => Some(Value::Tuple(
                elements.iter().map(Schema::describe).collect(),
            )),
            (Variant::Scalar(Some(fields)), types::TypeTag::Map) => Some(fields.describe()),
            (Variant::Literal(value), declared)
                if is_bare_scalar(value) && types::classify(value) == declared =>
            {
                Some(value.clone())
            }
            _ => None,
        }
    }

    fn describe_record(&self) -> Value {
        let nullable = match self.nullable {
            Nullable::Inherit => Value::symbol(NULLABLE_DEFAULT),
            Nullable::Allow => Value::Bool(true),
            Nullable::Deny => Value::Bool(false),
        };

        let mut record = Map::new();
        record.insert("type".into(), self.declared_type.to_value());
        record.insert("checks".into(), describe_rules(&self.checks));
        record.insert("late_checks".into(), describe_rules(&self.late_checks));
        record.insert(
            "cast_from".into(),
            Value::List(self.cast_from.iter().map(describe_cast).collect()),
        );
        record.insert("nullable".into(), nullable);
        record.insert("on_error".into(), self.on_error.clone().into());
        record.insert("kind".into(), Value::symbol(self.variant.kind()));

        match &self.variant {
            Variant::Scalar(fields) => {
                if let Some(fields) = fields {
                    record.insert("fields".into(), fields.describe());
                }
            }
            Variant::Struct { name, fields } => {
                record.insert("name".into(), Value::from(name.as_str()));
                if let Some(fields) = fields {
                    record.insert("fields".into(), fields.describe());
                }
            }
            Variant::Sequence(item) => {
                record.insert("item".into(), item.describe());
            }
            Variant::Tuple(elements) => {
                record.insert(
                    "elements".into(),
                    Value::List(elements.iter().map(Schema::describe).collect()),
                );
            }
            Variant::Literal(value) => {
                record.insert("value".into(), value.clone());
            }
        }

        Value::Struct(crate::value::Struct {
            name: NODE_RECORD.to_string(),
            fields: record,
        })
    }
}

impl MapSchema {
    /// Plain map of field schemas when every key is required, a record otherwise
    pub fn describe(&self) -> Value {
        if self.is_compact() {
            let fields: Map = self
                .entries()
                .iter()
                .filter_map(|(spec, schema)| spec.key().map(|key| (key.clone(), schema.describe())))
                .collect();
            return Value::Map(fields);
        }

        let entries = self
            .entries()
            .iter()
            .map(|(spec, schema)| {
                let spec = match spec {
                    KeySpec::Required(key) => {
                        Value::tuple([Value::symbol("required"), key.to_value()])
                    }
                    KeySpec::Optional(key) => {
                        Value::tuple([Value::symbol("optional"), key.to_value()])
                    }
                    KeySpec::AnyOther => Value::symbol(ANY_OTHER_KEY),
                };
                Value::tuple([spec, schema.describe()])
            })
            .collect();
        Value::structure(MAP_SCHEMA_RECORD, [("entries", Value::List(entries))])
    }
}

impl Rule {
    /// A bare predicate handle, or a `rule` record when a message is attached
    pub fn describe(&self) -> Value {
        let predicate = Value::function(self.name(), 1);
        match self.message() {
            None => predicate,
            Some(message) => Value::structure(
                RULE_RECORD,
                [("predicate", predicate), ("message", describe_message(message))],
            ),
        }
    }
}

fn describe_message(message: &RuleMessage) -> Value {
    match message {
        RuleMessage::Text(text) => Value::from(text.as_str()),
        RuleMessage::Template { template, bindings } => Value::tuple([
            Value::from(template.as_str()),
            Value::map(bindings.iter().map(|(k, v)| (k.as_str(), v.clone()))),
        ]),
        RuleMessage::FromValue(_) | RuleMessage::FromValueAndPath(_) => {
            Value::function("message", message.arity().unwrap_or(1))
        }
    }
}

fn describe_rules(rules: &[Rule]) -> Value {
    Value::List(rules.iter().map(Rule::describe).collect())
}

fn describe_cast(source: &CastSource) -> Value {
    match source {
        CastSource::Builtin(tag) => tag.to_value(),
        CastSource::Custom { from, name, .. } => {
            Value::tuple([from.to_value(), Value::function(name.as_str(), 1)])
        }
    }
}

fn is_bare_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Null
            | Value::Bool(_)
            | Value::Integer(_)
            | Value::Float(_)
            | Value::String(_)
            | Value::Symbol(_)
    )
}
