//! Dynamic values walked by the validation engine
//!
//! Values mirror the shapes a schema can describe: scalars, lists, fixed-size
//! tuples, keyed maps, named structs, and opaque function handles (used when a
//! schema is described as data).
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use crate::rule::RuleError;
use crate::types::{self, TypeTag};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Keyed entries of a map or struct value
pub type Map = BTreeMap<Key, Value>;

/// Width under which compound values are pretty-printed on a single line
const PRETTY_INLINE_WIDTH: usize = 60;

/// Map key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Integer(i64),
    Symbol(String),
    String(String),
}

impl Key {
    /// Create a symbol key
    pub fn symbol(name: impl Into<String>) -> Self {
        Key::Symbol(name.into())
    }

    /// Convert a scalar value into a key, if it can be one
    pub fn from_value(value: &Value) -> Option<Key> {
        match value {
            Value::Integer(n) => Some(Key::Integer(*n)),
            Value::Symbol(s) => Some(Key::Symbol(s.clone())),
            Value::String(s) => Some(Key::String(s.clone())),
            _ => None,
        }
    }

    /// The key as a value
    pub fn to_value(&self) -> Value {
        match self {
            Key::Integer(n) => Value::Integer(*n),
            Key::Symbol(s) => Value::Symbol(s.clone()),
            Key::String(s) => Value::String(s.clone()),
        }
    }

    /// Inspect form, distinguishing strings from symbols
    pub fn inspect(&self) -> String {
        match self {
            Key::Integer(n) => n.to_string(),
            Key::Symbol(s) => format!(":{}", s),
            Key::String(s) => format!("{:?}", s),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Integer(n) => write!(f, "{}", n),
            Key::Symbol(s) | Key::String(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Key::Integer(n) => serializer.serialize_i64(*n),
            Key::Symbol(s) | Key::String(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Integer(n)
    }
}

/// A named record, the value form of opaque and domain types
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: String,
    pub fields: Map,
}

/// Opaque handle to a callable, identified by name and arity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Function {
    pub name: String,
    pub arity: u8,
}

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Symbol(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Map),
    Struct(Struct),
    Function(Function),
}

impl Value {
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Build a map value from key/value pairs
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a named struct value from key/value pairs
    pub fn structure<I, K, V>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        Value::Struct(Struct {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        })
    }

    pub fn function(name: impl Into<String>, arity: u8) -> Self {
        Value::Function(Function {
            name: name.into(),
            arity,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type tag this value classifies as
    pub fn type_tag(&self) -> TypeTag {
        types::classify(self)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of integers and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Entry of a map or struct value
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        let key = key.into();
        match self {
            Value::Map(map) => map.get(&key),
            Value::Struct(s) => s.fields.get(&key),
            _ => None,
        }
    }

    /// Entry of a map or struct value, as a rule failure when absent
    ///
    /// Rules reading sibling data use this so that a missing entry surfaces as
    /// a contained rule failure instead of a panic.
    pub fn field(&self, key: impl Into<Key>) -> Result<&Value, RuleError> {
        let key = key.into();
        match self {
            Value::Map(_) | Value::Struct(_) => self
                .get(key.clone())
                .ok_or_else(|| RuleError::new(format!("no field {} in {}", key.inspect(), self))),
            _ => Err(RuleError::new(format!("cannot read field {} of {}", key.inspect(), self))),
        }
    }

    /// Element of a list or tuple, as a rule failure when absent
    pub fn index(&self, index: usize) -> Result<&Value, RuleError> {
        match self {
            Value::List(items) | Value::Tuple(items) => items
                .get(index)
                .ok_or_else(|| {
                    RuleError::new(format!("index {} out of bounds for {}", index, self))
                }),
            _ => Err(RuleError::new(format!("cannot index into {}", self))),
        }
    }

    /// Size of strings (in chars), lists, tuples, maps and structs
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::List(items) | Value::Tuple(items) => Some(items.len()),
            Value::Map(map) => Some(map.len()),
            Value::Struct(s) => Some(s.fields.len()),
            _ => None,
        }
    }

    /// Text form used when a value is bound into a message template
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::String(s) | Value::Symbol(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Lossy conversion into JSON
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Integer(n) => Json::from(*n),
            Value::Float(x) => serde_json::Number::from_f64(*x)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) | Value::Symbol(s) => Json::String(s.clone()),
            Value::List(items) | Value::Tuple(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            Value::Struct(s) => {
                let mut object: serde_json::Map<String, Json> = s
                    .fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect();
                object.insert("__struct__".to_string(), Json::String(s.name.clone()));
                Json::Object(object)
            }
            Value::Function(func) => Json::String(format!("fn {}/{}", func.name, func.arity)),
        }
    }

    /// Multi-line rendering; compound values that fit stay on one line
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, indent: usize) {
        let inline = self.to_string();
        if inline.len() <= PRETTY_INLINE_WIDTH {
            out.push_str(&inline);
            return;
        }

        let pad = "  ".repeat(indent + 1);
        let close_pad = "  ".repeat(indent);
        match self {
            Value::List(items) | Value::Tuple(items) => {
                let (open, close) = if matches!(self, Value::List(_)) {
                    ('[', ']')
                } else {
                    ('(', ')')
                };
                out.push(open);
                out.push('\n');
                for item in items {
                    out.push_str(&pad);
                    item.write_pretty(out, indent + 1);
                    out.push_str(",\n");
                }
                out.push_str(&close_pad);
                out.push(close);
            }
            Value::Map(map) => write_pretty_entries(out, map, indent),
            Value::Struct(s) => {
                out.push_str(&s.name);
                out.push(' ');
                write_pretty_entries(out, &s.fields, indent);
            }
            other => out.push_str(&other.to_string()),
        }
    }
}

fn write_pretty_entries(out: &mut String, map: &Map, indent: usize) {
    let pad = "  ".repeat(indent + 1);
    out.push_str("{\n");
    for (key, value) in map {
        out.push_str(&pad);
        out.push_str(&key.inspect());
        out.push_str(" => ");
        value.write_pretty(out, indent + 1);
        out.push_str(",\n");
    }
    out.push_str(&"  ".repeat(indent));
    out.push('}');
}

fn write_entries(f: &mut fmt::Formatter<'_>, map: &Map) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{} => {}", key.inspect(), value)?;
    }
    write!(f, "}}")
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Symbol(s) => write!(f, ":{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                write!(f, ")")
            }
            Value::Map(map) => write_entries(f, map),
            Value::Struct(s) => {
                write!(f, "{} ", s.name)?;
                write_entries(f, &s.fields)
            }
            Value::Function(func) => write!(f, "fn {}/{}", func.name, func.arity),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(object) => Value::Map(
                object
                    .into_iter()
                    .map(|(k, v)| (Key::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Struct> for Value {
    fn from(s: Struct) -> Self {
        Value::Struct(s)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        key.to_value()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(option: Option<T>) -> Self {
        option.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_inspect_forms() {
        let value = Value::map([
            ("name", Value::from("ada")),
            ("tags", Value::list([Value::symbol("x")])),
        ]);
        assert_eq!(value.to_string(), r#"{"name" => "ada", "tags" => [:x]}"#);
        assert_eq!(Value::tuple([1, 2]).to_string(), "(1, 2)");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::function("check", 1).to_string(), "fn check/1");
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({"a": [1, 2.5, "x", null, true]}));
        let list = value.get("a").and_then(Value::as_list).unwrap();
        assert_eq!(list[0], Value::Integer(1));
        assert_eq!(list[1], Value::Float(2.5));
        assert_eq!(list[2], Value::from("x"));
        assert!(list[3].is_null());
        assert_eq!(list[4], Value::Bool(true));
    }

    #[test]
    fn test_json_round_trip_of_struct() {
        let date = Value::structure("Date", [("year", 2024)]);
        assert_eq!(date.to_json(), json!({"year": 2024, "__struct__": "Date"}));
    }

    #[test]
    fn test_field_reports_absent_entries() {
        let value = Value::map([("a", 1)]);
        assert_eq!(value.field("a").unwrap(), &Value::Integer(1));
        assert!(value.field("b").is_err());
        assert!(Value::Integer(3).field("a").is_err());
        assert!(Value::list([1]).index(4).is_err());
    }

    #[test]
    fn test_len_counts_chars() {
        assert_eq!(Value::from("héllo").len(), Some(5));
        assert_eq!(Value::Bool(true).len(), None);
    }

    #[test]
    fn test_pretty_string_breaks_long_values() {
        let value = Value::map([
            ("first", Value::from("a fairly long string value")),
            ("second", Value::from("another fairly long string value")),
        ]);
        let pretty = value.to_pretty_string();
        assert!(pretty.starts_with("{\n  \"first\" => "));
        assert!(pretty.ends_with(",\n}"));
    }
}
