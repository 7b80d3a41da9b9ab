//! Type registry: classification of values and conversions between types
//!
//! Every value classifies into exactly one concrete [`TypeTag`]. The abstract
//! tags `any` and `number` are never produced by [`classify`] but can be
//! declared by schemas and matched with [`matches_type`].
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Type tags understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Any,
    Null,
    String,
    Number,
    Integer,
    Float,
    Boolean,
    Symbol,
    Function,
    List,
    Tuple,
    Map,
    Struct,
}

impl TypeTag {
    /// All tags, in declaration order
    pub const ALL: [TypeTag; 13] = [
        TypeTag::Any,
        TypeTag::Null,
        TypeTag::String,
        TypeTag::Number,
        TypeTag::Integer,
        TypeTag::Float,
        TypeTag::Boolean,
        TypeTag::Symbol,
        TypeTag::Function,
        TypeTag::List,
        TypeTag::Tuple,
        TypeTag::Map,
        TypeTag::Struct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Any => "any",
            TypeTag::Null => "null",
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::Boolean => "boolean",
            TypeTag::Symbol => "symbol",
            TypeTag::Function => "function",
            TypeTag::List => "list",
            TypeTag::Tuple => "tuple",
            TypeTag::Map => "map",
            TypeTag::Struct => "struct",
        }
    }

    /// Look a tag up by its name
    pub fn from_name(name: &str) -> Option<TypeTag> {
        TypeTag::ALL.iter().copied().find(|tag| tag.as_str() == name)
    }

    /// The tag as a symbol value, the form used when schemas are described
    pub fn to_value(&self) -> Value {
        Value::symbol(self.as_str())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown type name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown type `{0}`")]
pub struct UnknownTypeError(pub String);

impl FromStr for TypeTag {
    type Err = UnknownTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::from_name(s).ok_or_else(|| UnknownTypeError(s.to_string()))
    }
}

/// Failed conversion between two types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot be cast to `{to}`")]
pub struct CastError {
    pub from: TypeTag,
    pub to: TypeTag,
    /// Inspect form of the value that failed to convert
    pub value: String,
}

impl CastError {
    fn new(value: &Value, from: TypeTag, to: TypeTag) -> Self {
        Self {
            from,
            to,
            value: value.to_string(),
        }
    }
}

/// Classify a value into its concrete type tag
pub fn classify(value: &Value) -> TypeTag {
    match value {
        Value::Null => TypeTag::Null,
        Value::Bool(_) => TypeTag::Boolean,
        Value::Integer(_) => TypeTag::Integer,
        Value::Float(_) => TypeTag::Float,
        Value::String(_) => TypeTag::String,
        Value::Symbol(_) => TypeTag::Symbol,
        Value::List(_) => TypeTag::List,
        Value::Tuple(_) => TypeTag::Tuple,
        Value::Map(_) => TypeTag::Map,
        Value::Struct(_) => TypeTag::Struct,
        Value::Function(_) => TypeTag::Function,
    }
}

/// Whether a value satisfies a declared type tag
///
/// `any` matches everything and `number` matches integers and floats; every
/// other tag requires the exact classification, so a struct never matches `map`.
pub fn matches_type(value: &Value, tag: TypeTag) -> bool {
    match tag {
        TypeTag::Any => true,
        TypeTag::Number => matches!(value, Value::Integer(_) | Value::Float(_)),
        other => classify(value) == other,
    }
}

/// Convert a value from one type to another using the fixed conversion table
///
/// Conversions never lose information on success: a string only becomes an
/// integer when the whole string parses, integer text beyond the `i64` range
/// fails instead of becoming a float, and integers and floats only convert into
/// each other when the value survives the round trip.
pub fn cast(value: &Value, from: TypeTag, to: TypeTag) -> Result<Value, CastError> {
    if !matches_type(value, from) {
        return Err(CastError::new(value, from, to));
    }
    if from == to || (to == TypeTag::Number && matches_type(value, TypeTag::Number)) {
        return Ok(value.clone());
    }

    let fail = || CastError::new(value, from, to);
    let converted = match (value, to) {
        (Value::String(s), TypeTag::Integer) => s.parse::<i64>().map(Value::Integer).ok(),
        (Value::String(s), TypeTag::Float) => parse_float(s).map(Value::Float),
        (Value::String(s), TypeTag::Number) if is_integer_literal(s) => {
            s.parse::<i64>().map(Value::Integer).ok()
        }
        (Value::String(s), TypeTag::Number) => parse_float(s).map(Value::Float),
        (Value::String(s), TypeTag::Boolean) => match s.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (Value::String(s), TypeTag::Symbol) if !s.is_empty() => Some(Value::Symbol(s.clone())),
        (Value::Symbol(s), TypeTag::String) => Some(Value::String(s.clone())),
        (Value::Integer(n), TypeTag::String) => Some(Value::String(n.to_string())),
        (Value::Float(x), TypeTag::String) => Some(Value::String(format!("{:?}", x))),
        (Value::Bool(b), TypeTag::String) => Some(Value::String(b.to_string())),
        (Value::Integer(n), TypeTag::Float) => integer_to_float(*n).map(Value::Float),
        (Value::Float(x), TypeTag::Float) => Some(Value::Float(*x)),
        (Value::Integer(n), TypeTag::Integer) => Some(Value::Integer(*n)),
        (Value::Float(x), TypeTag::Integer) => float_to_integer(*x).map(Value::Integer),
        (Value::List(items), TypeTag::Tuple) => Some(Value::Tuple(items.clone())),
        (Value::Tuple(items), TypeTag::List) => Some(Value::List(items.clone())),
        (Value::Struct(s), TypeTag::Map) => Some(Value::Map(s.fields.clone())),
        _ => None,
    };

    converted.ok_or_else(fail)
}

fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// An optional sign followed by ASCII digits only
fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

// Integers beyond 2^53 may round on the way to f64
fn integer_to_float(n: i64) -> Option<f64> {
    let x = n as f64;
    (float_to_integer(x) == Some(n)).then_some(x)
}

fn float_to_integer(x: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if x.is_finite() && x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Some(x as i64)
    } else {
        None
    }
}
