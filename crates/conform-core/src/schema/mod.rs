//! Schema model
//!
//! A [`Schema`] is either a concrete [`Node`] or one of the deferred forms
//! resolved during validation: a [`Thunk`] producing a schema on demand
//! (recursive schemas), a [`Selector`] choosing a schema from the value, or a
//! union of alternatives.
//!
//! Every node carries the same envelope (checks, late checks, casts,
//! nullability and an error override) around one [`Variant`]. Nodes are
//! immutable once built and shared behind `Arc`, so a schema can be reused
//! across validations and threads.
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

pub mod describe;

use crate::error::Message;
use crate::rule::Rule;
use crate::types::{self, TypeTag};
use crate::value::{Key, Value};
use std::fmt;
use std::sync::Arc;

pub type Converter = Arc<dyn Fn(&Value) -> Result<Value, Message> + Send + Sync>;
pub type ThunkFn = Arc<dyn Fn() -> Schema + Send + Sync>;
pub type SelectorFn = Arc<dyn Fn(&Value) -> Option<Schema> + Send + Sync>;

/// Whether a node accepts null
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nullable {
    /// Decided by context: allowed for optional map keys and `null` types
    #[default]
    Inherit,
    Allow,
    Deny,
}

impl Nullable {
    /// Resolve against the context and the node's declared type
    pub fn resolve(self, context_allows: bool, declared_type: TypeTag) -> bool {
        match self {
            Nullable::Inherit => context_allows || declared_type == TypeTag::Null,
            Nullable::Allow => true,
            Nullable::Deny => false,
        }
    }
}

impl From<bool> for Nullable {
    fn from(allow: bool) -> Self {
        if allow {
            Nullable::Allow
        } else {
            Nullable::Deny
        }
    }
}

/// Source type a value may be converted from before type checking
#[derive(Clone)]
pub enum CastSource {
    /// Use the registry conversion from this type
    Builtin(TypeTag),
    /// Use a named converter for values of type `from`
    Custom {
        from: TypeTag,
        name: String,
        convert: Converter,
    },
}

impl CastSource {
    pub fn custom<F>(from: TypeTag, name: impl Into<String>, convert: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, Message> + Send + Sync + 'static,
    {
        CastSource::Custom {
            from,
            name: name.into(),
            convert: Arc::new(convert),
        }
    }

    /// The type of values this source applies to
    pub fn from_type(&self) -> TypeTag {
        match self {
            CastSource::Builtin(tag) => *tag,
            CastSource::Custom { from, .. } => *from,
        }
    }
}

impl PartialEq for CastSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CastSource::Builtin(a), CastSource::Builtin(b)) => a == b,
            (
                CastSource::Custom { from: f1, name: n1, convert: c1 },
                CastSource::Custom { from: f2, name: n2, convert: c2 },
            ) => f1 == f2 && n1 == n2 && Arc::ptr_eq(c1, c2),
            _ => false,
        }
    }
}

impl fmt::Debug for CastSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastSource::Builtin(tag) => write!(f, "Builtin({})", tag),
            CastSource::Custom { from, name, .. } => write!(f, "Custom({}, {})", from, name),
        }
    }
}

/// Key specifier of a map-schema entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySpec {
    Required(Key),
    /// Absence is not an error and the value may be null
    Optional(Key),
    /// Schema for every key not listed elsewhere
    AnyOther,
}

impl KeySpec {
    pub fn key(&self) -> Option<&Key> {
        match self {
            KeySpec::Required(key) | KeySpec::Optional(key) => Some(key),
            KeySpec::AnyOther => None,
        }
    }
}

/// Ordered mapping from key specifiers to schemas
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapSchema {
    entries: Vec<(KeySpec, Schema)>,
}

impl MapSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, key: impl Into<Key>, schema: impl Into<Schema>) -> Self {
        self.entries.push((KeySpec::Required(key.into()), schema.into()));
        self
    }

    pub fn optional(mut self, key: impl Into<Key>, schema: impl Into<Schema>) -> Self {
        self.entries.push((KeySpec::Optional(key.into()), schema.into()));
        self
    }

    pub fn any_other(mut self, schema: impl Into<Schema>) -> Self {
        self.entries.push((KeySpec::AnyOther, schema.into()));
        self
    }

    pub fn entries(&self) -> &[(KeySpec, Schema)] {
        &self.entries
    }

    /// Required keys in declaration order
    pub fn required_keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().filter_map(|(spec, _)| match spec {
            KeySpec::Required(key) => Some(key),
            _ => None,
        })
    }

    /// Whether `key` is listed as a required or optional key
    pub fn declares(&self, key: &Key) -> bool {
        self.entries.iter().any(|(spec, _)| spec.key() == Some(key))
    }

    /// Schema applied to unlisted keys, if any
    pub fn any_other_schema(&self) -> Option<&Schema> {
        self.entries
            .iter()
            .find(|(spec, _)| *spec == KeySpec::AnyOther)
            .map(|(_, schema)| schema)
    }

    /// Whether every entry is a required key
    pub fn is_compact(&self) -> bool {
        self.entries
            .iter()
            .all(|(spec, _)| matches!(spec, KeySpec::Required(_)))
    }
}

/// Structural part of a node
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    /// Any value of the declared type, optionally with map fields
    Scalar(Option<MapSchema>),
    /// A named struct, optionally with field schemas
    Struct {
        name: String,
        fields: Option<MapSchema>,
    },
    /// A list whose items all match one schema
    Sequence(Schema),
    /// A tuple of exact arity with one schema per position
    Tuple(Vec<Schema>),
    /// Exactly this value
    Literal(Value),
}

impl Variant {
    /// Name of the variant as it appears in descriptions
    pub fn kind(&self) -> &'static str {
        match self {
            Variant::Scalar(_) => "scalar",
            Variant::Struct { .. } => "struct",
            Variant::Sequence(_) => "sequence",
            Variant::Tuple(_) => "tuple",
            Variant::Literal(_) => "literal",
        }
    }
}

/// A concrete schema node: one variant inside the common envelope
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub declared_type: TypeTag,
    pub checks: Vec<Rule>,
    pub late_checks: Vec<Rule>,
    pub cast_from: Vec<CastSource>,
    pub nullable: Nullable,
    pub on_error: Option<String>,
    pub variant: Variant,
}

impl Node {
    pub fn new(declared_type: TypeTag, variant: Variant) -> Self {
        Self {
            declared_type,
            checks: Vec::new(),
            late_checks: Vec::new(),
            cast_from: Vec::new(),
            nullable: Nullable::Inherit,
            on_error: None,
            variant,
        }
    }

    /// Any value of the given type
    pub fn scalar(declared_type: TypeTag) -> Self {
        Self::new(declared_type, Variant::Scalar(None))
    }

    /// A map whose entries follow `fields`
    pub fn map(fields: MapSchema) -> Self {
        Self::new(TypeTag::Map, Variant::Scalar(Some(fields)))
    }

    /// A struct named `name`, with or without field schemas
    pub fn structure(name: impl Into<String>, fields: Option<MapSchema>) -> Self {
        Self::new(
            TypeTag::Struct,
            Variant::Struct {
                name: name.into(),
                fields,
            },
        )
    }

    pub fn sequence(item: impl Into<Schema>) -> Self {
        Self::new(TypeTag::List, Variant::Sequence(item.into()))
    }

    pub fn tuple<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Schema>,
    {
        Self::new(
            TypeTag::Tuple,
            Variant::Tuple(elements.into_iter().map(Into::into).collect()),
        )
    }

    /// Exactly `value`; the declared type is the value's own type
    pub fn literal(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(types::classify(&value), Variant::Literal(value))
    }

    pub fn with_check(mut self, rule: Rule) -> Self {
        self.checks.push(rule);
        self
    }

    pub fn with_checks(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.checks.extend(rules);
        self
    }

    pub fn with_late_check(mut self, rule: Rule) -> Self {
        self.late_checks.push(rule);
        self
    }

    /// Accept values of type `from`, converted with the registry table
    pub fn with_cast_from(mut self, from: TypeTag) -> Self {
        self.cast_from.push(CastSource::Builtin(from));
        self
    }

    /// Accept values of type `from`, converted by a named converter
    pub fn with_converter<F>(mut self, from: TypeTag, name: impl Into<String>, convert: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, Message> + Send + Sync + 'static,
    {
        self.cast_from.push(CastSource::custom(from, name, convert));
        self
    }

    pub fn with_nullable(mut self, nullable: impl Into<Nullable>) -> Self {
        self.nullable = nullable.into();
        self
    }

    pub fn with_on_error(mut self, message: impl Into<String>) -> Self {
        self.on_error = Some(message.into());
        self
    }

    /// Whether the envelope holds nothing beyond the variant
    pub fn has_default_envelope(&self) -> bool {
        self.checks.is_empty()
            && self.late_checks.is_empty()
            && self.cast_from.is_empty()
            && self.nullable == Nullable::Inherit
            && self.on_error.is_none()
    }

    pub fn into_schema(self) -> Schema {
        Schema::Node(Arc::new(self))
    }
}

/// A named zero-argument schema constructor
#[derive(Clone)]
pub struct Thunk {
    name: String,
    build: ThunkFn,
}

impl Thunk {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolve(&self) -> Schema {
        (self.build)()
    }
}

/// A named function choosing a schema from the value being validated
#[derive(Clone)]
pub struct Selector {
    name: String,
    select: SelectorFn,
}

impl Selector {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn select(&self, value: &Value) -> Option<Schema> {
        (self.select)(value)
    }
}

/// A schema
#[derive(Clone)]
pub enum Schema {
    Node(Arc<Node>),
    Thunk(Thunk),
    Selector(Selector),
    Union(Vec<Schema>),
}

impl Schema {
    /// A schema produced on demand, for recursive definitions
    pub fn lazy<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        Schema::Thunk(Thunk {
            name: name.into(),
            build: Arc::new(build),
        })
    }

    /// A schema chosen per value; `None` means no schema applies
    pub fn select<F>(name: impl Into<String>, select: F) -> Self
    where
        F: Fn(&Value) -> Option<Schema> + Send + Sync + 'static,
    {
        Schema::Selector(Selector {
            name: name.into(),
            select: Arc::new(select),
        })
    }

    pub fn union<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Schema>,
    {
        Schema::Union(members.into_iter().map(Into::into).collect())
    }

    /// Matches any non-null value
    pub fn any() -> Self {
        Node::scalar(TypeTag::Any).into_schema()
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Schema::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Flatten nested unions and drop duplicate members, keeping first occurrences
    pub fn flatten_members(members: &[Schema]) -> Vec<Schema> {
        let mut flat: Vec<Schema> = Vec::with_capacity(members.len());
        collect_members(members, &mut flat);
        flat
    }
}

fn collect_members(members: &[Schema], flat: &mut Vec<Schema>) {
    for member in members {
        match member {
            Schema::Union(inner) => collect_members(inner, flat),
            other if !flat.contains(other) => flat.push(other.clone()),
            _ => {}
        }
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Schema::Node(a), Schema::Node(b)) => Arc::ptr_eq(a, b) || a == b,
            (Schema::Thunk(a), Schema::Thunk(b)) => {
                a.name == b.name && Arc::ptr_eq(&a.build, &b.build)
            }
            (Schema::Selector(a), Schema::Selector(b)) => {
                a.name == b.name && Arc::ptr_eq(&a.select, &b.select)
            }
            (Schema::Union(a), Schema::Union(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Node(node) => node.fmt(f),
            Schema::Thunk(thunk) => write!(f, "Thunk({}/0)", thunk.name),
            Schema::Selector(selector) => write!(f, "Selector({}/1)", selector.name),
            Schema::Union(members) => f.debug_tuple("Union").field(members).finish(),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe().to_pretty_string())
    }
}

impl From<Node> for Schema {
    fn from(node: Node) -> Self {
        node.into_schema()
    }
}

impl From<Arc<Node>> for Schema {
    fn from(node: Arc<Node>) -> Self {
        Schema::Node(node)
    }
}

impl From<MapSchema> for Schema {
    fn from(fields: MapSchema) -> Self {
        Node::map(fields).into_schema()
    }
}

/// `[item]` is a list whose items all match `item`
impl<S: Into<Schema>> From<[S; 1]> for Schema {
    fn from([item]: [S; 1]) -> Self {
        Node::sequence(item).into_schema()
    }
}

macro_rules! tuple_shortcut {
    ($($ty:ident $var:ident),+) => {
        impl<$($ty: Into<Schema>),+> From<($($ty,)+)> for Schema {
            fn from(($($var,)+): ($($ty,)+)) -> Self {
                Node::tuple(vec![$($var.into()),+]).into_schema()
            }
        }
    };
}

tuple_shortcut!(A a);
tuple_shortcut!(A a, B b);
tuple_shortcut!(A a, B b, C c);
tuple_shortcut!(A a, B b, C c, D d);
tuple_shortcut!(A a, B b, C c, D d, E e);
tuple_shortcut!(A a, B b, C c, D d, E e, F f);

macro_rules! literal_shortcut {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Schema {
                fn from(value: $ty) -> Self {
                    Node::literal(value).into_schema()
                }
            }
        )+
    };
}

literal_shortcut!(&str, String, i64, i32, f64, bool, Value);
