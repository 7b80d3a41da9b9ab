//! Schema builders
//!
//! Each constructor starts a [`SchemaBuilder`] for one kind of node. Builder
//! methods record constraint options and envelope settings; [`SchemaBuilder::build`]
//! resolves the options through the built-in rule table and returns the schema.
//!
//! ```rust
//! use conform_schemas::builder::{number, one_of, string};
//! use conform_schemas::{validate_value, TypeTag, Value};
//!
//! let schema = one_of([
//!     number().cast_from(TypeTag::String).max(10).build().unwrap(),
//!     string().min_length(3).build().unwrap(),
//! ]);
//! assert!(validate_value(&Value::from("7"), &schema).is_empty());
//! ```
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use crate::built_in::{rule_for, BuildError, BuiltIn};
use conform_core::{MapSchema, Message, Node, Nullable, Rule, Schema, TypeTag, Value};

/// Accumulates options for a single schema node
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaBuilder {
    node: Node,
    options: Vec<BuiltIn>,
}

impl SchemaBuilder {
    /// Start from an existing node
    pub fn new(node: Node) -> Self {
        Self {
            node,
            options: Vec::new(),
        }
    }

    /// The type built-in options are resolved against
    pub fn declared_type(&self) -> TypeTag {
        self.node.declared_type
    }

    fn option(mut self, option: BuiltIn) -> Self {
        self.options.push(option);
        self
    }

    pub fn min(self, min: impl Into<Value>) -> Self {
        self.option(BuiltIn::Min(min.into()))
    }

    pub fn max(self, max: impl Into<Value>) -> Self {
        self.option(BuiltIn::Max(max.into()))
    }

    pub fn between(self, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        self.option(BuiltIn::Between(min.into(), max.into()))
    }

    pub fn min_length(self, min: usize) -> Self {
        self.option(BuiltIn::MinLength(min))
    }

    pub fn max_length(self, max: usize) -> Self {
        self.option(BuiltIn::MaxLength(max))
    }

    pub fn length(self, length: usize) -> Self {
        self.option(BuiltIn::Length(length))
    }

    /// Require strings to match a regular expression
    pub fn format(self, pattern: impl Into<String>) -> Self {
        self.option(BuiltIn::Format(pattern.into()))
    }

    pub fn is_in<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.option(BuiltIn::In(values.into_iter().map(Into::into).collect()))
    }

    pub fn not_in<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.option(BuiltIn::NotIn(values.into_iter().map(Into::into).collect()))
    }

    pub fn unique(self) -> Self {
        self.option(BuiltIn::Unique)
    }

    pub fn non_empty(self) -> Self {
        self.option(BuiltIn::NonEmpty)
    }

    /// Add a user rule, evaluated after the built-in ones
    pub fn check(mut self, rule: Rule) -> Self {
        self.node = self.node.with_check(rule);
        self
    }

    /// Add a rule evaluated only once everything else passed
    pub fn late_check(mut self, rule: Rule) -> Self {
        self.node = self.node.with_late_check(rule);
        self
    }

    pub fn cast_from(mut self, from: TypeTag) -> Self {
        self.node = self.node.with_cast_from(from);
        self
    }

    /// Accept values of type `from` through a named converter
    pub fn cast_from_with<F>(mut self, from: TypeTag, name: impl Into<String>, convert: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, Message> + Send + Sync + 'static,
    {
        self.node = self.node.with_converter(from, name, convert);
        self
    }

    pub fn nullable(mut self, nullable: impl Into<Nullable>) -> Self {
        self.node = self.node.with_nullable(nullable);
        self
    }

    /// Replace every error reported at this node with one message
    pub fn on_error(mut self, message: impl Into<String>) -> Self {
        self.node = self.node.with_on_error(message);
        self
    }

    /// Resolve the recorded options and produce the schema
    ///
    /// Built-in rules come first, in the order their options were given,
    /// followed by the user's own checks.
    pub fn build(self) -> Result<Schema, BuildError> {
        let Self { mut node, options } = self;
        let mut checks = options
            .iter()
            .map(|option| rule_for(option, node.declared_type))
            .collect::<Result<Vec<_>, _>>()?;
        checks.append(&mut node.checks);
        node.checks = checks;
        Ok(node.into_schema())
    }
}

impl TryFrom<SchemaBuilder> for Schema {
    type Error = BuildError;

    fn try_from(builder: SchemaBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

fn scalar(declared_type: TypeTag) -> SchemaBuilder {
    SchemaBuilder::new(Node::scalar(declared_type))
}

/// Any non-null value
pub fn any() -> SchemaBuilder {
    scalar(TypeTag::Any)
}

pub fn string() -> SchemaBuilder {
    scalar(TypeTag::String)
}

/// Integers or floats
pub fn number() -> SchemaBuilder {
    scalar(TypeTag::Number)
}

pub fn integer() -> SchemaBuilder {
    scalar(TypeTag::Integer)
}

pub fn float() -> SchemaBuilder {
    scalar(TypeTag::Float)
}

pub fn boolean() -> SchemaBuilder {
    scalar(TypeTag::Boolean)
}

pub fn symbol() -> SchemaBuilder {
    scalar(TypeTag::Symbol)
}

pub fn function() -> SchemaBuilder {
    scalar(TypeTag::Function)
}

/// A list whose items all follow `item`
pub fn list(item: impl Into<Schema>) -> SchemaBuilder {
    SchemaBuilder::new(Node::sequence(item))
}

/// A tuple with one schema per position
pub fn tuple<I, S>(elements: I) -> SchemaBuilder
where
    I: IntoIterator<Item = S>,
    S: Into<Schema>,
{
    SchemaBuilder::new(Node::tuple(elements))
}

pub fn map(fields: MapSchema) -> SchemaBuilder {
    SchemaBuilder::new(Node::map(fields))
}

/// A map with arbitrary keys whose values all follow `values`
pub fn map_of(values: impl Into<Schema>) -> SchemaBuilder {
    map(MapSchema::new().any_other(values))
}

/// A struct named `name`, optionally with field schemas
pub fn structure(name: impl Into<String>, fields: Option<MapSchema>) -> SchemaBuilder {
    SchemaBuilder::new(Node::structure(name, fields))
}

/// Exactly `value`
pub fn literal(value: impl Into<Value>) -> SchemaBuilder {
    SchemaBuilder::new(Node::literal(value))
}

/// The first member the value satisfies
pub fn one_of<I, S>(members: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<Schema>,
{
    Schema::union(members)
}

/// A schema built on first use, for recursive definitions
pub fn lazy<F>(name: impl Into<String>, build: F) -> Schema
where
    F: Fn() -> Schema + Send + Sync + 'static,
{
    Schema::lazy(name, build)
}

/// A schema picked from the value being validated
pub fn select<F>(name: impl Into<String>, select: F) -> Schema
where
    F: Fn(&Value) -> Option<Schema> + Send + Sync + 'static,
{
    Schema::select(name, select)
}
