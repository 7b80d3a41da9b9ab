//! Unit tests for the meta-schema
//!
//! The meta-schema is built from the same schema model it validates, so its
//! own building blocks double as the main fixtures for well-formed schemas.

use conform_core::meta::{building_blocks, meta_schema};
use conform_core::{
    check_schema, validate_value, Key, MapSchema, Node, Rule, Schema, SchemaError, TypeTag, Value,
    Variant,
};
use pretty_assertions::assert_eq;

fn meta_errors(schema: &Schema) -> Vec<(String, String)> {
    validate_value(&schema.describe(), &meta_schema())
        .iter()
        .map(|e| (e.path.to_string(), e.render()))
        .collect()
}

#[test]
fn test_building_blocks_validate_against_meta_schema() {
    for (name, block) in building_blocks() {
        let errors = meta_errors(&block);
        assert!(errors.is_empty(), "{} is not a valid schema: {:?}", name, errors);
    }
}

#[test]
fn test_meta_schema_checks_itself() {
    assert!(check_schema(&meta_schema()).is_ok());
}

#[test]
fn test_shortcut_forms_are_accepted() {
    let schemas = vec![
        Schema::from([Node::scalar(TypeTag::Integer)]),
        Schema::from(("ok", Node::scalar(TypeTag::String))),
        Schema::from(MapSchema::new().required("a", 1).optional("b", true)),
        Schema::from(Value::symbol("done")),
        Schema::lazy("later", Schema::any),
        Schema::union([Schema::from(1), Schema::from("one")]),
    ];
    for schema in schemas {
        assert!(check_schema(&schema).is_ok(), "rejected {}", schema);
    }
}

#[test]
fn test_declared_type_must_fit_variant() {
    let broken = Node::new(TypeTag::String, Variant::Tuple(vec![Schema::any()])).into_schema();
    assert_eq!(
        meta_errors(&broken),
        vec![("$".to_string(), "type `string` does not fit kind `tuple`".to_string())]
    );
}

#[test]
fn test_literal_type_must_match_value() {
    let broken = Node::new(TypeTag::String, Variant::Literal(Value::Integer(1))).into_schema();
    assert_eq!(
        meta_errors(&broken),
        vec![("$".to_string(), "type `string` does not fit kind `literal`".to_string())]
    );
}

#[test]
fn test_cast_source_cannot_be_any() {
    let broken = Node::scalar(TypeTag::Integer)
        .with_cast_from(TypeTag::Any)
        .into_schema();
    assert_eq!(
        meta_errors(&broken),
        vec![("$.cast_from[0]".to_string(), "invalid type :any".to_string())]
    );
}

#[test]
fn test_empty_union_is_rejected() {
    let errors = meta_errors(&Schema::union(Vec::<Schema>::new()));
    assert_eq!(
        errors,
        vec![("$.members".to_string(), "a union needs at least one member".to_string())]
    );
}

#[test]
fn test_nested_problems_are_located() {
    let broken = Node::new(TypeTag::Integer, Variant::Sequence(Schema::any()));
    let schema = Schema::from(MapSchema::new().required("items", broken));
    let errors = meta_errors(&schema);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "$.items");
}

#[test]
fn test_rule_records_are_checked() {
    let schema = Node::scalar(TypeTag::Integer)
        .with_check(Rule::check("positive", |v| v.as_i64().is_some_and(|n| n > 0)).with_message("must be positive"))
        .with_late_check(Rule::check("even", |v| v.as_i64().is_some_and(|n| n % 2 == 0)))
        .into_schema();
    assert!(meta_errors(&schema).is_empty());
}

#[test]
fn test_invalid_schema_error_carries_meta_errors() {
    let broken = Node::new(TypeTag::Map, Variant::Sequence(Schema::any())).into_schema();
    let Err(error) = check_schema(&broken) else {
        panic!("expected the schema to be rejected");
    };
    let SchemaError::InvalidSchema { errors } = &error;
    assert_eq!(errors.len(), 1);
    assert!(error.to_string().starts_with("invalid schema: 1 validation error(s):"));
}

#[test]
fn test_unknown_record_matches_no_schema() {
    let description = Value::structure("mystery", [("a", 1)]);
    let errors = validate_value(&description, &meta_schema());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].render(), "value does not match any of the possible schemas");
}

#[test]
fn test_literal_record_without_value_reports_once() {
    let mut description = Node::literal("on").with_nullable(true).into_schema().describe();
    let Value::Struct(record) = &mut description else {
        panic!("expected a full schema record");
    };
    record.fields.remove(&Key::from("value"));

    let errors = validate_value(&description, &meta_schema());
    assert_eq!(
        errors
            .iter()
            .map(|e| (e.path.to_string(), e.render()))
            .collect::<Vec<_>>(),
        vec![("$".to_string(), "kind `literal` requires a `value` entry".to_string())]
    );
}
