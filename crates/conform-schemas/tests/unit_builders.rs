//! Unit tests for the builder layer
//!
//! Builders are exercised end to end: options are resolved into rules and the
//! resulting schemas are run through the engine.

use conform_schemas::adapters::{date, datetime, time};
use conform_schemas::builder::*;
use conform_schemas::{
    check_schema, validate_value, BuildError, MapSchema, Rule, Schema, TypeTag, ValidationError,
    Value,
};
use pretty_assertions::assert_eq;

fn rendered(errors: &[ValidationError]) -> Vec<(String, String)> {
    errors
        .iter()
        .map(|e| (e.path.to_string(), e.render()))
        .collect()
}

fn at(path: &str, message: &str) -> (String, String) {
    (path.to_string(), message.to_string())
}

#[cfg(test)]
mod options {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numeric_options() {
        let schema = integer().between(1, 5).build().unwrap();
        assert!(validate_value(&Value::from(3), &schema).is_empty());
        assert_eq!(
            rendered(&validate_value(&Value::from(9), &schema)),
            vec![at("$", "must be between 1 and 5")]
        );
    }

    #[test]
    fn test_all_failing_options_are_reported() {
        let schema = string().min_length(5).format("^[0-9]+$").build().unwrap();
        let errors = validate_value(&Value::from("ab"), &schema);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].render(), "length must be ≥ 5");
    }

    #[test]
    fn test_collection_options() {
        let schema = list(Schema::any()).non_empty().unique().build().unwrap();
        assert_eq!(
            rendered(&validate_value(&Value::list(Vec::<Value>::new()), &schema)),
            vec![at("$", "must not be empty")]
        );
        assert_eq!(
            rendered(&validate_value(&Value::list(["a", "a"]), &schema)),
            vec![at("$", "items must be unique")]
        );
    }

    #[test]
    fn test_options_run_on_cast_values() {
        let schema = string().cast_from(TypeTag::Integer).length(3).build().unwrap();
        assert!(validate_value(&Value::from(123), &schema).is_empty());
        assert_eq!(
            rendered(&validate_value(&Value::from(12), &schema)),
            vec![at("$", "length must be 3")]
        );
    }

    #[test]
    fn test_invalid_options_fail_build() {
        assert!(matches!(
            float().format("x").build(),
            Err(BuildError::Unsupported { option: "format", .. })
        ));
        assert!(matches!(
            string().format("[").build(),
            Err(BuildError::InvalidPattern(_))
        ));
        assert!(matches!(
            number().between(5, 1).build(),
            Err(BuildError::InvalidArgument { option: "between", .. })
        ));
    }

    #[test]
    fn test_membership_on_any() {
        let schema = any().not_in([Value::symbol("banned")]).build().unwrap();
        assert_eq!(
            rendered(&validate_value(&Value::symbol("banned"), &schema)),
            vec![at("$", "must not be one of :banned")]
        );
    }
}

#[cfg(test)]
mod envelope {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_on_error_replaces_built_in_messages() {
        let schema = string().min_length(3).max_length(1).on_error("bad code").build().unwrap();
        assert_eq!(
            rendered(&validate_value(&Value::from("ab"), &schema)),
            vec![at("$", "bad code")]
        );
    }

    #[test]
    fn test_late_check_after_built_ins() {
        let schema = integer()
            .min(0)
            .late_check(Rule::check("even", |v| v.as_i64().is_some_and(|n| n % 2 == 0)).with_message("must be even"))
            .build()
            .unwrap();
        assert_eq!(rendered(&validate_value(&Value::from(-1), &schema)), vec![at("$", "must be ≥ 0")]);
        assert_eq!(rendered(&validate_value(&Value::from(3), &schema)), vec![at("$", "must be even")]);
    }

    #[test]
    fn test_nullable_builder() {
        let schema = symbol().nullable(true).build().unwrap();
        assert!(validate_value(&Value::Null, &schema).is_empty());
    }

    #[test]
    fn test_custom_converter() {
        let schema = integer()
            .cast_from_with(TypeTag::Boolean, "bool_to_int", |v| {
                Ok(Value::Integer(i64::from(v.as_bool() == Some(true))))
            })
            .build()
            .unwrap();
        assert!(validate_value(&Value::Bool(true), &schema).is_empty());
    }
}

#[cfg(test)]
mod composites {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_map_of_validates_every_value() {
        let schema = map_of(integer().min(0).build().unwrap()).build().unwrap();
        let value = Value::map([("a", 1), ("b", -2)]);
        assert_eq!(rendered(&validate_value(&value, &schema)), vec![at("$.b", "must be ≥ 0")]);
    }

    #[test]
    fn test_tuple_and_literal() {
        let schema = tuple([literal("ok").build().unwrap(), integer().build().unwrap()])
            .build()
            .unwrap();
        assert!(validate_value(&Value::tuple([Value::from("ok"), Value::from(1)]), &schema).is_empty());
        assert_eq!(
            rendered(&validate_value(&Value::tuple([Value::from("ko"), Value::from(1)]), &schema)),
            vec![at("$[0]", "expected literal value \"ok\", got \"ko\"")]
        );
    }

    #[test]
    fn test_structure_with_fields() {
        let schema = structure("Point", Some(MapSchema::new().required("x", number().build().unwrap())))
            .build()
            .unwrap();
        assert!(validate_value(&Value::structure("Point", [("x", 1.5)]), &schema).is_empty());
    }

    #[test]
    fn test_recursive_tree_with_lazy() {
        fn tree() -> Schema {
            Schema::from(
                MapSchema::new()
                    .required("value", Schema::from(conform_schemas::Node::scalar(TypeTag::Integer)))
                    .optional("children", Schema::from([lazy("tree", tree)])),
            )
        }
        let leaf = Value::map([("value", Value::from("x"))]);
        let root = Value::map([
            ("value", Value::from(1)),
            ("children", Value::list([leaf])),
        ]);
        let errors = validate_value(&root, &tree());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "$.children[0].value");
    }

    #[test]
    fn test_select_by_tag() {
        let shape = select("shape", |v| match v.get("kind").and_then(Value::as_str) {
            Some("circle") => Some(Schema::from(
                MapSchema::new()
                    .required("kind", "circle")
                    .required("radius", number().min(0).build().ok()?),
            )),
            _ => None,
        });
        let circle = Value::map([("kind", Value::from("circle")), ("radius", Value::from(-1))]);
        assert_eq!(rendered(&validate_value(&circle, &shape)), vec![at("$.radius", "must be ≥ 0")]);
        assert_eq!(validate_value(&Value::map([("kind", "square")]), &shape).len(), 1);
    }
}

#[cfg(test)]
mod well_formed {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_built_schemas_pass_the_meta_schema() {
        let schemas = vec![
            string().min_length(1).is_in(["a", "b"]).build().unwrap(),
            list(integer().build().unwrap()).unique().nullable(false).build().unwrap(),
            map_of(float().build().unwrap()).on_error("bad").build().unwrap(),
            date().build().unwrap(),
            time().build().unwrap(),
            datetime().build().unwrap(),
            one_of([boolean().build().unwrap(), literal(0).build().unwrap()]),
        ];
        for schema in schemas {
            assert!(check_schema(&schema).is_ok(), "rejected {}", schema);
        }
    }
}
