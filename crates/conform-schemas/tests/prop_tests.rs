//! Property-based tests for builders, adapters and batch validation

use chrono::NaiveDate;
use conform_schemas::adapters::{date, date_to_value, value_to_date};
use conform_schemas::builder::{integer, string};
use conform_schemas::{validate_batch, validate_value, PathSegment, ValidationConfig, Value};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_between_agrees_with_comparison(n in any::<i64>(), low in -1000i64..0, high in 0i64..1000) {
        let schema = integer().between(low, high).build().unwrap();
        let valid = validate_value(&Value::Integer(n), &schema).is_empty();
        prop_assert_eq!(valid, n >= low && n <= high);
    }

    #[test]
    fn test_max_length_counts_chars(text in "\\PC{0,12}", max in 0usize..12) {
        let schema = string().max_length(max).build().unwrap();
        let valid = validate_value(&Value::from(text.clone()), &schema).is_empty();
        prop_assert_eq!(valid, text.chars().count() <= max);
    }

    #[test]
    fn test_batch_errors_start_with_their_index(values in proptest::collection::vec(any::<i64>(), 0..20)) {
        let schema = integer().min(0).build().unwrap();
        let values: Vec<Value> = values.into_iter().map(Value::Integer).collect();
        let config = ValidationConfig::default().with_max_errors(usize::MAX);
        if let Err(errors) = validate_batch(&values, &schema, &config) {
            for error in errors.iter() {
                let Some(PathSegment::Index(i)) = error.path.segments().first() else {
                    panic!("error without index: {}", error);
                };
                prop_assert!(values[*i].as_i64().is_some_and(|n| n < 0));
            }
        }
    }

    #[test]
    fn test_dates_survive_the_value_form(days in 0i64..200_000) {
        let start = NaiveDate::from_ymd_opt(1600, 1, 1).unwrap();
        let day = start + chrono::Duration::days(days);
        let value = date_to_value(day);
        prop_assert_eq!(value_to_date(&value), Some(day));

        let schema = date().build().unwrap();
        let text = day.format("%Y-%m-%d").to_string();
        prop_assert!(validate_value(&Value::from(text), &schema).is_empty());
    }
}
