//! Date and time adapters
//!
//! Calendar values travel through the engine as structs (`Date`, `Time`,
//! `DateTime`) with integer fields. The schemas here accept those structs, or
//! strings in ISO-8601 / RFC 3339 form which they parse with `chrono`.
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use crate::builder::{structure, SchemaBuilder};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike};
use conform_core::{MapSchema, Message, Node, Rule, TypeTag, Value};
use tracing::debug;

pub const DATE: &str = "Date";
pub const TIME: &str = "Time";
pub const DATETIME: &str = "DateTime";

const DATE_FIELDS: [&str; 3] = ["year", "month", "day"];
const TIME_FIELDS: [&str; 4] = ["hour", "minute", "second", "nanosecond"];
const OFFSET_FIELD: &str = "offset";

/// A calendar date, castable from `"YYYY-MM-DD"`
pub fn date() -> SchemaBuilder {
    structure(DATE, Some(integer_fields(DATE_FIELDS)))
        .cast_from_with(TypeTag::String, "parse_date", |value| {
            parse(value, DATE, |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(date_to_value))
        })
        .late_check(
            Rule::check("valid_date", |v| value_to_date(v).is_some())
                .with_message("is not a valid date"),
        )
}

/// A time of day, castable from `"HH:MM:SS"` with optional fraction
pub fn time() -> SchemaBuilder {
    structure(TIME, Some(integer_fields(TIME_FIELDS)))
        .cast_from_with(TypeTag::String, "parse_time", |value| {
            parse(value, TIME, |s| NaiveTime::parse_from_str(s, "%H:%M:%S%.f").map(time_to_value))
        })
        .late_check(
            Rule::check("valid_time", |v| value_to_time(v).is_some())
                .with_message("is not a valid time"),
        )
}

/// A date and time with a UTC offset, castable from RFC 3339 strings
pub fn datetime() -> SchemaBuilder {
    let fields = DATE_FIELDS
        .into_iter()
        .chain(TIME_FIELDS)
        .chain([OFFSET_FIELD])
        .fold(MapSchema::new(), |fields, name| {
            fields.required(name, Node::scalar(TypeTag::Integer))
        });
    structure(DATETIME, Some(fields))
        .cast_from_with(TypeTag::String, "parse_datetime", |value| {
            parse(value, DATETIME, |s| DateTime::parse_from_rfc3339(s).map(datetime_to_value))
        })
        .late_check(
            Rule::check("valid_datetime", |v| value_to_datetime(v).is_some())
                .with_message("is not a valid datetime"),
        )
}

fn integer_fields<const N: usize>(names: [&str; N]) -> MapSchema {
    names.into_iter().fold(MapSchema::new(), |fields, name| {
        fields.required(name, Node::scalar(TypeTag::Integer))
    })
}

fn parse<F>(value: &Value, target: &str, parse: F) -> Result<Value, Message>
where
    F: FnOnce(&str) -> Result<Value, chrono::ParseError>,
{
    let text = value.as_str().unwrap_or_default();
    parse(text).map_err(|e| {
        debug!(input = text, error = %e, "failed to parse {}", target);
        Message::text(format!("cannot be cast to `{}`", target))
    })
}

pub fn date_to_value(date: NaiveDate) -> Value {
    Value::structure(
        DATE,
        [
            ("year", i64::from(date.year())),
            ("month", i64::from(date.month())),
            ("day", i64::from(date.day())),
        ],
    )
}

pub fn time_to_value(time: NaiveTime) -> Value {
    Value::structure(TIME, time_fields(&time))
}

pub fn datetime_to_value(datetime: DateTime<FixedOffset>) -> Value {
    let date = datetime.date_naive();
    let mut fields = vec![
        ("year", i64::from(date.year())),
        ("month", i64::from(date.month())),
        ("day", i64::from(date.day())),
    ];
    fields.extend(time_fields(&datetime.time()));
    fields.push((OFFSET_FIELD, i64::from(datetime.offset().local_minus_utc())));
    Value::structure(DATETIME, fields)
}

fn time_fields(time: &NaiveTime) -> [(&'static str, i64); 4] {
    [
        ("hour", i64::from(time.hour())),
        ("minute", i64::from(time.minute())),
        ("second", i64::from(time.second())),
        ("nanosecond", i64::from(time.nanosecond())),
    ]
}

/// Read a `Date` struct back into a chrono date
pub fn value_to_date(value: &Value) -> Option<NaiveDate> {
    let date = named(value, DATE)?;
    let year = i32::try_from(int_field(date, "year")?).ok()?;
    NaiveDate::from_ymd_opt(year, u32_field(date, "month")?, u32_field(date, "day")?)
}

/// Read a `Time` struct back into a chrono time
pub fn value_to_time(value: &Value) -> Option<NaiveTime> {
    read_time(named(value, TIME)?)
}

/// Read a `DateTime` struct back into a chrono datetime
pub fn value_to_datetime(value: &Value) -> Option<DateTime<FixedOffset>> {
    let datetime = named(value, DATETIME)?;
    let year = i32::try_from(int_field(datetime, "year")?).ok()?;
    let (month, day) = (u32_field(datetime, "month")?, u32_field(datetime, "day")?);
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = read_time(datetime)?;
    let offset = FixedOffset::east_opt(i32::try_from(int_field(datetime, OFFSET_FIELD)?).ok()?)?;
    date.and_time(time).and_local_timezone(offset).single()
}

fn read_time(value: &Value) -> Option<NaiveTime> {
    NaiveTime::from_hms_nano_opt(
        u32_field(value, "hour")?,
        u32_field(value, "minute")?,
        u32_field(value, "second")?,
        u32_field(value, "nanosecond")?,
    )
}

fn named<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.as_struct().filter(|s| s.name == name).map(|_| value)
}

fn int_field(value: &Value, name: &str) -> Option<i64> {
    value.get(name)?.as_i64()
}

fn u32_field(value: &Value, name: &str) -> Option<u32> {
    u32::try_from(int_field(value, name)?).ok()
}
