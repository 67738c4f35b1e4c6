use chrono::{TimeZone, Utc};
use icm_extract::merge::{MergeInput, RawRecord, merge_and_infer};
use polars::prelude::*;
use serde_json::{Value, json};

fn rows(values: Value) -> Vec<RawRecord> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
}

fn input(values: Value) -> MergeInput {
    MergeInput {
        rows: rows(values),
        key_field: "id".into(),
        extraction_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        ..Default::default()
    }
}

fn names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|n| n.to_string()).collect()
}

#[test]
fn integral_numbers_become_int64() {
    let df = merge_and_infer(&input(json!([{ "n": "12" }, { "n": 3 }, { "n": null }]))).unwrap();
    let col = df.column("n").unwrap();
    assert_eq!(col.dtype(), &DataType::Int64);
    let values: Vec<Option<i64>> = col.i64().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some(12), Some(3), None]);
}

#[test]
fn fractional_numbers_become_float64() {
    let df = merge_and_infer(&input(json!([{ "n": "1.5" }, { "n": 2 }]))).unwrap();
    let col = df.column("n").unwrap();
    assert_eq!(col.dtype(), &DataType::Float64);
    assert_eq!(col.f64().unwrap().get(0), Some(1.5));
    assert_eq!(col.f64().unwrap().get(1), Some(2.0));
}

#[test]
fn date_only_values_become_date() {
    let rows = json!([{ "d": "2024-01-05" }, { "d": "06.01.2024" }]);
    let df = merge_and_infer(&input(rows)).unwrap();
    let col = df.column("d").unwrap();
    assert_eq!(col.dtype(), &DataType::Date);
    let days = col.cast(&DataType::Int32).unwrap();
    assert_eq!(days.i32().unwrap().get(0), Some(19727));
    assert_eq!(days.i32().unwrap().get(1), Some(19728));
}

#[test]
fn any_time_of_day_makes_the_column_datetime() {
    let df = merge_and_infer(&input(json!([
        { "d": "2024-01-05" },
        { "d": "2024-01-05T10:00:00Z" }
    ])))
    .unwrap();
    let col = df.column("d").unwrap();
    assert_eq!(col.dtype(), &DataType::Datetime(TimeUnit::Milliseconds, None));
    let ms = col.cast(&DataType::Int64).unwrap();
    assert_eq!(ms.i64().unwrap().get(0), Some(1_704_412_800_000));
    assert_eq!(ms.i64().unwrap().get(1), Some(1_704_448_800_000));
}

#[test]
fn midnight_datetimes_become_date() {
    let df = merge_and_infer(&input(json!([{ "d": "2024-01-05T00:00:00Z" }]))).unwrap();
    assert_eq!(df.column("d").unwrap().dtype(), &DataType::Date);
}

#[test]
fn leading_zero_codes_keep_the_column_textual() {
    let df = merge_and_infer(&input(json!([{ "c": "007" }, { "c": "12" }, { "c": "3" }]))).unwrap();
    let col = df.column("c").unwrap();
    assert_eq!(col.dtype(), &DataType::String);
    let values: Vec<Option<&str>> = col.str().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some("007"), Some("12"), Some("3")]);
}

#[test]
fn zero_is_numeric_until_a_string_shows_up() {
    let df = merge_and_infer(&input(json!([{ "c": "0" }, { "c": "12" }]))).unwrap();
    assert_eq!(df.column("c").unwrap().dtype(), &DataType::Int64);

    let df = merge_and_infer(&input(json!([{ "c": "0" }, { "c": "12" }, { "c": "007" }]))).unwrap();
    let values: Vec<Option<&str>> = df.column("c").unwrap().str().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some("0"), Some("12"), Some("007")]);
}

#[test]
fn stringified_columns_keep_nulls_and_render_dates() {
    let df = merge_and_infer(&input(json!([
        { "m": "2024-01-05" },
        { "m": null },
        { "m": "n/a" },
        { "m": true }
    ])))
    .unwrap();
    let values: Vec<Option<&str>> = df.column("m").unwrap().str().unwrap().into_iter().collect();
    assert_eq!(
        values,
        vec![Some("2024-01-05T00:00:00.000Z"), None, Some("n/a"), Some("true")]
    );
}

#[test]
fn booleans_stay_boolean() {
    let df = merge_and_infer(&input(json!([{ "b": true }, { "b": false }, {}]))).unwrap();
    let col = df.column("b").unwrap();
    assert_eq!(col.dtype(), &DataType::Boolean);
    let values: Vec<Option<bool>> = col.bool().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some(true), Some(false), None]);
}

#[test]
fn all_null_columns_are_dropped() {
    let df = merge_and_infer(&input(json!([{ "a": 1, "gone": null }, { "a": 2 }]))).unwrap();
    assert_eq!(names(&df), vec!["a", "ExtractionTime"]);
}

#[test]
fn colliding_names_share_a_column() {
    let df = merge_and_infer(&input(json!([{ "a b": 1 }, { "a-b": 2 }]))).unwrap();
    assert_eq!(names(&df), vec!["a_b", "ExtractionTime"]);
    let values: Vec<Option<i64>> = df.column("a_b").unwrap().i64().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some(1), Some(2)]);
}

#[test]
fn mixed_native_kinds_fall_back_to_strings() {
    let rows = json!([{ "flag": true, "n": 1 }, { "flag": 1, "n": 2 }]);
    let df = merge_and_infer(&input(rows)).unwrap();

    let flag = df.column("flag").unwrap();
    assert_eq!(flag.dtype(), &DataType::String);
    let values: Vec<Option<&str>> = flag.str().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some("true"), Some("1")]);
    assert_eq!(df.column("n").unwrap().dtype(), &DataType::Int64);
}

#[test]
fn numbers_and_dates_fall_back_to_strings() {
    let rows = json!([{ "x": 1 }, { "x": "2024-01-05" }, { "x": null }]);
    let df = merge_and_infer(&input(rows)).unwrap();

    let values: Vec<Option<&str>> = df.column("x").unwrap().str().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some("1"), Some("2024-01-05T00:00:00.000Z"), None]);
}

#[test]
fn row_count_and_order_follow_the_input() {
    let df = merge_and_infer(&input(json!([{ "i": 3 }, { "j": "x" }, { "i": 1 }]))).unwrap();
    assert_eq!(df.height(), 3);
    let values: Vec<Option<i64>> = df.column("i").unwrap().i64().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some(3), None, Some(1)]);
}

#[test]
fn extraction_time_is_constant_and_last() {
    let df = merge_and_infer(&input(json!([{ "a": 1 }, { "a": 2 }]))).unwrap();
    let last = df.get_columns().last().unwrap();
    assert_eq!(last.name().as_str(), "ExtractionTime");
    assert_eq!(last.dtype(), &DataType::Datetime(TimeUnit::Milliseconds, None));
    let ms = last.cast(&DataType::Int64).unwrap();
    let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap().timestamp_millis();
    assert!(ms.i64().unwrap().into_iter().all(|v| v == Some(expected)));
}

#[test]
fn empty_input_still_has_the_timestamp_column() {
    let df = merge_and_infer(&input(json!([]))).unwrap();
    assert_eq!(df.height(), 0);
    assert_eq!(names(&df), vec!["ExtractionTime"]);
}
