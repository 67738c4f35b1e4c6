use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::Value;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}(?:T[0-9]{2}:[0-9]{2}:[0-9]{2}[A-Z0-9.+:]*)?$")
        .expect("static regex")
});

static DOTTED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2})\.([0-9]{2})\.([0-9]{4})$").expect("static regex")
});

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+\.?[0-9]*$").expect("static regex"));

/// One typed value of the merged table.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(DateTime<Utc>),
}

impl Cell {
    /// Convert a raw JSON value, normalizing strings (see [`normalize_str`]).
    ///
    /// Arrays and objects are kept as their JSON text.
    pub fn from_json(value: &Value) -> Cell {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map_or(Cell::Null, Cell::Float),
            },
            Value::String(s) => normalize_str(s),
            other => Cell::Str(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text form used when a column falls back to strings. `None` for nulls.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Str(s) => Some(s.clone()),
            Cell::Date(d) => Some(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

/// Replace every character outside `[A-Za-z0-9]` with `_` and prefix `_`
/// when the result starts with a digit.
pub fn sanitize_key(key: &str) -> String {
    let mut out: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Interpret a raw string: ISO date/datetime, then `DD.MM.YYYY`, then number.
///
/// Numbers with a leading zero stay strings unless they are a single
/// character, so codes such as `"007"` survive.
pub fn normalize_str(value: &str) -> Cell {
    if ISO_DATE.is_match(value) {
        return parse_iso(value).map_or_else(|| Cell::Str(value.to_string()), Cell::Date);
    }

    if let Some(caps) = DOTTED_DATE.captures(value) {
        let date = (|| {
            let day = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let year = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })();
        return date.map_or_else(|| Cell::Str(value.to_string()), |d| Cell::Date(midnight(d)));
    }

    let trimmed = value.trim();
    if NUMERIC.is_match(trimmed) && (!trimmed.starts_with('0') || value.len() == 1) {
        if let Ok(number) = trimmed.parse::<f64>() {
            return Cell::Float(number);
        }
    }

    Cell::Str(value.to_string())
}

fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    let parsed = if value.len() == 10 {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().map(midnight)
    } else {
        DateTime::parse_from_rfc3339(value)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|n| n.and_utc())
            })
            .or_else(|| {
                DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
                    .ok()
                    .map(|d| d.with_timezone(&Utc))
            })
    }?;

    // millisecond precision, like the source system
    DateTime::from_timestamp_millis(parsed.timestamp_millis())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
