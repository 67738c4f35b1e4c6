use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use cron::Schedule;
use thiserror::Error;

/// A cron expression that could not be parsed.
#[derive(Debug, Error)]
#[error("invalid cron expression `{expression}`: {source}")]
pub struct CronError {
    expression: String,
    #[source]
    source: cron::error::Error,
}

/// Parsed cron expression.
///
/// Accepts the classic five fields (`min hour dom mon dow`, firing at second
/// zero) as well as the six and seven field forms with seconds and year.
/// Numeric days of week use the usual cron numbering: `0` and `7` are
/// Sunday, `1` is Monday.
#[derive(Clone, Debug)]
pub struct CronSchedule {
    expression: String,
    schedule: Schedule,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self, CronError> {
        let expression = expression.trim();
        let mut fields: Vec<String> =
            expression.split_whitespace().map(str::to_string).collect();
        if fields.len() == 5 {
            fields.insert(0, "0".to_string());
        }
        if let Some(dow) = fields.get_mut(DAY_OF_WEEK) {
            *dow = day_of_week_field(dow);
        }
        let normalized = fields.join(" ");

        let schedule = Schedule::from_str(&normalized).map_err(|source| CronError {
            expression: expression.to_string(),
            source,
        })?;

        Ok(Self {
            expression: expression.to_string(),
            schedule,
        })
    }

    /// The expression as given.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First fire time strictly after `after`, in the same time zone.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.schedule.after(after).next()
    }
}

/// Position of the day-of-week field once seconds are present.
const DAY_OF_WEEK: usize = 5;

/// Rewrite a day-of-week field from cron numbering (`0`/`7` = Sunday) to the
/// `cron` crate's (`1` = Sunday). Names and anything unparsable pass through,
/// leaving the error to the parser.
fn day_of_week_field(field: &str) -> String {
    field
        .split(',')
        .map(day_of_week_item)
        .collect::<Vec<_>>()
        .join(",")
}

fn day_of_week_item(item: &str) -> String {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (item, None),
    };

    let bounds: Option<(u32, u32)> = match range {
        "*" | "?" if step.is_none() => return item.to_string(),
        "*" | "?" => Some((0, 6)),
        _ => match range.split_once('-') {
            Some((lo, hi)) => lo.parse().ok().zip(hi.parse().ok()),
            // `n/step` runs to the end of the week
            None => range
                .parse()
                .ok()
                .map(|day| (day, if step.is_some() { 6 } else { day })),
        },
    };
    let step = match step {
        Some(step) => step.parse::<usize>().ok().filter(|s| *s > 0),
        None => Some(1),
    };

    let (Some((lo, hi)), Some(step)) = (bounds, step) else {
        return item.to_string();
    };
    if lo > hi || hi > 7 {
        return item.to_string();
    }

    let mut days: Vec<u32> = (lo..=hi).step_by(step).map(|day| day % 7 + 1).collect();
    days.sort_unstable();
    days.dedup();
    days.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
}

impl FromStr for CronSchedule {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}
