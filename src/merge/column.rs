use polars::prelude::*;

use super::MergeError;
use super::cell::Cell;

const MS_PER_DAY: i64 = 86_400_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NativeKind {
    Bool,
    Number,
    Date,
}

impl NativeKind {
    fn of(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Bool(_) => Some(Self::Bool),
            Cell::Int(_) | Cell::Float(_) => Some(Self::Number),
            Cell::Date(_) => Some(Self::Date),
            Cell::Null | Cell::Str(_) => None,
        }
    }
}

/// Row-indexed cells of one output column plus the flags gathered while
/// filling it.
#[derive(Debug)]
pub(crate) struct ColumnAccumulator {
    name: String,
    cells: Vec<Cell>,
    is_int: bool,
    is_date_without_time: bool,
    is_string: bool,
}

impl ColumnAccumulator {
    pub(crate) fn new(name: String, rows: usize) -> Self {
        Self {
            name,
            cells: vec![Cell::Null; rows],
            is_int: true,
            is_date_without_time: true,
            is_string: false,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Store `cell` at `row`, replacing whatever the row held before.
    pub(crate) fn set(&mut self, row: usize, cell: Cell) {
        match &cell {
            Cell::Float(f) if !is_integral(*f) => self.is_int = false,
            Cell::Date(d) if d.timestamp_millis().rem_euclid(MS_PER_DAY) != 0 => {
                self.is_date_without_time = false
            }
            Cell::Str(_) => self.is_string = true,
            _ => {}
        }
        if let Some(slot) = self.cells.get_mut(row) {
            *slot = cell;
        }
    }

    /// `true` when no row holds a value.
    pub(crate) fn is_null(&self) -> bool {
        self.cells.iter().all(Cell::is_null)
    }

    /// The native kind every value shares. `None` when a string is present,
    /// kinds are mixed, or there is no value at all.
    fn uniform_kind(&self) -> Option<NativeKind> {
        if self.is_string {
            return None;
        }
        let mut kinds = self.cells.iter().filter_map(NativeKind::of);
        let first = kinds.next()?;
        kinds.all(|kind| kind == first).then_some(first)
    }

    pub(crate) fn into_series(self) -> Result<Series, MergeError> {
        let name = PlSmallStr::from(self.name.as_str());

        let Some(kind) = self.uniform_kind() else {
            let values: Vec<Option<String>> = self.cells.iter().map(Cell::to_text).collect();
            return Ok(Series::new(name, values));
        };

        let series = match kind {
            NativeKind::Bool => {
                let values: Vec<Option<bool>> = self
                    .cells
                    .iter()
                    .map(|c| match c {
                        Cell::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
            NativeKind::Number if self.is_int => {
                let values: Vec<Option<i64>> = self
                    .cells
                    .iter()
                    .map(|c| match c {
                        Cell::Int(i) => Some(*i),
                        Cell::Float(f) => Some(*f as i64),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
            NativeKind::Number => {
                let values: Vec<Option<f64>> = self
                    .cells
                    .iter()
                    .map(|c| match c {
                        Cell::Int(i) => Some(*i as f64),
                        Cell::Float(f) => Some(*f),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
            NativeKind::Date if self.is_date_without_time => {
                let days: Vec<Option<i32>> = self
                    .cells
                    .iter()
                    .map(|c| match c {
                        Cell::Date(d) => {
                            i32::try_from(d.timestamp_millis().div_euclid(MS_PER_DAY)).ok()
                        }
                        _ => None,
                    })
                    .collect();
                Series::new(name, days).cast(&DataType::Date)?
            }
            NativeKind::Date => datetime_series(
                name,
                self.cells.iter().map(|c| match c {
                    Cell::Date(d) => Some(d.timestamp_millis()),
                    _ => None,
                }),
            )?,
        };

        Ok(series)
    }
}

/// Millisecond `Datetime` series without a time zone.
pub(crate) fn datetime_series(
    name: PlSmallStr,
    millis: impl Iterator<Item = Option<i64>>,
) -> Result<Series, MergeError> {
    let values: Vec<Option<i64>> = millis.collect();
    Ok(Series::new(name, values).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?)
}

/// Integral and exactly representable as `i64`.
fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}
