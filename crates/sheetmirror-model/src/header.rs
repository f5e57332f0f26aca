use crate::serial::{serial_to_time_of_day, SerialClock};
use crate::value::CellValue;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use std::collections::HashMap;

/// Column lookup for one fetched row set.
///
/// Built from the header row (row 0). Each header cell is keyed by its text
/// form; when a key repeats, the right-most column wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderIndex {
    keys: Vec<String>,
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn from_row(row: &[CellValue]) -> Self {
        let keys: Vec<String> = row.iter().map(ToString::to_string).collect();
        let columns = keys
            .iter()
            .enumerate()
            .map(|(col, key)| (key.clone(), col))
            .collect();
        Self { keys, columns }
    }

    /// Header keys in received order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn column(&self, key: &str) -> Option<usize> {
        self.columns.get(key).copied()
    }

    pub fn value<'r>(&self, row: &'r [CellValue], key: &str) -> Option<&'r CellValue> {
        row.get(self.column(key)?)
    }

    pub fn number(&self, row: &[CellValue], key: &str) -> Option<f64> {
        cell_number(row, self.column(key)?)
    }

    pub fn text<'r>(&self, row: &'r [CellValue], key: &str) -> Option<&'r str> {
        cell_text(row, self.column(key)?)
    }

    /// Serial date-time cell as calendar time.
    pub fn datetime(
        &self,
        row: &[CellValue],
        key: &str,
        clock: &SerialClock,
    ) -> Option<DateTime<Tz>> {
        clock.serial_to_datetime(self.number(row, key)?)
    }

    /// Fractional serial cell as an offset from midnight.
    pub fn time_of_day(&self, row: &[CellValue], key: &str) -> Option<Duration> {
        serial_to_time_of_day(self.number(row, key)?)
    }
}

/// Numeric cell at `col`; `None` when out of bounds or not a number.
pub fn cell_number(row: &[CellValue], col: usize) -> Option<f64> {
    row.get(col)?.as_number()
}

/// String cell at `col`; `None` when out of bounds or not a string.
pub fn cell_text(row: &[CellValue], col: usize) -> Option<&str> {
    row.get(col)?.as_str()
}
