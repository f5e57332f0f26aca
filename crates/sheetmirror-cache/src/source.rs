use crate::handle::ResourceHandle;
use sheetmirror_model::Row;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a [`RangeSource`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("not authorized: {0}")]
    Auth(String),
    #[error("unexpected status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("could not decode range payload: {0}")]
    Decode(String),
    #[error("fetch timed out")]
    TimedOut,
    #[error("fetch cancelled")]
    Cancelled,
    #[error("range not found: {0}")]
    NotFound(String),
}

/// The remote data source behind the cache.
///
/// `fetch` returns every row of the range, header first. Cells holding dates
/// or times must be delivered as serial numbers. When `timeout` is set the
/// source should give up after that long and report [`FetchError::TimedOut`].
pub trait RangeSource: Send + Sync {
    fn fetch(&self, handle: &ResourceHandle, timeout: Option<Duration>)
        -> Result<Vec<Row>, FetchError>;
}

/// In-memory source keyed by [`ResourceHandle::a1_range`].
///
/// Ranges can be replaced at any time; the cache only sees the new rows on
/// its next refresh.
#[derive(Debug, Default)]
pub struct StaticSource {
    ranges: Mutex<HashMap<String, Vec<Row>>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rows served for `a1_range`, returning the previous rows.
    pub fn insert(&self, a1_range: impl Into<String>, rows: Vec<Row>) -> Option<Vec<Row>> {
        self.ranges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(a1_range.into(), rows)
    }

    pub fn remove(&self, a1_range: &str) -> Option<Vec<Row>> {
        self.ranges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(a1_range)
    }
}

impl RangeSource for StaticSource {
    fn fetch(
        &self,
        handle: &ResourceHandle,
        _timeout: Option<Duration>,
    ) -> Result<Vec<Row>, FetchError> {
        let key = handle.a1_range();
        self.ranges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .ok_or(FetchError::NotFound(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetmirror_model::CellValue;

    #[test]
    fn static_source_serves_by_a1_range() {
        let source = StaticSource::new();
        let handle = ResourceHandle::new("id", "Rates", "A1:B3");
        assert_eq!(
            source.fetch(&handle, None),
            Err(FetchError::NotFound("Rates!A1:B3".to_string()))
        );

        let rows = vec![vec![CellValue::from("Tag")], vec![CellValue::from(1.0)]];
        assert_eq!(source.insert("Rates!A1:B3", rows.clone()), None);
        assert_eq!(source.fetch(&handle, None), Ok(rows));

        assert!(source.remove("Rates!A1:B3").is_some());
        assert!(source.fetch(&handle, None).is_err());
    }
}
