//! `sheetmirror-cache` keeps named spreadsheet ranges in memory and refetches
//! them only when marked stale.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sheetmirror_cache::{ResourceCache, ResourceHandle, StaticSource};
//! use sheetmirror_cache::sheetmirror_model::Tag;
//!
//! let cache = ResourceCache::new(Arc::new(StaticSource::new()));
//! cache.register("rates", ResourceHandle::new("spreadsheet-id", "Rates", "A1:D200"));
//! let rates = cache.get("rates")?;
//! if let Some(rows) = rates.rows(&Tag::number(10.0), &Tag::number(20.0)) {
//!     println!("{} rows", rows.len());
//! }
//! # Ok::<(), sheetmirror_cache::CacheError>(())
//! ```

mod cache;
mod error;
mod handle;
#[cfg(feature = "sheets-api")]
mod sheets_api;
mod source;
pub mod value_range;

pub use cache::{CacheConfig, CacheStats, ResourceCache};
pub use error::{CacheError, Result};
pub use handle::ResourceHandle;
#[cfg(feature = "sheets-api")]
pub use sheets_api::{SheetsApiSource, DEFAULT_BASE_URL};
pub use source::{FetchError, RangeSource, StaticSource};
pub use value_range::parse_value_range;

pub use sheetmirror_model;
