//! `sheetmirror-model` holds the in-memory side of a mirrored spreadsheet range.
//!
//! The crate does no I/O. It provides:
//! - [`CellValue`], the scalar cell type delivered by the values API
//! - [`SerialClock`], serial day-count <-> calendar time conversion with the
//!   fixed-offset to DST-zone adjustment
//! - [`HeaderIndex`], column lookup by header text plus typed accessors
//! - [`SortedResource`], rows ordered by their column-0 [`Tag`] with inclusive
//!   binary-search range queries

mod header;
mod resource;
pub mod serial;
mod tag;
mod value;

pub use header::{cell_number, cell_text, HeaderIndex};
pub use resource::{BuildError, SortedResource};
pub use serial::{
    datetime_to_serial, dst_adjust, midnight, monday, serial_epoch, serial_to_time_of_day,
    SerialClock,
};
pub use tag::{compare_tags, ordering_for, Tag, TagKind, TagOrdering};
pub use value::{CellValue, Row};

pub use chrono_tz::Tz;
