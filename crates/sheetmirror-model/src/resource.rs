use crate::header::HeaderIndex;
use crate::serial::SerialClock;
use crate::tag::{compare_tags, ordering_for, Tag, TagKind, TagOrdering};
use crate::value::{CellValue, Row};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("fetched range has no rows (expected a header row)")]
    MissingHeader,
}

/// One fetched table, ordered by the tag in column 0.
///
/// A resource is built in full by [`SortedResource::build`] and never mutated
/// afterwards, so a shared reference is a consistent snapshot.
///
/// `rows` and `tags` are parallel: `tags[i]` is the tag read from `rows[i][0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedResource {
    header: HeaderIndex,
    rows: Vec<Row>,
    tags: Vec<Tag>,
    ordering: TagOrdering,
}

impl SortedResource {
    /// Build from raw fetched rows: row 0 is the header, the rest is data.
    ///
    /// Data rows are stably sorted by tag, so rows sharing a tag keep their
    /// fetched order. Rows with a blank tag sort first. If the remaining tags
    /// do not all share a variant the resource is ordered by text form (see
    /// [`TagOrdering::Text`]).
    pub fn build(data: Vec<Row>, kind: TagKind, clock: &SerialClock) -> Result<Self, BuildError> {
        let mut data = data.into_iter();
        let header_row = data.next().ok_or(BuildError::MissingHeader)?;
        let header = HeaderIndex::from_row(&header_row);

        let mut entries: Vec<(Tag, Row)> = data
            .map(|row| {
                let tag = Tag::from_cell(row.first().unwrap_or(&CellValue::Empty), kind, clock);
                (tag, row)
            })
            .collect();

        let ordering = ordering_for(entries.iter().map(|(tag, _)| tag));
        if ordering == TagOrdering::Text {
            log::debug!(
                "tags of {} rows do not share a type; ordering by text",
                entries.len()
            );
        }
        entries.sort_by(|(a, _), (b, _)| compare_tags(a, b, ordering));
        let (tags, rows) = entries.into_iter().unzip();

        Ok(Self {
            header,
            rows,
            tags,
            ordering,
        })
    }

    pub fn header(&self) -> &HeaderIndex {
        &self.header
    }

    pub fn ordering(&self) -> TagOrdering {
        self.ordering
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every data row in tag order.
    pub fn all_rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Text form of every row tag, in tag order.
    pub fn row_tags(&self) -> Vec<String> {
        self.tags.iter().map(ToString::to_string).collect()
    }

    pub fn column_keys(&self) -> &[String] {
        self.header.keys()
    }

    /// Rows whose tag lies in `[start, end]`, both ends inclusive.
    ///
    /// Every row sharing the `end` tag is included. Returns `None` when no row
    /// falls in the range (including `start > end`).
    ///
    /// `start` and `end` should be of the same tag family the resource was
    /// built with; a mismatched bound compares by text form.
    pub fn rows(&self, start: &Tag, end: &Tag) -> Option<&[Row]> {
        let lo = self.lower_bound(start);
        let mut hi = self.lower_bound(end);
        while hi < self.tags.len() && self.compare(&self.tags[hi], end) == Ordering::Equal {
            hi += 1;
        }
        if lo >= hi {
            return None;
        }
        Some(&self.rows[lo..hi])
    }

    /// Rows whose tag equals `tag`.
    pub fn find(&self, tag: &Tag) -> Option<&[Row]> {
        self.rows(tag, tag)
    }

    pub fn value(&self, row: usize, key: &str) -> Option<&CellValue> {
        self.header.value(self.rows.get(row)?, key)
    }

    pub fn number(&self, row: usize, key: &str) -> Option<f64> {
        self.header.number(self.rows.get(row)?, key)
    }

    pub fn text(&self, row: usize, key: &str) -> Option<&str> {
        self.header.text(self.rows.get(row)?, key)
    }

    pub fn datetime(&self, row: usize, key: &str, clock: &SerialClock) -> Option<DateTime<Tz>> {
        self.header.datetime(self.rows.get(row)?, key, clock)
    }

    pub fn time_of_day(&self, row: usize, key: &str) -> Option<Duration> {
        self.header.time_of_day(self.rows.get(row)?, key)
    }

    /// First index whose tag is not less than `tag`.
    fn lower_bound(&self, tag: &Tag) -> usize {
        self.tags
            .partition_point(|t| self.compare(t, tag) == Ordering::Less)
    }

    fn compare(&self, a: &Tag, b: &Tag) -> Ordering {
        compare_tags(a, b, self.ordering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(tags: &[f64]) -> SortedResource {
        let mut data = vec![vec![CellValue::from("Tag"), CellValue::from("Seq")]];
        for (seq, tag) in tags.iter().enumerate() {
            data.push(vec![CellValue::Number(*tag), CellValue::Number(seq as f64)]);
        }
        SortedResource::build(data, TagKind::Auto, &SerialClock::default()).unwrap()
    }

    #[test]
    fn empty_fetch_has_no_header() {
        let err = SortedResource::build(Vec::new(), TagKind::Auto, &SerialClock::default());
        assert_eq!(err, Err(BuildError::MissingHeader));
    }

    #[test]
    fn header_only_is_an_empty_table() {
        let data = vec![vec![CellValue::from("Tag")]];
        let resource = SortedResource::build(data, TagKind::Auto, &SerialClock::default()).unwrap();
        assert!(resource.is_empty());
        assert_eq!(resource.column_keys(), ["Tag"]);
        assert_eq!(resource.rows(&Tag::number(0.0), &Tag::number(10.0)), None);
    }

    #[test]
    fn duplicates_keep_fetch_order() {
        let resource = table(&[5.0, 3.0, 3.0, 1.0]);
        let seqs: Vec<f64> = (0..resource.len())
            .map(|i| resource.number(i, "Seq").unwrap())
            .collect();
        assert_eq!(seqs, vec![3.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn reversed_range_is_not_found() {
        let resource = table(&[1.0, 2.0, 3.0]);
        assert_eq!(resource.rows(&Tag::number(3.0), &Tag::number(1.0)), None);
    }

    #[test]
    fn row_accessors_follow_sort_order() {
        let resource = table(&[2.0, 1.0]);
        assert_eq!(resource.number(0, "Tag"), Some(1.0));
        assert_eq!(resource.value(1, "Tag"), Some(&CellValue::Number(2.0)));
        assert_eq!(resource.text(0, "Tag"), None);
        assert_eq!(resource.number(2, "Tag"), None);
        assert_eq!(resource.row_tags(), vec!["1".to_string(), "2".to_string()]);
    }
}
