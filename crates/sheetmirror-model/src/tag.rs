use crate::serial::SerialClock;
use crate::value::{fmt_number, CellValue};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Sort/lookup key taken from column 0 of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    DateTime(DateTime<Tz>),
    Number(f64),
    Text(String),
}

/// How column 0 is read when a resource is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// Numbers stay numbers; everything else is text.
    #[default]
    Auto,
    /// Every tag is compared by its text form.
    Text,
    /// Numeric tags are serial date-times.
    DateTime,
}

/// Comparison mode chosen for one built resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagOrdering {
    /// All tags share a variant; compare chronologically / numerically / lexicographically.
    Native,
    /// Tags of different variants; every comparison uses the text forms.
    Text,
}

impl Tag {
    /// Read a tag cell according to `kind`.
    pub fn from_cell(cell: &CellValue, kind: TagKind, clock: &SerialClock) -> Tag {
        match (kind, cell) {
            (TagKind::Text, cell) => Tag::Text(cell.to_string()),
            (TagKind::DateTime, CellValue::Number(n)) => match clock.serial_to_datetime(*n) {
                Some(dt) => Tag::DateTime(dt),
                None => Tag::number(*n),
            },
            (_, CellValue::Number(n)) => Tag::number(*n),
            (_, cell) => Tag::Text(cell.to_string()),
        }
    }

    /// Numeric tag with `-0` folded into `0`.
    pub fn number(n: f64) -> Tag {
        Tag::Number(fold_zero(n))
    }

    pub fn text(s: impl Into<String>) -> Tag {
        Tag::Text(s.into())
    }

    /// Tag of a blank cell. Blank tags sort before every other tag and do
    /// not count towards the choice of [`TagOrdering`].
    pub fn is_blank(&self) -> bool {
        matches!(self, Tag::Text(s) if s.is_empty())
    }

    fn same_variant(&self, other: &Tag) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl From<DateTime<Tz>> for Tag {
    fn from(value: DateTime<Tz>) -> Self {
        Tag::DateTime(value)
    }
}

impl From<f64> for Tag {
    fn from(value: f64) -> Self {
        Tag::number(value)
    }
}

impl From<i32> for Tag {
    fn from(value: i32) -> Self {
        Tag::number(f64::from(value))
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::Text(value.to_string())
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::Text(value)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Tag::Number(n) => fmt_number(*n, f),
            Tag::Text(s) => f.write_str(s),
        }
    }
}

// `total_cmp` orders -0 below 0; tags treat them as equal.
fn fold_zero(n: f64) -> f64 {
    if n == 0.0 {
        0.0
    } else {
        n
    }
}

/// Three-way tag comparison.
///
/// Blank tags come first. Under [`TagOrdering::Native`] matching variants
/// compare by value and a mismatched pair falls back to comparing text forms.
/// Under [`TagOrdering::Text`] every pair compares text forms.
pub fn compare_tags(a: &Tag, b: &Tag, ordering: TagOrdering) -> Ordering {
    match (a.is_blank(), b.is_blank()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }
    if ordering == TagOrdering::Native {
        match (a, b) {
            (Tag::DateTime(x), Tag::DateTime(y)) => return x.cmp(y),
            (Tag::Number(x), Tag::Number(y)) => {
                return fold_zero(*x).total_cmp(&fold_zero(*y));
            }
            (Tag::Text(x), Tag::Text(y)) => return x.cmp(y),
            _ => {}
        }
    }
    match (a, b) {
        (Tag::Text(x), Tag::Text(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Pick the ordering for a set of tags: native when every non-blank tag
/// shares a variant.
pub fn ordering_for<'a>(tags: impl IntoIterator<Item = &'a Tag>) -> TagOrdering {
    let mut tags = tags.into_iter().filter(|t| !t.is_blank());
    let Some(first) = tags.next() else {
        return TagOrdering::Native;
    };
    if tags.all(|t| t.same_variant(first)) {
        TagOrdering::Native
    } else {
        TagOrdering::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn auto_kind_keeps_numbers_and_formats_the_rest() {
        let clock = SerialClock::default();
        let read = |cell: CellValue| Tag::from_cell(&cell, TagKind::Auto, &clock);
        assert_eq!(read(CellValue::Number(2.0)), Tag::Number(2.0));
        assert_eq!(read(CellValue::from("x")), Tag::text("x"));
        assert_eq!(read(CellValue::Boolean(false)), Tag::text("FALSE"));
        assert_eq!(read(CellValue::Empty), Tag::text(""));
    }

    #[test]
    fn text_kind_formats_numbers() {
        let clock = SerialClock::default();
        assert_eq!(
            Tag::from_cell(&CellValue::Number(10.0), TagKind::Text, &clock),
            Tag::text("10")
        );
    }

    #[test]
    fn datetime_kind_converts_serials() {
        let clock = SerialClock::default();
        let read = |cell: CellValue| Tag::from_cell(&cell, TagKind::DateTime, &clock);
        assert_eq!(
            read(CellValue::Number(45_000.5)),
            Tag::DateTime(clock.serial_to_datetime(45_000.5).unwrap())
        );
        // Negative serials are not date-times; keep the raw number.
        assert_eq!(read(CellValue::Number(-1.0)), Tag::Number(-1.0));
        assert_eq!(read(CellValue::from("n/a")), Tag::text("n/a"));
    }

    #[test]
    fn native_ordering_dispatches_on_variant() {
        let native = TagOrdering::Native;
        let two = Tag::number(2.0);
        let ten = Tag::number(10.0);
        assert_eq!(compare_tags(&two, &ten, native), Ordering::Less);
        assert_eq!(compare_tags(&Tag::text("10"), &Tag::text("2"), native), Ordering::Less);
        assert_eq!(compare_tags(&Tag::number(-0.0), &Tag::number(0.0), native), Ordering::Equal);
        // Built directly, bypassing `Tag::number`.
        assert_eq!(compare_tags(&Tag::Number(-0.0), &Tag::Number(0.0), native), Ordering::Equal);
        // Mismatched variants compare as text: "2" > "10".
        assert_eq!(compare_tags(&two, &Tag::text("10"), native), Ordering::Greater);
    }

    #[test]
    fn text_ordering_ignores_variant() {
        assert_eq!(
            compare_tags(&Tag::number(2.0), &Tag::number(10.0), TagOrdering::Text),
            Ordering::Greater
        );
    }

    #[test]
    fn ordering_is_native_only_for_homogeneous_tags() {
        let numbers = vec![Tag::number(1.0), Tag::number(2.0)];
        let mixed = vec![Tag::number(1.0), Tag::text("a")];
        assert_eq!(ordering_for(&numbers), TagOrdering::Native);
        assert_eq!(ordering_for(&mixed), TagOrdering::Text);
        assert_eq!(ordering_for(&Vec::<Tag>::new()), TagOrdering::Native);

        let with_blanks = vec![Tag::text(""), Tag::number(1.0), Tag::text("")];
        assert_eq!(ordering_for(&with_blanks), TagOrdering::Native);
        assert_eq!(ordering_for(&[Tag::text("")]), TagOrdering::Native);
    }

    #[test]
    fn blank_tags_sort_first_under_either_ordering() {
        let blank = Tag::text("");
        for ordering in [TagOrdering::Native, TagOrdering::Text] {
            assert_eq!(compare_tags(&blank, &Tag::number(-5.0), ordering), Ordering::Less);
            assert_eq!(compare_tags(&Tag::text("a"), &blank, ordering), Ordering::Greater);
            assert_eq!(compare_tags(&blank, &Tag::text(""), ordering), Ordering::Equal);
        }
    }
}
