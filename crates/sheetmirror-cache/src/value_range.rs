//! Decoding of the spreadsheet values API `ValueRange` payload.
//!
//! ```json
//! {"range": "Rates!A1:C3", "majorDimension": "ROWS", "values": [["Tag", "Rate"], [45361, 1.5]]}
//! ```
//!
//! Rows are ragged: trailing blank cells are omitted by the API, and blanks in
//! the middle of a row arrive as `""`.

use crate::source::FetchError;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sheetmirror_model::{CellValue, Row};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub major_dimension: Option<String>,
    /// Absent when the range holds no values at all.
    #[serde(default)]
    pub values: Vec<Vec<JsonValue>>,
}

impl ValueRange {
    pub fn into_rows(self) -> Result<Vec<Row>, FetchError> {
        if let Some(dimension) = self.major_dimension.as_deref() {
            if dimension != "ROWS" {
                return Err(FetchError::Decode(format!(
                    "range {} uses majorDimension {dimension}; expected ROWS",
                    self.range
                )));
            }
        }
        self.values
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, cell)| {
                        cell_from_json(cell).ok_or_else(|| {
                            FetchError::Decode(format!(
                                "unsupported cell at row {r}, column {c} of {}: {cell}",
                                self.range
                            ))
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

/// Parse a raw `ValueRange` body into rows.
pub fn parse_value_range(json: &str) -> Result<Vec<Row>, FetchError> {
    let range: ValueRange =
        serde_json::from_str(json).map_err(|err| FetchError::Decode(err.to_string()))?;
    range.into_rows()
}

/// Map one JSON scalar to a cell. Arrays and objects are not cells.
pub fn cell_from_json(value: &JsonValue) -> Option<CellValue> {
    match value {
        JsonValue::Null => Some(CellValue::Empty),
        JsonValue::Bool(b) => Some(CellValue::Boolean(*b)),
        JsonValue::Number(n) => n.as_f64().map(CellValue::Number),
        JsonValue::String(s) if s.is_empty() => Some(CellValue::Empty),
        JsonValue::String(s) => Some(CellValue::String(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_unformatted_values() {
        let rows = parse_value_range(
            r#"{
                "range": "Rates!A1:D3",
                "majorDimension": "ROWS",
                "values": [
                    ["Tag", "Rate", "Open"],
                    [45361.5, 1.25, true],
                    ["late", "", false, "note"],
                    [7]
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["Tag".into(), "Rate".into(), "Open".into()],
                vec![
                    CellValue::Number(45361.5),
                    CellValue::Number(1.25),
                    CellValue::Boolean(true)
                ],
                vec![
                    "late".into(),
                    CellValue::Empty,
                    CellValue::Boolean(false),
                    "note".into()
                ],
                vec![CellValue::Number(7.0)],
            ]
        );
    }

    #[test]
    fn missing_values_means_no_rows() {
        let rows = parse_value_range(r#"{"range": "Empty!A1:Z100", "majorDimension": "ROWS"}"#)
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn rejects_nested_cells_and_column_major_payloads() {
        let nested = parse_value_range(r#"{"range": "S!A1", "values": [[[1, 2]]]}"#);
        assert!(matches!(nested, Err(FetchError::Decode(_))));

        let columns =
            parse_value_range(r#"{"range": "S!A1", "majorDimension": "COLUMNS", "values": []}"#);
        assert!(matches!(columns, Err(FetchError::Decode(_))));

        assert!(matches!(parse_value_range("not json"), Err(FetchError::Decode(_))));
    }
}
