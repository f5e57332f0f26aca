use serde::{Deserialize, Serialize};
use sheetmirror_model::TagKind;

/// Identifies one remote range.
///
/// `range` is an A1 sub-range of `sheet` (for example `A1:F200`); an empty
/// range means the whole sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceHandle {
    pub spreadsheet_id: String,
    pub sheet: String,
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub tag_kind: TagKind,
}

impl ResourceHandle {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        sheet: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet: sheet.into(),
            range: range.into(),
            tag_kind: TagKind::default(),
        }
    }

    pub fn with_tag_kind(mut self, tag_kind: TagKind) -> Self {
        self.tag_kind = tag_kind;
        self
    }

    /// `Sheet!A1:B2`, or just `Sheet` for a whole-sheet handle.
    pub fn a1_range(&self) -> String {
        if self.range.is_empty() {
            self.sheet.clone()
        } else {
            format!("{}!{}", self.sheet, self.range)
        }
    }
}
