use serde::Serialize;

use super::transaction::{columns, is_truthy_flag};

/// First cell of the import file's header row.
pub const HEADER_TOKEN: &str = "日付";

/// First-cell values of comment and summary rows.
pub const MARKER_CELLS: [&str; 3] = ["#", "0", "計算対象"];

/// Why a row was not entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Header,
    TransferFlagged,
    MarkerRow,
    /// The continue shortcut was not usable; the form was opened from the
    /// page instead. Reported while opening a form, never drops a row.
    NoContinueAvailable,
    Blank,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::Header => "header row",
            SkipReason::TransferFlagged => "transfer between own accounts",
            SkipReason::MarkerRow => "comment or marker row",
            SkipReason::NoContinueAvailable => "continue button not available",
            SkipReason::Blank => "blank row",
        };
        f.write_str(text)
    }
}

/// Decide whether row `line` (1-based) of the import file is skipped.
pub fn classify_row(line: usize, row: &[String]) -> Option<SkipReason> {
    if row.iter().all(|cell| cell.trim().is_empty()) {
        return Some(SkipReason::Blank);
    }
    if line == 1 && row[columns::DATE] == HEADER_TOKEN {
        return Some(SkipReason::Header);
    }
    if row
        .get(columns::TRANSFER)
        .is_some_and(|flag| is_truthy_flag(flag))
    {
        return Some(SkipReason::TransferFlagged);
    }
    if MARKER_CELLS.contains(&row[columns::DATE].as_str()) {
        return Some(SkipReason::MarkerRow);
    }
    None
}
