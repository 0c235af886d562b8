use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Category value that means "leave the host's default".
pub const UNCATEGORIZED: &str = "未分類";

/// Maximum length of the host's content field, in characters.
pub const CONTENT_MAX_CHARS: usize = 50;

/// Column positions in the import file.
pub mod columns {
    pub const DATE: usize = 0;
    pub const CONTENT: usize = 1;
    pub const AMOUNT: usize = 2;
    pub const ACCOUNT: usize = 3;
    pub const LARGE_CATEGORY: usize = 4;
    pub const MIDDLE_CATEGORY: usize = 5;
    pub const MEMO: usize = 6;
    pub const TRANSFER: usize = 7;
    pub const ID: usize = 8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Income,
    Expense,
}

/// One row of the import file, ready to be typed into the entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Date text as the host accepts it (e.g. "2024/01/05").
    pub date: String,
    pub content: String,
    /// Whole yen; positive is income, zero or negative is expense.
    pub signed_amount: i64,
    /// `None` leaves the host's default category.
    pub large_category: Option<String>,
    pub middle_category: Option<String>,
    pub memo: String,
    pub is_transfer: bool,
    pub raw_row: Vec<String>,
}

impl TransactionRecord {
    pub fn from_row(row: &[String]) -> Result<Self> {
        let col = |i: usize| row.get(i).map(String::as_str).unwrap_or("");

        let signed_amount = parse_yen(col(columns::AMOUNT))
            .with_context(|| format!("Invalid amount {:?}", col(columns::AMOUNT)))?;

        Ok(Self {
            date: col(columns::DATE).to_string(),
            content: col(columns::CONTENT).to_string(),
            signed_amount,
            large_category: category(col(columns::LARGE_CATEGORY)),
            // Spreadsheet apps force text cells with a leading quote. It is
            // stripped only after the raw cell has been checked.
            middle_category: category(col(columns::MIDDLE_CATEGORY))
                .map(|name| name.trim_start_matches('\'').to_string()),
            memo: col(columns::MEMO).to_string(),
            is_transfer: is_truthy_flag(col(columns::TRANSFER)),
            raw_row: row.to_vec(),
        })
    }

    pub fn direction(&self) -> Direction {
        if self.signed_amount > 0 {
            Direction::Income
        } else {
            Direction::Expense
        }
    }

    /// Amount as typed into the form; the sign is carried by the toggle.
    pub fn amount(&self) -> u64 {
        self.signed_amount.unsigned_abs()
    }

    pub fn display_content(&self) -> String {
        compose_content(&self.content, &self.memo)
    }
}

/// Parse a yen amount such as `" -1,077.0 "` into `-1077`.
///
/// Commas and surrounding whitespace are ignored, blank is zero, and
/// fractions round half to even.
pub fn parse_yen(raw: &str) -> Result<i64> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(0);
    }

    let value = Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .with_context(|| format!("Not a number: {cleaned:?}"))?;
    value
        .round()
        .to_i64()
        .with_context(|| format!("Amount out of range: {cleaned}"))
}

/// Content text shown in the household book: `content（memo）`, cut to the
/// host's field limit.
pub fn compose_content(content: &str, memo: &str) -> String {
    let full = if memo.is_empty() {
        content.to_string()
    } else {
        format!("{content}（{memo}）")
    };
    full.chars().take(CONTENT_MAX_CHARS).collect()
}

pub fn is_truthy_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE")
}

fn category(value: &str) -> Option<String> {
    if value.is_empty() || value == UNCATEGORIZED {
        None
    } else {
        Some(value.to_string())
    }
}
