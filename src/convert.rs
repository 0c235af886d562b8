//! Conversion of PayPay transaction exports into the import-file layout.
//!
//! Only payments are converted. Amounts become negative with one decimal
//! place, dates are normalized to `YYYY/MM/DD`, and categories are guessed
//! from merchant keywords.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::ConvertConfig;
use crate::error::EntryError;
use crate::models::HEADER_TOKEN;

/// First cell of a PayPay export's header row.
const PAYPAY_HEADER_TOKEN: &str = "取引日";

/// Transaction kind of the rows that are converted.
const PAYMENT_KIND: &str = "支払い";

pub const OUTPUT_HEADER: [&str; 9] = [
    HEADER_TOKEN,
    "内容",
    "金額（円）",
    "保有金融機関",
    "大項目",
    "中項目",
    "メモ",
    "振替",
    "ID",
];

mod paypay_columns {
    pub const DATE: usize = 0;
    pub const WITHDRAWAL: usize = 1;
    pub const KIND: usize = 7;
    pub const MERCHANT: usize = 8;
    pub const METHOD: usize = 9;
    pub const REFERENCE: usize = 12;
}

/// Maps merchants containing any keyword to a category pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRule {
    pub keywords: Vec<String>,
    pub large: String,
    pub middle: String,
}

impl CategoryRule {
    fn new(keywords: &[&str], large: &str, middle: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            large: large.to_string(),
            middle: middle.to_string(),
        }
    }

    fn matches(&self, merchant_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| merchant_lower.contains(&keyword.to_lowercase()))
    }
}

pub fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            &["ミスタードーナツ", "イズミヤ", "成城石井", "スーパー", "S-PAL", "エーワンベーカリー"],
            "食費",
            "食料品",
        ),
        CategoryRule::new(
            &["坂井珈琲", "リンガーハット", "ケンタッキー", "一風堂", "JR-PLUS", "ベーカリー", "カフェ"],
            "食費",
            "外食",
        ),
        CategoryRule::new(&["TOHOシネマズ", "MOVIX", "映画"], "教養・教育", "映画・音楽・ゲーム"),
        CategoryRule::new(&["JR", "新大阪", "仙台駅構内"], "交通", "電車"),
        CategoryRule::new(&["セブン-イレブン", "ローソン", "ファミリーマート"], "食費", "食料品"),
    ]
}

/// Counts from one conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub written: usize,
    pub skipped: usize,
}

/// `<input without extension>_mf.csv`, next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_mf.csv"))
}

/// Convert a PayPay export file.
pub fn convert_file(input: &Path, output: &Path, config: &ConvertConfig) -> Result<ConvertSummary> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read PayPay export: {}", input.display()))?;
    if bytes.is_empty() {
        return Err(EntryError::EmptyInput {
            path: input.to_path_buf(),
        }
        .into());
    }

    let file = std::fs::File::create(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;
    convert_paypay(&bytes, std::io::BufWriter::new(file), config)
        .with_context(|| format!("Failed to convert {}", input.display()))
}

/// Convert PayPay export bytes into the import layout, written with a BOM.
pub fn convert_paypay<W: Write>(input: &[u8], mut output: W, config: &ConvertConfig) -> Result<ConvertSummary> {
    let input = input.strip_prefix("\u{feff}".as_bytes()).unwrap_or(input);

    output.write_all("\u{feff}".as_bytes())?;
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(OUTPUT_HEADER)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut summary = ConvertSummary::default();
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse row {}", index + 1))?;
        if index == 0 && record.get(paypay_columns::DATE) == Some(PAYPAY_HEADER_TOKEN) {
            continue;
        }
        if record.iter().all(str::is_empty) {
            continue;
        }

        match convert_row(&record, config) {
            Some(row) => {
                writer.write_record(&row)?;
                summary.written += 1;
            }
            None => summary.skipped += 1,
        }
    }

    writer.flush()?;
    Ok(summary)
}

fn convert_row(record: &csv::StringRecord, config: &ConvertConfig) -> Option<[String; 9]> {
    let col = |i: usize| record.get(i).unwrap_or("");

    if col(paypay_columns::KIND).trim() != PAYMENT_KIND {
        return None;
    }
    let withdrawal = parse_amount(col(paypay_columns::WITHDRAWAL))?;

    let merchant = col(paypay_columns::MERCHANT);
    let (large, middle) = guess_category(merchant, &config.category_rules);
    let memo = format!(
        "方法:{} / 取引番号:{}",
        col(paypay_columns::METHOD).trim(),
        col(paypay_columns::REFERENCE).trim()
    );

    Some([
        normalize_date(col(paypay_columns::DATE)),
        format!("{PAYMENT_KIND} {merchant}").trim().to_string(),
        format_expense(withdrawal),
        config.institution.clone(),
        large,
        middle,
        memo,
        "0".to_string(),
        String::new(),
    ])
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Negative absolute value with one decimal place, e.g. `-399.0`.
fn format_expense(amount: Decimal) -> String {
    let mut value = -amount.abs();
    value.rescale(1);
    value.to_string()
}

/// Normalize export timestamps to `YYYY/MM/DD`; unknown formats pass through.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    for format in ["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return parsed.format("%Y/%m/%d").to_string();
        }
    }
    for format in ["%Y/%m/%d", "%Y-%m-%d"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(raw, format) {
            return parsed.format("%Y/%m/%d").to_string();
        }
    }
    match raw.split_once(' ') {
        Some((date, _)) => normalize_date(date),
        None => raw.to_string(),
    }
}

pub fn guess_category(merchant: &str, rules: &[CategoryRule]) -> (String, String) {
    let merchant = merchant.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&merchant))
        .map(|rule| (rule.large.clone(), rule.middle.clone()))
        .unwrap_or_default()
}
