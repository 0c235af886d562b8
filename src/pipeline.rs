//! Reads the import file and drives the entry form once per row.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::browser::Driver;
use crate::error::EntryError;
use crate::form::EntryForm;
use crate::models::{classify_row, SkipReason, TransactionRecord};
use crate::session::Session;

/// What to do with one line of the import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Skip(SkipReason),
    Enter(TransactionRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRow {
    /// 1-based record number in the file.
    pub line: usize,
    pub cells: Vec<String>,
    pub action: RowAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: SkipReason,
}

/// Summary printed when a run completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

/// The parsed import file, in file order.
#[derive(Debug, Clone)]
pub struct RowPipeline {
    path: PathBuf,
    rows: Vec<PlannedRow>,
}

impl RowPipeline {
    /// Read and classify every row of `path`.
    ///
    /// Fails before any browser work if the file is empty or a row to be
    /// entered has an unreadable amount.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        Self::from_bytes(path, &bytes)
    }

    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix("\u{feff}".as_bytes()).unwrap_or(bytes);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let line = index + 1;
            let record = record
                .with_context(|| format!("Failed to parse row {line} of {}", path.display()))?;
            let cells: Vec<String> = record.iter().map(str::to_string).collect();

            let action = match classify_row(line, &cells) {
                Some(reason) => RowAction::Skip(reason),
                None => RowAction::Enter(
                    TransactionRecord::from_row(&cells)
                        .with_context(|| format!("Row {line} is invalid: {cells:?}"))?,
                ),
            };
            rows.push(PlannedRow {
                line,
                cells,
                action,
            });
        }

        if rows.is_empty() {
            return Err(EntryError::EmptyInput {
                path: path.to_path_buf(),
            }
            .into());
        }

        Ok(Self {
            path: path.to_path_buf(),
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[PlannedRow] {
        &self.rows
    }

    /// Number of rows that will be entered.
    pub fn pending(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row.action, RowAction::Enter(_)))
            .count()
    }

    /// Enter every non-skipped row, strictly in file order.
    ///
    /// The first failure aborts the run; the error names the row.
    pub async fn run<D: Driver>(&self, session: &mut Session<D>, form: &EntryForm) -> Result<RunReport> {
        let mut report = RunReport {
            input: self.path.clone(),
            imported: 0,
            skipped: Vec::new(),
        };

        for row in &self.rows {
            match &row.action {
                RowAction::Skip(reason) => {
                    info!(line = row.line, %reason, row = ?row.cells, "Skipping row");
                    report.skipped.push(SkippedRow {
                        line: row.line,
                        reason: *reason,
                    });
                }
                RowAction::Enter(record) => {
                    info!(line = row.line, row = ?row.cells, "Importing row");
                    enter_record(session, form, record)
                        .await
                        .with_context(|| {
                            format!("Failed to enter row {}: {:?}", row.line, row.cells)
                        })?;
                    report.imported += 1;
                    session.pause(session.timing().row_interval).await;
                }
            }
        }

        Ok(report)
    }
}

async fn enter_record<D: Driver>(
    session: &mut Session<D>,
    form: &EntryForm,
    record: &TransactionRecord,
) -> Result<()> {
    form.open(session).await?;
    form.fill(session, record).await?;
    form.submit(session).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Result<RowPipeline> {
        RowPipeline::from_bytes(Path::new("input.csv"), text.as_bytes())
    }

    #[test]
    fn strips_byte_order_mark_before_header_check() -> Result<()> {
        let pipeline = load("\u{feff}日付,内容,金額\n2024/01/05,Lunch,-800\n")?;

        assert_eq!(pipeline.rows()[0].action, RowAction::Skip(SkipReason::Header));
        assert_eq!(pipeline.pending(), 1);
        Ok(())
    }

    #[test]
    fn keeps_file_order_and_line_numbers() -> Result<()> {
        let pipeline = load(
            "2024/01/05,A,-1\n#,comment\n2024/01/06,B,2,,,,,1\n2024/01/07,C,3\n",
        )?;

        let lines: Vec<(usize, bool)> = pipeline
            .rows()
            .iter()
            .map(|row| (row.line, matches!(row.action, RowAction::Enter(_))))
            .collect();
        assert_eq!(lines, vec![(1, true), (2, false), (3, false), (4, true)]);
        Ok(())
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = load("").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EntryError>(),
            Some(EntryError::EmptyInput { .. })
        ));
    }

    #[test]
    fn bad_amount_names_the_row() {
        let err = load("2024/01/05,Lunch,twelve\n").unwrap_err();
        assert!(err.to_string().contains("Row 1"));
    }

    #[test]
    fn skipped_rows_do_not_need_valid_amounts() -> Result<()> {
        let pipeline = load("日付,内容,金額（円）\n")?;
        assert_eq!(pipeline.pending(), 0);
        Ok(())
    }
}
