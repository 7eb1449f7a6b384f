//! CSV import of assessment history exported from the web application.
//!
//! Expected headers: `Assessment Type,Score,Taken At` plus an optional
//! `Crisis Indicator` column. Every row must validate; an unknown instrument,
//! an out-of-range score or an unrecognized crisis value fails the whole
//! import with its row number.

mod parser;

use std::io::Read;
use std::path::Path;

use super::domain::{AssessmentRecord, AssessmentType};
use super::scoring::ScoringError;

#[derive(Debug, thiserror::Error)]
pub enum HistoryImportError {
    #[error("failed to read assessment history: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid assessment history CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: ScoringError,
    },
    #[error("row {row}: unrecognized timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },
    #[error("row {row}: unrecognized crisis indicator '{value}'")]
    InvalidCrisisIndicator { row: usize, value: String },
}

pub struct AssessmentHistoryImporter;

impl AssessmentHistoryImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<AssessmentRecord>, HistoryImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<AssessmentRecord>, HistoryImportError> {
        let rows = parser::parse_rows(reader)?;
        let mut records = Vec::with_capacity(rows.len());

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            let invalid = |source| HistoryImportError::InvalidRow {
                row: row_number,
                source,
            };

            let assessment_type: AssessmentType =
                row.assessment_type.parse().map_err(invalid)?;
            let taken_at = parser::parse_timestamp(&row.taken_at).ok_or_else(|| {
                HistoryImportError::InvalidTimestamp {
                    row: row_number,
                    value: row.taken_at.clone(),
                }
            })?;

            let crisis_indicator = row.crisis_flag().ok_or_else(|| {
                HistoryImportError::InvalidCrisisIndicator {
                    row: row_number,
                    value: row.crisis_indicator.clone().unwrap_or_default(),
                }
            })?;

            let record = AssessmentRecord::new(assessment_type, row.score, taken_at)
                .map_err(invalid)?
                .flagged(crisis_indicator);
            records.push(record);
        }

        records.sort_by_key(AssessmentRecord::taken_at);
        Ok(records)
    }
}
