use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One CSV row before scoring validation.
#[derive(Debug, Deserialize)]
pub(crate) struct HistoryRow {
    #[serde(rename = "Assessment Type")]
    pub(crate) assessment_type: String,
    #[serde(rename = "Score")]
    pub(crate) score: f64,
    #[serde(rename = "Taken At")]
    pub(crate) taken_at: String,
    #[serde(
        rename = "Crisis Indicator",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) crisis_indicator: Option<String>,
}

impl HistoryRow {
    /// `None` for a value that is neither a yes nor a no spelling.
    pub(crate) fn crisis_flag(&self) -> Option<bool> {
        let Some(value) = self.crisis_indicator.as_deref() else {
            return Some(false);
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        }
    }
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<HistoryRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<HistoryRow>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (taken as midnight UTC).
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
