use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::SurveyReport;
use crate::error::{PipelineError, Result};

/// Default file name for the exported dataset.
pub const EXPORT_FILENAME: &str = "emotion_analysis.csv";

/// MIME type of the exported dataset.
pub const EXPORT_MIME: &str = "text/csv";

const HEADER: [&str; 4] = ["Date", "Tweet", "Cleaned_Tweet", "Emotion"];

/// One line of the exported dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    /// Publication time; an empty field when unknown.
    #[serde(rename = "Date")]
    pub date: Option<DateTime<Utc>>,
    /// Post text as retrieved.
    #[serde(rename = "Tweet")]
    pub tweet: String,
    /// Normalized text that was classified.
    #[serde(rename = "Cleaned_Tweet")]
    pub cleaned_tweet: String,
    /// Resolved label.
    #[serde(rename = "Emotion")]
    pub emotion: String,
}

impl SurveyReport {
    /// One export row per record, in acquisition order.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.records()
            .iter()
            .map(|r| ExportRow {
                date: r.record.timestamp,
                tweet: r.record.raw_text.clone(),
                cleaned_tweet: r.record.cleaned_text.clone(),
                emotion: r.label.clone(),
            })
            .collect()
    }

    /// Write the dataset as CSV, header first. An empty report still gets its header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        csv_writer.write_record(HEADER)?;
        for row in self.export_rows() {
            csv_writer.serialize(row)?;
        }
        csv_writer
            .flush()
            .map_err(|e| PipelineError::Export(format!("Failed to flush CSV: {e}")))
    }

    /// Write the dataset to `path`, replacing any existing file.
    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            PipelineError::Export(format!("Cannot create '{}': {}", path.display(), e))
        })?;
        self.write_csv(file)?;
        tracing::info!(path = %path.display(), rows = self.len(), "dataset exported");
        Ok(())
    }
}

/// Parse a dataset previously written by [`SurveyReport::write_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ExportRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?;
    if headers.iter().ne(HEADER) {
        return Err(PipelineError::Export(format!(
            "Unexpected CSV header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    csv_reader
        .deserialize()
        .map(|row| row.map_err(PipelineError::from))
        .collect()
}
