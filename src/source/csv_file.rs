use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{hashtag_for_query, Post};
use crate::error::{PipelineError, Result};

#[derive(Debug, Deserialize)]
struct PostRow {
    #[serde(rename = "Date", default)]
    date: Option<String>,
    #[serde(rename = "Tweet")]
    tweet: String,
}

/// Posts read from a CSV file with `Date` and `Tweet` columns, such as an
/// earlier `emotion_analysis.csv` export.
///
/// Rows are matched the way hashtags are: query and text are both reduced with
/// [`hashtag_for_query`], so `"mental health"` matches `"#MentalHealth"` and
/// `"Mental health, matters"` alike. An empty query matches every row.
pub struct CsvPostSource<R: Read = File> {
    rows: csv::DeserializeRecordsIntoIter<R, PostRow>,
    needle: String,
}

impl CsvPostSource<File> {
    /// Open `path` and filter by `query`.
    pub fn open(path: impl AsRef<Path>, query: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PipelineError::Source(format!("Cannot open '{}': {}", path.display(), e))
        })?;
        Ok(Self::from_reader(file, query))
    }
}

impl<R: Read> CsvPostSource<R> {
    /// Read CSV from any reader.
    pub fn from_reader(reader: R, query: &str) -> Self {
        let rows = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader)
            .into_deserialize();
        Self {
            rows,
            needle: hashtag_for_query(query),
        }
    }
}

impl<R: Read> Iterator for CsvPostSource<R> {
    type Item = Result<Post>;

    fn next(&mut self) -> Option<Self::Item> {
        for row in self.rows.by_ref() {
            let row: PostRow = match row {
                Ok(row) => row,
                Err(e) => return Some(Err(PipelineError::Source(format!("Bad post row: {e}")))),
            };
            if !self.needle.is_empty() && !hashtag_for_query(&row.tweet).contains(&self.needle) {
                continue;
            }
            return Some(Ok(Post {
                timestamp: row.date.as_deref().and_then(parse_timestamp),
                text: row.tweet,
            }));
        }
        None
    }
}

/// RFC 3339, or the `2023-01-31 12:00:00+00:00` layout spreadsheet tools emit.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z"))
        .map(|dt| dt.with_timezone(&Utc));
    match parsed {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::debug!(raw, "ignoring unparseable post date: {e}");
            None
        }
    }
}
