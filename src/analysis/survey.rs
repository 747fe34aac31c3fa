use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::emotion::EmotionScorer;
use crate::error::Result;
use crate::normalize::normalize;
use crate::pipelines::stats::PipelineStats;
use crate::source::{take_posts, Post};

/// Label given to a post whose classification failed.
pub const SENTINEL_LABEL: &str = "Unknown";

/// One acquired post with its cleaned text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRecord {
    /// Position in acquisition order.
    pub index: usize,
    /// Publication time, when the source provides one.
    pub timestamp: Option<DateTime<Utc>>,
    /// Text exactly as retrieved.
    pub raw_text: String,
    /// `normalize(raw_text)`, computed once.
    pub cleaned_text: String,
}

impl TextRecord {
    /// Build the record for the `index`-th post.
    pub fn from_post(index: usize, post: Post) -> Self {
        let cleaned_text = normalize(&post.text);
        Self {
            index,
            timestamp: post.timestamp,
            raw_text: post.text,
            cleaned_text,
        }
    }
}

/// A record with its resolved emotion.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRecord {
    /// The classified post.
    pub record: TextRecord,
    /// Winning label, or [`SENTINEL_LABEL`].
    pub label: String,
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyReport {
    records: Vec<LabeledRecord>,
}

impl SurveyReport {
    /// Wrap already-labeled records.
    pub fn new(records: Vec<LabeledRecord>) -> Self {
        Self { records }
    }

    /// All records in acquisition order.
    pub fn records(&self) -> &[LabeledRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` records (fewer if the batch is smaller).
    pub fn sample(&self, n: usize) -> &[LabeledRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Label counts, most frequent first; equal counts keep first-seen order.
    ///
    /// Recomputed on every call.
    pub fn frequency_table(&self) -> Vec<(String, usize)> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut table: Vec<(String, usize)> = Vec::new();

        for r in &self.records {
            match positions.get(r.label.as_str()) {
                Some(&pos) => table[pos].1 += 1,
                None => {
                    positions.insert(r.label.as_str(), table.len());
                    table.push((r.label.clone(), 1));
                }
            }
        }

        table.sort_by(|a, b| b.1.cmp(&a.1));
        table
    }

    /// Records that fell back to [`SENTINEL_LABEL`].
    pub fn unknown_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.label == SENTINEL_LABEL)
            .count()
    }
}

/// Attach the top label to every record, one sequential call per record.
///
/// A failing record gets [`SENTINEL_LABEL`]; the rest of the batch continues.
pub fn classify_records<S>(scorer: &S, records: Vec<TextRecord>) -> SurveyReport
where
    S: EmotionScorer + ?Sized,
{
    let stats_builder = PipelineStats::start();
    let item_count = records.len();

    let labeled = records
        .into_iter()
        .map(|record| {
            let label = match scorer.score_top(&record.cleaned_text) {
                Ok(label) => label,
                Err(e) => {
                    tracing::warn!(
                        index = record.index,
                        error = %e,
                        "classification failed, using sentinel label"
                    );
                    SENTINEL_LABEL.to_string()
                }
            };
            LabeledRecord { record, label }
        })
        .collect();

    let stats = stats_builder.finish(item_count);
    tracing::debug!(
        items = stats.items_processed,
        per_item_ms = stats.per_item().as_secs_f64() * 1000.0,
        "batch classified"
    );

    SurveyReport::new(labeled)
}

/// Acquire up to `max_posts` posts, clean them and classify each one.
///
/// # Errors
///
/// Any source error aborts the whole survey; no partial report is returned.
/// Per-record classification errors never do.
pub fn survey<S, I>(scorer: &S, source: I, max_posts: usize) -> Result<SurveyReport>
where
    S: EmotionScorer + ?Sized,
    I: IntoIterator<Item = Result<Post>>,
{
    let posts = take_posts(source, max_posts)?;
    tracing::info!(count = posts.len(), max_posts, "posts acquired");

    let records = posts
        .into_iter()
        .enumerate()
        .map(|(index, post)| TextRecord::from_post(index, post))
        .collect();

    Ok(classify_records(scorer, records))
}
