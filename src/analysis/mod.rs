//! The two analysis flows built on top of an [`EmotionScorer`](crate::emotion::EmotionScorer).
//!
//! [`detect`] ranks every label for one sentence. [`survey`] pulls a batch of
//! posts from a source, cleans them and keeps only the winning label per post.

mod detect;
mod survey;

pub use detect::{detect, rank, Detection, Ranking};
pub use survey::{
    classify_records, survey, LabeledRecord, SurveyReport, TextRecord, SENTINEL_LABEL,
};
