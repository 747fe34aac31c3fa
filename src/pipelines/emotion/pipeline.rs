use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use super::model::EmotionClassificationModel;
use crate::error::{PipelineError, Result};
use crate::pipelines::stats::PipelineStats;

// ============ Output types ============

/// One emotion label with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    /// Emotion name as defined by the checkpoint (e.g. "joy", "anger").
    pub label: String,
    /// Confidence (0.0 to 1.0).
    pub score: f32,
}

impl EmotionScore {
    /// Convenience constructor.
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Single-text output from `run()`.
#[derive(Debug)]
pub struct Output {
    /// Score for every label, in the checkpoint's label order.
    pub scores: Vec<EmotionScore>,
    /// Execution statistics.
    pub stats: PipelineStats,
}

/// Single result in batch output.
#[derive(Debug)]
pub struct BatchResult {
    /// Input text.
    pub text: String,
    /// Scores or error for this input.
    pub scores: Result<Vec<EmotionScore>>,
}

/// Batch output from `run()`.
#[derive(Debug)]
pub struct BatchOutput {
    /// Results for each input.
    pub results: Vec<BatchResult>,
    /// Execution statistics.
    pub stats: PipelineStats,
}

// ============ Input trait for type-based dispatch ============

#[doc(hidden)]
pub trait EmotionInput<'a> {
    /// Output type for `.run()`.
    type Output;

    #[doc(hidden)]
    fn into_texts(self) -> Vec<&'a str>;
    #[doc(hidden)]
    fn convert_output(
        texts: Vec<&'a str>,
        scores: Vec<Result<Vec<EmotionScore>>>,
        stats: PipelineStats,
    ) -> Result<Self::Output>;
}

impl<'a> EmotionInput<'a> for &'a str {
    type Output = Output;

    fn into_texts(self) -> Vec<&'a str> {
        vec![self]
    }

    fn convert_output(
        _texts: Vec<&'a str>,
        mut scores: Vec<Result<Vec<EmotionScore>>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        let scores = scores
            .pop()
            .ok_or_else(|| PipelineError::Unexpected("No predictions returned".into()))??;
        Ok(Output { scores, stats })
    }
}

fn batch_output(
    texts: Vec<&str>,
    scores: Vec<Result<Vec<EmotionScore>>>,
    stats: PipelineStats,
) -> BatchOutput {
    let results = texts
        .into_iter()
        .zip(scores)
        .map(|(text, scores)| BatchResult {
            text: text.to_string(),
            scores,
        })
        .collect();
    BatchOutput { results, stats }
}

impl<'a> EmotionInput<'a> for &'a [&'a str] {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.to_vec()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        scores: Vec<Result<Vec<EmotionScore>>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        Ok(batch_output(texts, scores, stats))
    }
}

impl<'a, const N: usize> EmotionInput<'a> for &'a [&'a str; N] {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.as_slice().to_vec()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        scores: Vec<Result<Vec<EmotionScore>>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        Ok(batch_output(texts, scores, stats))
    }
}

// ============ Pipeline ============

/// Scores text against every emotion label of a fine-tuned checkpoint.
///
/// Construct with [`EmotionClassificationPipelineBuilder`](super::EmotionClassificationPipelineBuilder).
///
/// # Examples
///
/// ```rust,no_run
/// # use emotion_pipelines::emotion::{Checkpoint, EmotionClassificationPipelineBuilder};
/// # fn main() -> emotion_pipelines::error::Result<()> {
/// let pipeline = EmotionClassificationPipelineBuilder::distilbert(
///     Checkpoint::new("bhadresh-savani/distilbert-base-uncased-emotion"),
/// )
/// .build()?;
///
/// // Single text - one score per label
/// let output = pipeline.run("I am so happy today!")?;
/// for s in &output.scores {
///     println!("{}: {:.2}", s.label, s.score);
/// }
///
/// // Batch - results include input text
/// let output = pipeline.run(&["Great!", "Terrifying."])?;
/// for r in output.results {
///     println!("{} → {} labels", r.text, r.scores?.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct EmotionClassificationPipeline<M: EmotionClassificationModel> {
    pub(crate) model: Arc<M>,
    pub(crate) tokenizer: Tokenizer,
}

impl<M: EmotionClassificationModel> EmotionClassificationPipeline<M> {
    /// Score text against every label.
    ///
    /// Single input → [`Output`], batch → [`BatchOutput`].
    pub fn run<'a, I: EmotionInput<'a>>(&self, input: I) -> Result<I::Output> {
        let stats_builder = PipelineStats::start();
        let texts = input.into_texts();
        let item_count = texts.len();

        let results = self.model.predict_scores_batch(&self.tokenizer, &texts)?;

        let scores: Vec<Result<Vec<EmotionScore>>> = results
            .into_iter()
            .map(|result| {
                result.map(|entries| {
                    entries
                        .into_iter()
                        .map(|(label, score)| EmotionScore { label, score })
                        .collect()
                })
            })
            .collect();

        let stats = stats_builder.finish(item_count);
        tracing::debug!(
            items = stats.items_processed,
            elapsed_ms = stats.total_time.as_secs_f64() * 1000.0,
            "emotion pipeline run"
        );

        I::convert_output(texts, scores, stats)
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}
