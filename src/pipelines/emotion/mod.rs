//! Emotion classification pipeline.
//!
//! Score text against every label of a fine-tuned emotion checkpoint
//! (e.g. `joy`, `sadness`, `anger`, `fear`, `love`, `surprise`).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use emotion_pipelines::emotion::{Checkpoint, EmotionClassificationPipelineBuilder, EmotionScorer};
//!
//! # fn main() -> emotion_pipelines::error::Result<()> {
//! let pipeline = EmotionClassificationPipelineBuilder::distilbert(
//!     Checkpoint::new("bhadresh-savani/distilbert-base-uncased-emotion"),
//! )
//! .build()?;
//!
//! // Every label with its confidence
//! for s in pipeline.score_all("I am so happy today!")? {
//!     println!("{}: {:.2}", s.label, s.score);
//! }
//!
//! // Only the winner
//! println!("{}", pipeline.score_top("Why would you do that to me?")?);
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Models
//!
//! | Family | Default checkpoint | Builder Method |
//! |--------|--------------------|----------------|
//! | DistilBERT | `bhadresh-savani/distilbert-base-uncased-emotion` | [`EmotionClassificationPipelineBuilder::distilbert`] |
//! | DistilRoBERTa | `j-hartmann/emotion-english-distilroberta-base` | [`EmotionClassificationPipelineBuilder::distilroberta`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;
pub(crate) mod scorer;

// ============ Public API ============

pub use crate::models::Checkpoint;
pub use crate::pipelines::cache::ModelCache;
pub use crate::pipelines::stats::PipelineStats;
pub use crate::pipelines::utils::DeviceRequest;
pub use builder::EmotionClassificationPipelineBuilder;
pub use pipeline::{BatchOutput, BatchResult, EmotionClassificationPipeline, EmotionScore, Output};
pub use scorer::{top_score, EmotionScorer};

#[doc(hidden)]
pub use pipeline::EmotionInput;

use serde::Deserialize;

use crate::error::Result;

/// Only for generic annotations. Use [`EmotionClassificationPipelineBuilder::distilbert`].
pub type EmotionDistilBert = crate::models::distilbert::DistilBertEmotionModel;

/// Only for generic annotations. Use [`EmotionClassificationPipelineBuilder::distilroberta`].
pub type EmotionRoberta = crate::models::roberta::RobertaEmotionModel;

/// Network architecture used to run a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelFamily {
    /// `DistilBertForSequenceClassification` checkpoints.
    Distilbert,
    /// `RobertaForSequenceClassification` checkpoints (DistilRoBERTa included).
    Distilroberta,
}

impl ModelFamily {
    /// The checkpoint used when none is configured.
    pub fn default_checkpoint(self) -> Checkpoint {
        match self {
            ModelFamily::Distilbert => Checkpoint::new(crate::models::distilbert::DEFAULT_REPO),
            ModelFamily::Distilroberta => Checkpoint::new(crate::models::roberta::DEFAULT_REPO),
        }
    }
}

/// Build a type-erased scorer for `family`, sharing loaded weights through `cache`.
///
/// # Errors
///
/// Fails when the checkpoint cannot be downloaded or loaded on the requested device.
pub fn load_scorer(
    family: ModelFamily,
    checkpoint: Checkpoint,
    device: DeviceRequest,
    cache: &ModelCache,
) -> Result<Box<dyn EmotionScorer>> {
    let scorer: Box<dyn EmotionScorer> = match family {
        ModelFamily::Distilbert => Box::new(
            EmotionClassificationPipelineBuilder::distilbert(checkpoint)
                .device(device)
                .build_in(cache)?,
        ),
        ModelFamily::Distilroberta => Box::new(
            EmotionClassificationPipelineBuilder::distilroberta(checkpoint)
                .device(device)
                .build_in(cache)?,
        ),
    };
    Ok(scorer)
}
