//! # Emotion Pipelines
//!
//! Emotion classification for a single sentence or a batch of social-media
//! posts, running Hugging Face checkpoints locally on candle.
//!
//! - [`emotion`]: the classification pipeline and the [`EmotionScorer`](emotion::EmotionScorer) trait.
//! - [`normalize`]: post text cleaning.
//! - [`source`]: where batch posts come from.
//! - [`analysis`]: single-text ranking and batch surveys.
//! - [`report`]: terminal rendering and CSV export.
//! - [`config`]: layered TOML configuration.
//!
//! ```rust,no_run
//! use emotion_pipelines::analysis::{detect, Detection};
//! use emotion_pipelines::emotion::{load_scorer, DeviceRequest, ModelCache, ModelFamily};
//! use emotion_pipelines::report::headline;
//!
//! # fn main() -> emotion_pipelines::error::Result<()> {
//! let cache = ModelCache::new();
//! let family = ModelFamily::Distilbert;
//! let scorer = load_scorer(family, family.default_checkpoint(), DeviceRequest::Cpu, &cache)?;
//!
//! if let Detection::Ranked(ranking) = detect(scorer.as_ref(), "I am so happy today!")? {
//!     println!("{}", headline(&ranking));
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

pub use pipelines::emotion;

pub mod analysis;
pub mod config;
pub mod normalize;
pub mod report;
pub mod source;

pub use error::{PipelineError, Result};
