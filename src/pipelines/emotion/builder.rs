use std::sync::Arc;

use super::model::EmotionClassificationModel;
use super::pipeline::EmotionClassificationPipeline;
use crate::error::Result;
use crate::models::Checkpoint;
use crate::pipelines::cache::{ModelCache, ModelOptions};
use crate::pipelines::utils::{BasePipelineBuilder, DeviceRequest, StandardPipelineBuilder};

crate::pipelines::utils::impl_device_methods!(delegated: EmotionClassificationPipelineBuilder<M: EmotionClassificationModel>);

/// Builder for creating [`EmotionClassificationPipeline`] instances.
///
/// Use [`Self::distilbert`] or [`Self::distilroberta`] as the entry point.
///
/// # Examples
///
/// ```rust,no_run
/// # use emotion_pipelines::emotion::{Checkpoint, EmotionClassificationPipelineBuilder, ModelCache};
/// # fn main() -> emotion_pipelines::error::Result<()> {
/// let cache = ModelCache::new();
/// let pipeline = EmotionClassificationPipelineBuilder::distilroberta(
///     Checkpoint::new("j-hartmann/emotion-english-distilroberta-base"),
/// )
/// .cpu()
/// .build_in(&cache)?;
/// # Ok(())
/// # }
/// ```
pub struct EmotionClassificationPipelineBuilder<M: EmotionClassificationModel>(
    StandardPipelineBuilder<M::Options>,
);

impl<M: EmotionClassificationModel> EmotionClassificationPipelineBuilder<M> {
    pub(crate) fn new(options: M::Options) -> Self {
        Self(StandardPipelineBuilder::new(options))
    }

    /// Builds the pipeline with a freshly loaded model.
    ///
    /// # Errors
    ///
    /// Returns an error if model loading or device initialization fails.
    pub fn build(self) -> Result<EmotionClassificationPipeline<M>>
    where
        M: Send + Sync + 'static,
        M::Options: ModelOptions + Clone,
    {
        BasePipelineBuilder::build(self)
    }

    /// Builds the pipeline, sharing the model with other pipelines built from `cache`.
    ///
    /// # Errors
    ///
    /// Returns an error if model loading or device initialization fails.
    pub fn build_in(self, cache: &ModelCache) -> Result<EmotionClassificationPipeline<M>>
    where
        M: Send + Sync + 'static,
        M::Options: ModelOptions + Clone,
    {
        BasePipelineBuilder::build_in(self, cache)
    }
}

impl<M: EmotionClassificationModel> BasePipelineBuilder<M> for EmotionClassificationPipelineBuilder<M>
where
    M: Send + Sync + 'static,
    M::Options: ModelOptions + Clone,
{
    type Pipeline = EmotionClassificationPipeline<M>;
    type Options = M::Options;

    fn options(&self) -> &Self::Options {
        &self.0.options
    }

    fn device_request(&self) -> &DeviceRequest {
        &self.0.device_request
    }

    fn create_model(options: Self::Options, device: candle_core::Device) -> Result<M> {
        M::new(options, device)
    }

    fn get_tokenizer(options: Self::Options) -> Result<tokenizers::Tokenizer> {
        M::get_tokenizer(options)
    }

    fn construct_pipeline(
        model: Arc<M>,
        tokenizer: tokenizers::Tokenizer,
    ) -> Result<Self::Pipeline> {
        Ok(EmotionClassificationPipeline { model, tokenizer })
    }
}

impl EmotionClassificationPipelineBuilder<super::EmotionDistilBert> {
    /// Creates a builder for a DistilBERT emotion checkpoint.
    pub fn distilbert(checkpoint: Checkpoint) -> Self {
        Self::new(checkpoint)
    }
}

impl EmotionClassificationPipelineBuilder<super::EmotionRoberta> {
    /// Creates a builder for a (Distil)RoBERTa emotion checkpoint.
    pub fn distilroberta(checkpoint: Checkpoint) -> Self {
        Self::new(checkpoint)
    }
}
