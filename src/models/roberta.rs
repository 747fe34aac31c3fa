use candle_core::{Device, Tensor};
use candle_transformers::models::xlm_roberta::{Config, XLMRobertaForSequenceClassification};
use tokenizers::Tokenizer;

use super::labels::LabelMap;
use super::{encode, label_scores, Checkpoint};
use crate::error::Result;
use crate::loaders::{ClassifierLoader, TokenizerLoader};
use crate::pipelines::emotion::model::{EmotionClassificationModel, LabelScores};

/// Ekman's six emotions plus neutral.
pub const DEFAULT_REPO: &str = "j-hartmann/emotion-english-distilroberta-base";

const BASE_TOKENIZER_REPO: &str = "distilroberta-base";

/// RoBERTa-family sequence classifier (`roberta.*` encoder, `classifier.{dense,out_proj}` head).
pub struct RobertaEmotionModel {
    model: XLMRobertaForSequenceClassification,
    labels: LabelMap,
    device: Device,
}

impl RobertaEmotionModel {
    pub fn new(checkpoint: Checkpoint, device: Device) -> Result<Self> {
        tracing::info!(repo = %checkpoint, "loading RoBERTa emotion classifier");
        let files = ClassifierLoader::new(checkpoint.repo()).load()?;

        let config: Config = serde_json::from_str(&files.config_json)?;
        let labels = LabelMap::from_config_json(&files.config_json)?;

        let vb = files.var_builder(&device)?;
        let model = XLMRobertaForSequenceClassification::new(labels.len(), &config, vb)?;

        Ok(Self {
            model,
            labels,
            device,
        })
    }

    fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let token_type_ids = input_ids.zeros_like()?;
        Ok(self
            .model
            .forward(input_ids, attention_mask, &token_type_ids)?)
    }
}

impl EmotionClassificationModel for RobertaEmotionModel {
    type Options = Checkpoint;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        RobertaEmotionModel::new(options, device)
    }

    fn predict_scores(&self, tokenizer: &Tokenizer, text: &str) -> Result<LabelScores> {
        let (input_ids, attention_mask) = encode(tokenizer, text, &self.device)?;
        let logits = self.forward(&input_ids, &attention_mask)?;
        label_scores(&logits, &self.labels)
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        TokenizerLoader::new(options.repo(), Some(BASE_TOKENIZER_REPO)).load()
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
