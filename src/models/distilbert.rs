use candle_core::{Device, IndexOp, Tensor};
use candle_nn::{linear, Linear, Module};
use candle_transformers::models::distilbert::{Config, DistilBertModel};
use serde::Deserialize;
use tokenizers::Tokenizer;

use super::labels::LabelMap;
use super::{encode, label_scores, Checkpoint};
use crate::error::Result;
use crate::loaders::{ClassifierLoader, TokenizerLoader};
use crate::pipelines::emotion::model::{EmotionClassificationModel, LabelScores};

/// Six-way emotion checkpoint (sadness, joy, love, anger, fear, surprise).
pub const DEFAULT_REPO: &str = "bhadresh-savani/distilbert-base-uncased-emotion";

const BASE_TOKENIZER_REPO: &str = "distilbert-base-uncased";

#[derive(Deserialize)]
struct HeadConfig {
    dim: usize,
}

/// `DistilBertForSequenceClassification`: encoder, then `pre_classifier -> relu -> classifier`
/// on the `[CLS]` position.
pub struct DistilBertEmotionModel {
    model: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
    labels: LabelMap,
    device: Device,
}

impl DistilBertEmotionModel {
    pub fn new(checkpoint: Checkpoint, device: Device) -> Result<Self> {
        tracing::info!(repo = %checkpoint, "loading DistilBERT emotion classifier");
        let files = ClassifierLoader::new(checkpoint.repo()).load()?;

        let config: Config = serde_json::from_str(&files.config_json)?;
        let head: HeadConfig = serde_json::from_str(&files.config_json)?;
        let labels = LabelMap::from_config_json(&files.config_json)?;

        let vb = files.var_builder(&device)?;
        let model = DistilBertModel::load(vb.pp("distilbert"), &config)?;
        let pre_classifier = linear(head.dim, head.dim, vb.pp("pre_classifier"))?;
        let classifier = linear(head.dim, labels.len(), vb.pp("classifier"))?;

        Ok(Self {
            model,
            pre_classifier,
            classifier,
            labels,
            device,
        })
    }

    fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        // DistilBERT masks positions where the mask is non-zero.
        let (batch, seq_len) = attention_mask.dims2()?;
        let mask = attention_mask.eq(0u32)?.reshape((batch, 1, 1, seq_len))?;

        let hidden = self.model.forward(input_ids, &mask)?;
        let cls = hidden.i((.., 0))?;
        let pooled = self.pre_classifier.forward(&cls)?.relu()?;
        Ok(self.classifier.forward(&pooled)?)
    }
}

impl EmotionClassificationModel for DistilBertEmotionModel {
    type Options = Checkpoint;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        DistilBertEmotionModel::new(options, device)
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
