// ============ Shared classifier plumbing ============

pub(crate) mod labels;

// ============ Model implementations ============

pub(crate) mod distilbert;
pub(crate) mod roberta;

use candle_core::{Device, Tensor, D};
use candle_nn::ops::softmax;
use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};
use labels::LabelMap;

/// A Hugging Face hub repository holding a fine-tuned emotion classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checkpoint {
    repo: String,
}

impl Checkpoint {
    /// Point at a hub repository, e.g. `"j-hartmann/emotion-english-distilroberta-base"`.
    pub fn new(repo: impl Into<String>) -> Self {
        Self { repo: repo.into() }
    }

    /// Repository id.
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.repo)
    }
}

impl crate::pipelines::cache::ModelOptions for Checkpoint {
    fn cache_key(&self) -> String {
        self.repo.clone()
    }
}

/// Tokenize one text into `(input_ids, attention_mask)`, both shaped `(1, seq_len)`.
pub(crate) fn encode(tokenizer: &Tokenizer, text: &str, device: &Device) -> Result<(Tensor, Tensor)> {
    let tokens = tokenizer.encode(text, true).map_err(|e| {
        PipelineError::Tokenization(format!(
            "Tokenization failed on '{}': {}",
            &text.chars().take(50).collect::<String>(),
            e
        ))
    })?;

    let input_ids = Tensor::new(tokens.get_ids(), device)?.unsqueeze(0)?;
    let attention_mask = Tensor::new(tokens.get_attention_mask(), device)?.unsqueeze(0)?;

    Ok((input_ids, attention_mask))
}

/// Softmax `(1, num_labels)` logits into per-label probabilities.
pub(crate) fn label_scores(logits: &Tensor, labels: &LabelMap) -> Result<Vec<(String, f32)>> {
    let probs = softmax(logits, D::Minus1)?;
    let probs_vec = probs.squeeze(0)?.to_vec1::<f32>()?;
    labels.zip_scores(&probs_vec)
}
