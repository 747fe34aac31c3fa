use crate::error::Result;
use tokenizers::Tokenizer;

/// Every label in the checkpoint's label set with its probability, in classifier order.
pub type LabelScores = Vec<(String, f32)>;

pub trait EmotionClassificationModel {
    type Options: std::fmt::Debug + Clone;

    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    fn predict_scores(&self, tokenizer: &Tokenizer, text: &str) -> Result<LabelScores>;

    fn predict_scores_batch(
        &self,
        tokenizer: &Tokenizer,
        texts: &[&str],
    ) -> Result<Vec<Result<LabelScores>>> {
        Ok(texts
            .iter()
            .map(|text| self.predict_scores(tokenizer, text))
            .collect())
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    fn device(&self) -> &candle_core::Device;
}
