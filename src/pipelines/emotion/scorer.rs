use super::model::EmotionClassificationModel;
use super::pipeline::{EmotionClassificationPipeline, EmotionScore};
use crate::error::{PipelineError, Result};

/// Anything that can score text against a fixed set of emotion labels.
///
/// Single-text callers want every score; batch callers only the winning label.
/// Both come from the same underlying model.
pub trait EmotionScorer {
    /// Score for every label, in the scorer's own order.
    fn score_all(&self, text: &str) -> Result<Vec<EmotionScore>>;

    /// The highest-confidence label. Ties go to the label listed first.
    fn score_top(&self, text: &str) -> Result<String> {
        let scores = self.score_all(text)?;
        top_score(&scores)
            .map(|s| s.label.clone())
            .ok_or_else(|| PipelineError::Unexpected("Scorer returned no labels".into()))
    }
}

/// First entry with the maximum score, ordered by `f32::total_cmp` like
/// [`rank`](crate::analysis::rank).
pub fn top_score(scores: &[EmotionScore]) -> Option<&EmotionScore> {
    scores.iter().fold(None, |best: Option<&EmotionScore>, s| match best {
        Some(b) if b.score.total_cmp(&s.score).is_ge() => Some(b),
        _ => Some(s),
    })
}

impl<M: EmotionClassificationModel> EmotionScorer for EmotionClassificationPipeline<M> {
    fn score_all(&self, text: &str) -> Result<Vec<EmotionScore>> {
        Ok(self.run(text)?.scores)
    }
}

impl<S: EmotionScorer + ?Sized> EmotionScorer for Box<S> {
    fn score_all(&self, text: &str) -> Result<Vec<EmotionScore>> {
        (**self).score_all(text)
    }

    fn score_top(&self, text: &str) -> Result<String> {
        (**self).score_top(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<EmotionScore>);

    impl EmotionScorer for Fixed {
        fn score_all(&self, _text: &str) -> Result<Vec<EmotionScore>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn top_label_is_the_maximum() {
        let scorer = Fixed(vec![
            EmotionScore::new("sadness", 0.1),
            EmotionScore::new("anger", 0.7),
            EmotionScore::new("joy", 0.2),
        ]);
        assert_eq!(scorer.score_top("whatever").unwrap(), "anger");
    }

    #[test]
    fn ties_keep_first_label() {
        let scores = vec![EmotionScore::new("fear", 0.5), EmotionScore::new("joy", 0.5)];
        assert_eq!(top_score(&scores).unwrap().label, "fear");
    }

    #[test]
    fn top_label_agrees_with_ranking_when_scores_are_nan() {
        let cases = [
            vec![EmotionScore::new("joy", 0.5), EmotionScore::new("fear", f32::NAN)],
            vec![EmotionScore::new("fear", f32::NAN), EmotionScore::new("joy", 0.5)],
            vec![
                EmotionScore::new("joy", 0.5),
                EmotionScore::new("fear", -f32::NAN),
                EmotionScore::new("love", 0.9),
            ],
        ];
        for scores in cases {
            let ranked = crate::analysis::rank(scores.clone()).unwrap();
            assert_eq!(top_score(&scores).unwrap().label, ranked.top.label);
            assert_eq!(Fixed(scores).score_top("x").unwrap(), ranked.top.label);
        }
    }

    #[test]
    fn empty_scores_are_an_error() {
        let scorer = Fixed(vec![]);
        assert!(matches!(
            scorer.score_top("x"),
            Err(PipelineError::Unexpected(_))
        ));
        assert!(top_score(&[]).is_none());
    }

    #[test]
    fn boxed_scorer_delegates() {
        let scorer: Box<dyn EmotionScorer> = Box::new(Fixed(vec![EmotionScore::new("love", 1.0)]));
        assert_eq!(scorer.score_top("x").unwrap(), "love");
    }
}
