use serde::Serialize;

use crate::emotion::{EmotionScore, EmotionScorer};
use crate::error::{PipelineError, Result};

/// Every label ordered by confidence, highest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    /// The winning label (same as `ranked[0]`).
    pub top: EmotionScore,
    /// All labels, descending by confidence; ties keep the scorer's order.
    pub ranked: Vec<EmotionScore>,
}

/// Sort scores descending by confidence. `None` for an empty score list.
pub fn rank(scores: Vec<EmotionScore>) -> Option<Ranking> {
    let mut ranked = scores;
    // sort_by is stable, so equal scores keep their original order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    let top = ranked.first()?.clone();
    Some(Ranking { top, ranked })
}

/// Outcome of analyzing one piece of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// Input was empty or whitespace only; nothing was classified.
    Blank,
    /// Full label distribution.
    Ranked(Ranking),
}

/// Classify one sentence against every label.
///
/// Blank input never reaches the scorer. Scorer failures propagate.
pub fn detect<S>(scorer: &S, text: &str) -> Result<Detection>
where
    S: EmotionScorer + ?Sized,
{
    if text.trim().is_empty() {
        tracing::warn!("blank input, skipping classification");
        return Ok(Detection::Blank);
    }

    let scores = scorer.score_all(text)?;
    rank(scores)
        .map(Detection::Ranked)
        .ok_or_else(|| PipelineError::Unexpected("Scorer returned no labels".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f32)]) -> Vec<EmotionScore> {
        pairs.iter().map(|(l, s)| EmotionScore::new(*l, *s)).collect()
    }

    #[test]
    fn ranks_descending_with_stable_ties() {
        let ranking = rank(scores(&[
            ("sadness", 0.05),
            ("joy", 0.9),
            ("anger", 0.05),
        ]))
        .unwrap();

        let labels: Vec<&str> = ranking.ranked.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["joy", "sadness", "anger"]);
        assert_eq!(ranking.top, ranking.ranked[0]);
    }

    #[test]
    fn single_score_is_its_own_ranking() {
        let input = scores(&[("fear", 0.3)]);
        let ranking = rank(input.clone()).unwrap();
        assert_eq!(ranking.top, input[0]);
        assert_eq!(ranking.ranked, input);
    }

    #[test]
    fn empty_scores_have_no_ranking() {
        assert!(rank(Vec::new()).is_none());
    }

    #[test]
    fn ranked_is_sorted_for_arbitrary_scores() {
        let ranking = rank(scores(&[
            ("a", 0.2),
            ("b", 0.7),
            ("c", 0.1),
            ("d", 0.7),
            ("e", 0.0),
        ]))
        .unwrap();
        assert!(ranking
            .ranked
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
        assert_eq!(ranking.top.label, "b");
        assert_eq!(ranking.ranked[1].label, "d");
    }
}
