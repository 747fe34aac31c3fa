//! Plain-text rendering for the terminal.

use crate::analysis::{LabeledRecord, Ranking};
use crate::emotion::EmotionScore;
use crate::error::Result;

/// Shown instead of a result when single-text input is blank.
pub const BLANK_INPUT_WARNING: &str = "Please enter some text to analyze.";

const BAR_WIDTH: usize = 40;

/// `Predicted Emotion: joy (0.90)`
pub fn headline(ranking: &Ranking) -> String {
    format!(
        "Predicted Emotion: {} ({:.2})",
        ranking.top.label, ranking.top.score
    )
}

/// Pretty JSON array of `{label, score}` objects.
pub fn scores_json(scores: &[EmotionScore]) -> Result<String> {
    Ok(serde_json::to_string_pretty(scores)?)
}

/// Two-column table of post text and emotion. Text is kept on one line and cut at `width` chars.
pub fn sample_table(records: &[LabeledRecord], width: usize) -> String {
    let label_width = records
        .iter()
        .map(|r| r.label.chars().count())
        .chain(std::iter::once("Emotion".len()))
        .max()
        .unwrap_or_default();

    let header = format!("{:<width$}  Emotion\n", "Tweet");
    let rule = format!("{}  {}\n", "-".repeat(width), "-".repeat(label_width));
    let rows = records
        .iter()
        .map(|r| format!("{:<width$}  {}\n", one_line(&r.record.raw_text, width), r.label));

    [header, rule].into_iter().chain(rows).collect()
}

fn one_line(text: &str, width: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flat.chars().count() <= width {
        return flat;
    }
    let mut cut: String = flat.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Horizontal bar per label, longest bar for the largest count.
pub fn bar_chart(table: &[(String, usize)]) -> String {
    let max = table.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let label_width = table
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0);

    table
        .iter()
        .map(|(label, count)| {
            let len = if max == 0 { 0 } else { count * BAR_WIDTH / max };
            format!("{label:>label_width$} | {} {count}\n", "#".repeat(len.max(1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{rank, TextRecord};
    use crate::source::Post;

    #[test]
    fn headline_uses_two_decimals() {
        let ranking = rank(vec![
            EmotionScore::new("joy", 0.9),
            EmotionScore::new("anger", 0.05),
        ])
        .unwrap();
        assert_eq!(headline(&ranking), "Predicted Emotion: joy (0.90)");
    }

    #[test]
    fn scores_dump_as_label_score_objects() {
        let json = scores_json(&[EmotionScore::new("joy", 0.5)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["label"], "joy");
        assert_eq!(value[0]["score"], 0.5);
    }

    #[test]
    fn long_or_multiline_text_stays_on_one_row() {
        let records = vec![LabeledRecord {
            record: TextRecord::from_post(0, Post::untimed("line one\nline two is quite long")),
            label: "joy".into(),
        }];
        let table = sample_table(&records, 12);
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], "line one ...  joy");
    }

    #[test]
    fn table_has_header_rule_and_one_row_per_record() {
        let records = vec![
            LabeledRecord {
                record: TextRecord::from_post(0, Post::untimed("calm")),
                label: "surprise".into(),
            },
            LabeledRecord {
                record: TextRecord::from_post(1, Post::untimed("loud")),
                label: "joy".into(),
            },
        ];
        let table = sample_table(&records, 6);
        assert_eq!(
            table,
            "Tweet   Emotion\n------  --------\ncalm    surprise\nloud    joy\n"
        );
        assert_eq!(sample_table(&[], 5), "Tweet  Emotion\n-----  -------\n");
    }

    #[test]
    fn bars_scale_to_largest_count() {
        let chart = bar_chart(&[("joy".into(), 4), ("fear".into(), 2)]);
        let rows: Vec<&str> = chart.lines().collect();
        assert_eq!(rows[0], format!(" joy | {} 4", "#".repeat(BAR_WIDTH)));
        assert_eq!(rows[1], format!("fear | {} 2", "#".repeat(BAR_WIDTH / 2)));
        assert!(bar_chart(&[]).is_empty());
    }
}
