use std::cell::Cell;
use std::fs::File;

use emotion_pipelines::analysis::{
    detect, survey, Detection, LabeledRecord, SurveyReport, TextRecord, SENTINEL_LABEL,
};
use emotion_pipelines::config::load_defaults;
use emotion_pipelines::emotion::{EmotionScore, EmotionScorer};
use emotion_pipelines::error::{PipelineError, Result};
use emotion_pipelines::report::{headline, read_csv, EXPORT_FILENAME};
use emotion_pipelines::source::{CsvPostSource, Post};

/// Returns the same distribution for every input and counts calls.
struct FixedScorer {
    scores: Vec<EmotionScore>,
    calls: Cell<usize>,
}

impl FixedScorer {
    fn new(pairs: &[(&str, f32)]) -> Self {
        Self {
            scores: pairs.iter().map(|(l, s)| EmotionScore::new(*l, *s)).collect(),
            calls: Cell::new(0),
        }
    }
}

impl EmotionScorer for FixedScorer {
    fn score_all(&self, _text: &str) -> Result<Vec<EmotionScore>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.scores.clone())
    }
}

/// Picks a label from keywords; fails on empty text and on "boom".
struct KeywordScorer;

impl EmotionScorer for KeywordScorer {
    fn score_all(&self, text: &str) -> Result<Vec<EmotionScore>> {
        if text.is_empty() || text.contains("boom") {
            return Err(PipelineError::Tokenization(format!("cannot score '{text}'")));
        }
        let joy = if text.contains("great") { 0.8 } else { 0.1 };
        Ok(vec![
            EmotionScore::new("sadness", 0.5),
            EmotionScore::new("joy", joy),
        ])
    }
}

fn posts(texts: &[&str]) -> Vec<Result<Post>> {
    texts.iter().map(|t| Ok(Post::untimed(*t))).collect()
}

#[test]
fn single_text_ranks_every_label() -> Result<()> {
    let scorer = FixedScorer::new(&[("joy", 0.9), ("sadness", 0.05), ("anger", 0.05)]);

    let Detection::Ranked(ranking) = detect(&scorer, "I am so happy today!")? else {
        panic!("expected a ranking");
    };

    assert_eq!(ranking.top, EmotionScore::new("joy", 0.9));
    let labels: Vec<&str> = ranking.ranked.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, ["joy", "sadness", "anger"]);
    assert_eq!(headline(&ranking), "Predicted Emotion: joy (0.90)");
    Ok(())
}

#[test]
fn blank_input_never_reaches_the_scorer() -> Result<()> {
    let scorer = FixedScorer::new(&[("joy", 1.0)]);

    assert_eq!(detect(&scorer, "   ")?, Detection::Blank);
    assert_eq!(detect(&scorer, "")?, Detection::Blank);
    assert_eq!(detect(&scorer, "\n\t")?, Detection::Blank);
    assert_eq!(scorer.calls.get(), 0);
    Ok(())
}

#[test]
fn single_text_scorer_failure_propagates() {
    let err = detect(&KeywordScorer, "boom").unwrap_err();
    assert!(matches!(err, PipelineError::Tokenization(_)));
}

#[test]
fn survey_cleans_labels_and_exports() -> Result<()> {
    let source = posts(&["Check http://x.com #mentalhealth @bob", "", "I feel great"]);
    let report = survey(&KeywordScorer, source, 100)?;

    let cleaned: Vec<&str> = report
        .records()
        .iter()
        .map(|r| r.record.cleaned_text.as_str())
        .collect();
    assert_eq!(cleaned, ["check mentalhealth", "", "i feel great"]);

    let labels: Vec<&str> = report.records().iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["sadness", SENTINEL_LABEL, "joy"]);

    let total: usize = report.frequency_table().iter().map(|(_, n)| n).sum();
    assert_eq!(total, 3);

    let mut buf = Vec::new();
    report.write_csv(&mut buf)?;
    let csv = String::from_utf8(buf).expect("utf-8 csv");
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.starts_with("Date,Tweet,Cleaned_Tweet,Emotion\n"));
    Ok(())
}

#[test]
fn failing_record_falls_back_without_touching_others() -> Result<()> {
    let source = posts(&["great news", "boom goes the dynamite", "so great"]);
    let report = survey(&KeywordScorer, source, 100)?;

    let labels: Vec<&str> = report.records().iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["joy", "Unknown", "joy"]);
    assert_eq!(report.unknown_count(), 1);
    assert_eq!(
        report.frequency_table(),
        vec![("joy".to_string(), 2), ("Unknown".to_string(), 1)]
    );
    Ok(())
}

#[test]
fn survey_respects_post_cap() -> Result<()> {
    let scorer = FixedScorer::new(&[("fear", 0.7), ("joy", 0.3)]);
    let source = (0..1000).map(|i| Ok(Post::untimed(format!("post number {i}"))));

    let report = survey(&scorer, source, 50)?;
    assert_eq!(report.len(), 50);
    assert_eq!(scorer.calls.get(), 50);
    assert_eq!(report.records()[49].record.index, 49);
    Ok(())
}

#[test]
fn source_failure_aborts_before_scoring() {
    let scorer = FixedScorer::new(&[("joy", 1.0)]);
    let source = vec![
        Ok(Post::untimed("first")),
        Err(PipelineError::Source("HTTP 429".into())),
    ];

    let err = survey(&scorer, source, 100).unwrap_err();
    assert!(err.is_acquisition_failure());
    assert_eq!(scorer.calls.get(), 0);
}

#[test]
fn trait_objects_work_as_scorers() -> Result<()> {
    let scorer: Box<dyn EmotionScorer> = Box::new(KeywordScorer);
    let report = survey(scorer.as_ref(), posts(&["great"]), 10)?;
    assert_eq!(report.records()[0].label, "joy");
    Ok(())
}

#[test]
fn exported_dataset_round_trips_through_disk() -> Result<()> {
    let tricky = [
        "Commas, everywhere, really",
        "She said \"hi\" and left",
        "line one\nline two\r\nline three",
        "",
    ];
    let report = SurveyReport::new(
        tricky
            .iter()
            .enumerate()
            .map(|(i, t)| LabeledRecord {
                record: TextRecord::from_post(i, Post::untimed(*t)),
                label: if i % 2 == 0 { "joy".into() } else { "anger, mild".into() },
            })
            .collect(),
    );

    let dir = tempfile::tempdir()?;
    let path = dir.path().join(EXPORT_FILENAME);
    report.export_csv(&path)?;

    let rows = read_csv(File::open(&path)?)?;
    assert_eq!(rows.len(), report.len());
    for (row, labeled) in rows.iter().zip(report.records()) {
        assert_eq!(row.tweet, labeled.record.raw_text);
        assert_eq!(row.cleaned_tweet, labeled.record.cleaned_text);
        assert_eq!(row.emotion, labeled.label);
        assert!(row.date.is_none());
    }
    Ok(())
}

#[test]
fn previous_export_can_feed_a_new_survey() -> Result<()> {
    let first = survey(
        &KeywordScorer,
        posts(&["Mental health is great", "unrelated", "MENTAL HEALTH, again"]),
        100,
    )?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("previous.csv");
    first.export_csv(&path)?;

    let second = survey(&KeywordScorer, CsvPostSource::open(&path, "mental health")?, 100)?;
    let texts: Vec<&str> = second
        .records()
        .iter()
        .map(|r| r.record.raw_text.as_str())
        .collect();
    assert_eq!(texts, ["Mental health is great", "MENTAL HEALTH, again"]);
    Ok(())
}

#[test]
fn hashtag_export_survives_reanalysis_with_default_query() -> Result<()> {
    let texts: Vec<String> = (0..150)
        .map(|i| format!("Rough week {i} #MentalHealth"))
        .collect();
    let first = survey(
        &KeywordScorer,
        texts.iter().map(|t| Ok(Post::untimed(t.as_str()))),
        usize::MAX,
    )?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join(EXPORT_FILENAME);
    first.export_csv(&path)?;

    let settings = load_defaults()?.survey;
    let source = CsvPostSource::open(&path, &settings.default_query)?;
    let second = survey(&KeywordScorer, source, usize::MAX)?;
    assert_eq!(second.len(), 150);

    let plan = settings.plan(None, None, Some(&path), None)?;
    let whole_file = survey(
        &KeywordScorer,
        CsvPostSource::open(&path, &plan.query)?,
        plan.max_posts,
    )?;
    assert_eq!(whole_file.len(), 150);
    Ok(())
}
