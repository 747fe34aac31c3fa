//! Presenting analysis results: terminal rendering and the CSV dataset.

mod export;
mod render;

pub use export::{read_csv, ExportRow, EXPORT_FILENAME, EXPORT_MIME};
pub use render::{bar_chart, headline, sample_table, scores_json, BLANK_INPUT_WARNING};
