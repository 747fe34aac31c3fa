//! Layered configuration for the `emotion` CLI.
//!
//! `defaults/emotion.default.toml` is embedded into the binary. [`Loader`]
//! stacks user files and command-line overrides on top of it before
//! deserializing into [`EmotionConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;

use crate::emotion::{Checkpoint, DeviceRequest, ModelFamily};
use crate::error::{PipelineError, Result};
use crate::source::TagTimelineOptions;

const DEFAULT_TOML: &str = include_str!("../defaults/emotion.default.toml");

/// Picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = "emotion.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmotionConfig {
    /// Inference device.
    #[serde(default)]
    pub device: DeviceConfig,
    /// Single-text mode.
    pub detect: DetectConfig,
    /// Batch mode.
    pub survey: SurveyConfig,
    /// Post retrieval.
    pub source: SourceConfig,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub cuda: Option<usize>,
}

impl DeviceConfig {
    /// The device every pipeline is built on.
    pub fn request(&self) -> DeviceRequest {
        DeviceRequest::from_cuda_index(self.cuda)
    }
}

/// Which checkpoint a mode runs.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Architecture of the checkpoint.
    pub family: ModelFamily,
    /// Hub repository; the family default when unset.
    #[serde(default)]
    pub repo: Option<String>,
}

impl ModelConfig {
    /// Resolved checkpoint.
    pub fn checkpoint(&self) -> Checkpoint {
        match &self.repo {
            Some(repo) => Checkpoint::new(repo.as_str()),
            None => self.family.default_checkpoint(),
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize)]
pub struct DetectConfig {
    pub model: ModelConfig,
}

/// Batch-mode settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyConfig {
    /// Checkpoint used to label posts.
    pub model: ModelConfig,
    /// Keyword searched when `--query` is absent.
    pub default_query: String,
    /// Posts retrieved when `--max-posts` is absent.
    pub default_max_posts: usize,
    /// Lower bound accepted for the post count.
    pub min_posts: usize,
    /// Upper bound accepted for the post count.
    pub max_posts: usize,
    /// Rows shown in the sample table.
    pub sample_size: usize,
    /// Where the dataset is written.
    pub export_path: PathBuf,
}

impl SurveyConfig {
    /// Check `requested` against the configured bounds.
    pub fn post_limit(&self, requested: Option<usize>) -> Result<usize> {
        let n = requested.unwrap_or(self.default_max_posts);
        if !(self.min_posts..=self.max_posts).contains(&n) {
            return Err(PipelineError::Config(format!(
                "Post count {n} outside {}..={}",
                self.min_posts, self.max_posts
            )));
        }
        Ok(n)
    }

    /// Resolve one survey run from the command-line values.
    ///
    /// Re-analyzing a CSV file (`from_csv`) keeps every row unless a query or
    /// a post count is given. Output never lands on the input file: a defaulted
    /// path that resolves to it gets a `_relabeled` sibling instead, an explicit
    /// one is refused.
    pub fn plan(
        &self,
        query: Option<String>,
        max_posts: Option<usize>,
        from_csv: Option<&Path>,
        out: Option<PathBuf>,
    ) -> Result<SurveyPlan> {
        let query = match (query, from_csv) {
            (Some(q), _) => q,
            (None, Some(_)) => String::new(),
            (None, None) => self.default_query.clone(),
        };

        let max_posts = match (max_posts, from_csv) {
            (None, Some(_)) => usize::MAX,
            (requested, _) => self.post_limit(requested)?,
        };

        let export_path = match (out, from_csv) {
            (Some(out), Some(input)) if same_file(&out, input) => {
                return Err(PipelineError::Config(format!(
                    "Refusing to overwrite the input file '{}'",
                    input.display()
                )));
            }
            (Some(out), _) => out,
            (None, Some(input)) if same_file(&self.export_path, input) => relabeled_path(input),
            (None, _) => self.export_path.clone(),
        };

        Ok(SurveyPlan {
            query,
            max_posts,
            export_path,
        })
    }
}

/// What one `survey` run fetches and where it writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyPlan {
    /// Keyword filter; empty matches everything.
    pub query: String,
    /// Upper bound on posts pulled from the source.
    pub max_posts: usize,
    /// Destination of the labeled dataset.
    pub export_path: PathBuf,
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// emotion_analysis.csv -> emotion_analysis_relabeled.csv
fn relabeled_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "emotion_analysis".into());
    input.with_file_name(format!("{stem}_relabeled.csv"))
}

/// Mastodon-compatible instance settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the instance.
    pub instance: String,
    /// Statuses per request.
    pub page_size: usize,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` sent with requests.
    pub user_agent: String,
}

impl SourceConfig {
    /// Options for [`TagTimeline`](crate::source::TagTimeline).
    pub fn timeline_options(&self) -> TagTimelineOptions {
        TagTimelineOptions {
            instance: self.instance.clone(),
            page_size: self.page_size,
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Layers user overrides over the built-in defaults.
///
/// ```rust
/// use emotion_pipelines::config::Loader;
///
/// # fn main() -> emotion_pipelines::error::Result<()> {
/// let config = Loader::new()
///     .set_override("survey.default_query", "anxiety")?
///     .build()?;
/// assert_eq!(config.survey.default_query, "anxiety");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start from the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file that must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a TOML file if it exists.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override one dotted key, e.g. `device.cuda`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge every layer and validate the result.
    pub fn build(self) -> Result<EmotionConfig> {
        let config: EmotionConfig = self.builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionConfig {
    fn validate(&self) -> Result<()> {
        let s = &self.survey;
        if s.min_posts > s.max_posts {
            return Err(PipelineError::Config(format!(
                "survey.min_posts ({}) exceeds survey.max_posts ({})",
                s.min_posts, s.max_posts
            )));
        }
        s.post_limit(None)?;
        if s.sample_size == 0 {
            return Err(PipelineError::Config("survey.sample_size must be positive".into()));
        }
        if self.source.page_size == 0 {
            return Err(PipelineError::Config("source.page_size must be positive".into()));
        }
        Ok(())
    }
}

/// Defaults only.
pub fn load_defaults() -> Result<EmotionConfig> {
    Loader::new().build()
}
