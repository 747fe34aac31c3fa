use std::path::PathBuf;
use std::time::Duration;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use tokenizers::{Tokenizer, TruncationParams};

use crate::error::{PipelineError, Result};

/// Longest input (in tokens) the classifiers accept.
const MAX_SEQUENCE_LENGTH: usize = 512;

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    pub fn load(&self) -> Result<PathBuf> {
        let hf_api = hf_hub::api::sync::ApiBuilder::new()
            .with_progress(false)
            .build()
            .map_err(|e| {
                PipelineError::Download(format!("Failed to initialize HuggingFace API: {e}"))
            })?;
        let hf_api = hf_api.model(self.repo.clone());

        let max_retries = 3;
        let mut attempts = 0u32;

        for attempt in 0..max_retries {
            match hf_api.get(self.filename.as_str()) {
                Ok(path) => return Ok(path),
                Err(e) => {
                    let error_msg = e.to_string();
                    attempts = attempt + 1;
                    if error_msg.contains("Lock acquisition failed") && attempt < max_retries - 1 {
                        let wait_time = Duration::from_millis(100 * (1 << attempt));
                        tracing::debug!(repo = %self.repo, file = %self.filename, ?wait_time, "hub cache locked, retrying");
                        std::thread::sleep(wait_time);
                        continue;
                    }
                    return Err(PipelineError::Download(format!(
                        "Failed to download '{}' from '{}': {}",
                        self.filename, self.repo, error_msg
                    )));
                }
            }
        }

        Err(PipelineError::Download(format!(
            "Download timed out for '{}' from '{}' after {} attempt(s)",
            self.filename, self.repo, attempts
        )))
    }
}

/// Loads `tokenizer.json`, falling back to the base model's repo when a
/// fine-tuned checkpoint only ships the legacy vocab files.
#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    pub tokenizer_file_loader: HfLoader,
    pub fallback_loader: Option<HfLoader>,
}

impl TokenizerLoader {
    pub fn new(repo: &str, fallback_repo: Option<&str>) -> Self {
        Self {
            tokenizer_file_loader: HfLoader::new(repo, "tokenizer.json"),
            fallback_loader: fallback_repo.map(|r| HfLoader::new(r, "tokenizer.json")),
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let tokenizer_file_path = match (self.tokenizer_file_loader.load(), &self.fallback_loader) {
            (Ok(path), _) => path,
            (Err(e), Some(fallback)) => {
                tracing::info!(
                    repo = %self.tokenizer_file_loader.repo,
                    fallback = %fallback.repo,
                    "checkpoint has no tokenizer.json ({e}), using base model tokenizer"
                );
                fallback.load()?
            }
            (Err(e), None) => return Err(e),
        };
        let path_str = tokenizer_file_path.display().to_string();

        let mut tokenizer = Tokenizer::from_file(&tokenizer_file_path).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Failed to load tokenizer from '{}': {}",
                path_str, e
            ))
        })?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| {
                PipelineError::Tokenization(format!("Failed to configure truncation: {e}"))
            })?;

        Ok(tokenizer)
    }
}

/// The two files every sequence-classification checkpoint needs.
#[derive(Debug, Clone)]
pub struct ClassifierFiles {
    pub config_json: String,
    pub weights_path: PathBuf,
}

impl ClassifierFiles {
    pub fn var_builder(&self, device: &Device) -> Result<VarBuilder<'static>> {
        let weights_path = self.weights_path.clone();
        let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? }
        } else {
            VarBuilder::from_pth(&weights_path, DType::F32, device)?
        };
        Ok(vb)
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierLoader {
    pub repo: String,
}

impl ClassifierLoader {
    pub fn new(repo: &str) -> Self {
        Self { repo: repo.into() }
    }

    pub fn load(&self) -> Result<ClassifierFiles> {
        let config_path = HfLoader::new(&self.repo, "config.json").load()?;
        let weights_path = HfLoader::new(&self.repo, "model.safetensors")
            .load()
            .or_else(|_| HfLoader::new(&self.repo, "pytorch_model.bin").load())?;

        let config_json = std::fs::read_to_string(&config_path)?;

        Ok(ClassifierFiles {
            config_json,
            weights_path,
        })
    }
}
