use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{PipelineError, Result};

#[derive(Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// The checkpoint's label set, indexed by classifier output position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    /// Read `id2label` out of a checkpoint's `config.json`.
    pub fn from_config_json(config_json: &str) -> Result<Self> {
        let class_cfg: ClassifierConfigJson = serde_json::from_str(config_json)?;
        if class_cfg.id2label.is_empty() {
            return Err(PipelineError::Unexpected(
                "Checkpoint config.json has no id2label table".into(),
            ));
        }

        let mut indexed = class_cfg
            .id2label
            .into_iter()
            .map(|(id, label)| {
                id.parse::<usize>().map(|i| (i, label)).map_err(|_| {
                    PipelineError::Unexpected(format!("Non-numeric id2label key '{id}'"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        indexed.sort_by_key(|(i, _)| *i);

        if let Some((pos, (id, _))) = indexed.iter().enumerate().find(|(pos, (id, _))| pos != id) {
            return Err(PipelineError::Unexpected(format!(
                "id2label is not contiguous: expected id {pos}, found {id}"
            )));
        }

        Ok(Self {
            labels: indexed.into_iter().map(|(_, label)| label).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Pair each label with its probability, in classifier order.
    pub fn zip_scores(&self, probs: &[f32]) -> Result<Vec<(String, f32)>> {
        if probs.len() != self.labels.len() {
            return Err(PipelineError::Unexpected(format!(
                "Model returned {} scores for {} labels ({})",
                probs.len(),
                self.labels.len(),
                self.labels.join(", ")
            )));
        }
        Ok(self.labels.iter().cloned().zip(probs.iter().copied()).collect())
    }
}
