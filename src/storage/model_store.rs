//! Baseline persistence as a JSON document.

use crate::config::WindowConfig;
use crate::error::{Error, Result};
use crate::features::{FeatureVector, FEATURE_DIM};
use crate::model::BaselineModel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk form. Vectors are unsized so a model built for a different
/// feature set is reported instead of failing to parse.
#[derive(Debug, Serialize, Deserialize)]
struct ModelRecord {
    fs: u32,
    #[serde(alias = "win")]
    win_s: f64,
    #[serde(alias = "step")]
    step_s: f64,
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl From<&BaselineModel> for ModelRecord {
    fn from(model: &BaselineModel) -> Self {
        Self {
            fs: model.window.fs,
            win_s: model.window.win_s,
            step_s: model.window.step_s,
            mean: model.mean.as_slice().to_vec(),
            std: model.std.as_slice().to_vec(),
        }
    }
}

impl TryFrom<ModelRecord> for BaselineModel {
    type Error = Error;

    fn try_from(record: ModelRecord) -> Result<Self> {
        let vector = |name: &str, values: &[f32]| {
            FeatureVector::from_slice(values).ok_or_else(|| {
                Error::ModelIncompatibility(format!(
                    "{name} has {} features, extractor produces {FEATURE_DIM}",
                    values.len()
                ))
            })
        };
        let model = BaselineModel {
            window: WindowConfig::new(record.fs, record.win_s, record.step_s),
            mean: vector("mean", &record.mean)?,
            std: vector("std", &record.std)?,
        };
        model.validate()?;
        Ok(model)
    }
}

pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, model: &BaselineModel) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&ModelRecord::from(model))?;
        std::fs::write(&self.path, data)?;
        info!(path = %self.path.display(), "model saved");
        Ok(())
    }

    /// Load and check a baseline. Wrong vector length or a non-positive std
    /// is `ModelIncompatibility`; bad window parameters are `Configuration`.
    pub fn load(&self) -> Result<BaselineModel> {
        let data = std::fs::read_to_string(&self.path)?;
        let record: ModelRecord = serde_json::from_str(&data)?;
        BaselineModel::try_from(record)
    }
}
