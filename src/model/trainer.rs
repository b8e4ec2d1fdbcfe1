//! Offline enrollment: recording → batch windows → features → baseline.

use super::BaselineModel;
use crate::config::WindowConfig;
use crate::error::{Error, Result};
use crate::features::{extract_features, FeatureVector, FEATURE_DIM};
use tracing::info;

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub model: BaselineModel,
    /// Windows the baseline was fitted on
    pub windows: usize,
    pub features_dim: usize,
}

pub struct Trainer {
    window: WindowConfig,
}

impl Trainer {
    pub fn new(window: WindowConfig) -> Result<Self> {
        window.validate()?;
        Ok(Self { window })
    }

    /// Windows starting at `0, step_n, 2*step_n, ...` while a full window
    /// still fits in the recording.
    pub fn windows<'a>(&self, samples: &'a [f32]) -> impl Iterator<Item = &'a [f32]> + 'a {
        let win_n = self.window.win_n();
        let step_n = self.window.step_n();
        let count = if samples.len() >= win_n {
            (samples.len() - win_n) / step_n + 1
        } else {
            0
        };
        (0..count).map(move |i| &samples[i * step_n..i * step_n + win_n])
    }

    /// Fit a baseline over the recording. Fails before any extraction when
    /// the recording is shorter than one window.
    pub fn fit(&self, samples: &[f32]) -> Result<TrainingReport> {
        if (samples.len() as f64) < self.window.min_samples() {
            return Err(Error::Configuration(format!(
                "not enough training samples: need {}, have {} (record at least a minute or two)",
                self.window.min_samples().ceil(),
                samples.len()
            )));
        }

        let features: Vec<FeatureVector> = self.windows(samples).map(extract_features).collect();
        if features.is_empty() {
            return Err(Error::Configuration(format!(
                "recording of {} samples yields no {}-sample window",
                samples.len(),
                self.window.win_n()
            )));
        }

        let model = BaselineModel::fit(&features, self.window)?;
        info!(
            samples = samples.len(),
            windows = features.len(),
            features_dim = FEATURE_DIM,
            "baseline fitted"
        );
        Ok(TrainingReport {
            model,
            windows: features.len(),
            features_dim: FEATURE_DIM,
        })
    }
}
