//! Per-feature Gaussian baseline of the enrolled user and its z-distance.

use crate::config::WindowConfig;
use crate::error::{Error, Result};
use crate::features::{FeatureVector, FEATURE_DIM, FEATURE_NAMES};

/// Added to every fitted standard deviation so scoring never divides by zero.
pub const STD_FLOOR: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct BaselineModel {
    /// Windowing the baseline was trained with; authentication must reuse it
    pub window: WindowConfig,
    pub mean: FeatureVector,
    pub std: FeatureVector,
}

impl BaselineModel {
    /// Fit column-wise mean and population std (plus `STD_FLOOR`) over the
    /// training feature vectors.
    pub fn fit(features: &[FeatureVector], window: WindowConfig) -> Result<Self> {
        window.validate()?;
        if features.is_empty() {
            return Err(Error::Configuration(
                "no training windows to fit a baseline".into(),
            ));
        }

        let rows = features.len() as f64;
        let mut mean = [0.0f32; FEATURE_DIM];
        let mut std = [0.0f32; FEATURE_DIM];
        for col in 0..FEATURE_DIM {
            let m = features.iter().map(|fv| fv.0[col] as f64).sum::<f64>() / rows;
            let var = features
                .iter()
                .map(|fv| (fv.0[col] as f64 - m).powi(2))
                .sum::<f64>()
                / rows;
            mean[col] = m as f32;
            std[col] = (var.sqrt() + STD_FLOOR) as f32;
        }

        Ok(Self {
            window,
            mean: FeatureVector(mean),
            std: FeatureVector(std),
        })
    }

    /// Euclidean norm of per-feature z-scores. Zero at the baseline mean.
    pub fn score(&self, feat: &FeatureVector) -> f32 {
        let sum: f64 = feat
            .0
            .iter()
            .zip(self.mean.0.iter().zip(self.std.0.iter()))
            .map(|(&f, (&m, &s))| {
                let z = (f as f64 - m as f64) / s as f64;
                z * z
            })
            .sum();
        sum.sqrt() as f32
    }

    /// Check the invariants a loaded model must hold before scoring.
    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        for (i, &s) in self.std.0.iter().enumerate() {
            if !(s.is_finite() && s > 0.0) {
                return Err(Error::ModelIncompatibility(format!(
                    "std of feature '{}' must be positive, got {s}",
                    FEATURE_NAMES[i]
                )));
            }
        }
        if let Some(i) = self.mean.0.iter().position(|m| !m.is_finite()) {
            return Err(Error::ModelIncompatibility(format!(
                "mean of feature '{}' is not finite",
                FEATURE_NAMES[i]
            )));
        }
        Ok(())
    }

    pub fn win_n(&self) -> usize {
        self.window.win_n()
    }

    pub fn step_n(&self) -> usize {
        self.window.step_n()
    }
}
