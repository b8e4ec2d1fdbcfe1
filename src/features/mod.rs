//! Signal feature extraction: sample stream → fixed-stride windows → feature vectors.

mod extract;
mod window;

pub use extract::extract_features;
pub use window::WindowBuffer;

use serde::{Deserialize, Serialize};

/// Number of features produced per window.
pub const FEATURE_DIM: usize = 10;

/// Feature names in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_DIM] = [
    "mean",
    "std",
    "min",
    "max",
    "range",
    "energy",
    "zero_crossings",
    "slope_mean",
    "slope_std",
    "slope_abs_mean",
];

/// Fixed-size feature vector for one window. All statistics are taken over
/// the mean-centered window, so `mean()` is ~0; it stays in the vector because
/// trained baselines carry a column for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f32; FEATURE_DIM]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Build from a slice; `None` unless it holds exactly `FEATURE_DIM` values.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        <[f32; FEATURE_DIM]>::try_from(values).ok().map(Self)
    }

    pub fn mean(&self) -> f32 {
        self.0[0]
    }

    pub fn std(&self) -> f32 {
        self.0[1]
    }

    pub fn min(&self) -> f32 {
        self.0[2]
    }

    pub fn max(&self) -> f32 {
        self.0[3]
    }

    pub fn range(&self) -> f32 {
        self.0[4]
    }

    /// Mean square of the centered window.
    pub fn energy(&self) -> f32 {
        self.0[5]
    }

    pub fn zero_crossings(&self) -> f32 {
        self.0[6]
    }

    pub fn slope_mean(&self) -> f32 {
        self.0[7]
    }

    pub fn slope_std(&self) -> f32 {
        self.0[8]
    }

    pub fn slope_abs_mean(&self) -> f32 {
        self.0[9]
    }
}

impl From<[f32; FEATURE_DIM]> for FeatureVector {
    fn from(values: [f32; FEATURE_DIM]) -> Self {
        Self(values)
    }
}
