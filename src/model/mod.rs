//! Baseline model of the legitimate user: fitting and distance scoring.

mod baseline;
mod trainer;

pub use baseline::{BaselineModel, STD_FLOOR};
pub use trainer::{Trainer, TrainingReport};
