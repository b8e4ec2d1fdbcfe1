//! Live scoring: sample stream → sliding window → features → z-distance → decision.

use super::Decision;
use crate::config::AuthConfig;
use crate::error::Result;
use crate::features::{extract_features, WindowBuffer};
use crate::model::BaselineModel;
use crate::source::parse_record;

pub struct StreamAuthenticator {
    model: BaselineModel,
    buffer: WindowBuffer,
    threshold: f32,
    /// Windows scored so far
    emitted: u64,
}

impl StreamAuthenticator {
    /// Windowing comes from the model so scoring matches training.
    pub fn new(model: BaselineModel, threshold: f32) -> Result<Self> {
        model.validate()?;
        AuthConfig { threshold }.validate()?;
        let buffer = WindowBuffer::from_config(&model.window)?;
        Ok(Self {
            model,
            buffer,
            threshold,
            emitted: 0,
        })
    }

    /// Feed one reading. Returns a decision each time a window completes.
    /// Non-finite readings are dropped and leave the buffer untouched.
    pub fn on_sample(&mut self, value: f32) -> Option<Decision> {
        if !value.is_finite() {
            return None;
        }
        let window = self.buffer.ingest(value)?;
        let features = extract_features(&window);
        let distance = self.model.score(&features);
        let decision = Decision {
            window: self.emitted,
            distance,
            accept: distance < self.threshold,
        };
        self.emitted += 1;
        Some(decision)
    }

    /// Feed one raw protocol line; malformed lines are dropped.
    pub fn on_record(&mut self, line: &str) -> Option<Decision> {
        let record = parse_record(line).ok()?;
        self.on_sample(record.adc)
    }

    pub fn model(&self) -> &BaselineModel {
        &self.model
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Samples currently held in the window buffer.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn windows_scored(&self) -> u64 {
        self.emitted
    }
}
