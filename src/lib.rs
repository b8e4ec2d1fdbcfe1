//! Pulse Auth — lightweight biometric authentication from one streaming ADC channel.
//!
//! Modular structure:
//! - [`source`] — `S,<ms>,<adc>` line protocol, serial port and line sources
//! - [`features`] — Sliding window and per-window signal features
//! - [`model`] — Per-feature baseline: fitting (training) and z-distance scoring
//! - [`auth`] — Streaming authenticator, decisions and decision sinks
//! - [`storage`] — Labeled sample recordings and model persistence
//! - [`logging`] — Tracing setup and JSON decision lines

pub mod auth;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod source;
pub mod storage;

pub use auth::{Decision, DecisionSink, StreamAuthenticator};
pub use config::{AppConfig, WindowConfig};
pub use error::{Error, Result};
pub use features::{extract_features, FeatureVector, WindowBuffer, FEATURE_DIM};
pub use model::{BaselineModel, Trainer};
pub use source::{parse_record, LineSource, SampleSource, SerialPort};
pub use storage::ModelStore;
pub use logging::StructuredLogger;
