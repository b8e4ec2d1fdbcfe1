//! Local persistence: labeled sample recordings and the trained baseline.

mod model_store;
mod samples;

pub use model_store::ModelStore;
pub use samples::{read_samples, RecordingStats, SampleRecorder, CSV_COLUMNS, CSV_HEADER, LABEL_SELF};
