//! Crate error type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad window parameters, threshold, config file, or too little training data.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A stream record failed line-protocol or numeric parsing.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A stored baseline cannot be scored against the feature extractor.
    #[error("model incompatible: {0}")]
    ModelIncompatibility(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// A read that gave up waiting for data. The source is still usable.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Io(e) if matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
