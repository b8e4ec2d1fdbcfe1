//! JSON log lines: one JSON object per line (ndjson) for ingestion and audit.

use crate::error::Result;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Machine-readable record of one authentication decision.
#[derive(Debug, Serialize)]
pub struct DecisionLine {
    pub ts: String,
    pub session: String,
    pub window: u64,
    pub distance: f32,
    pub accept: bool,
}

/// Initialize tracing with JSON or plain format
pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber on stderr; level from RUST_LOG or the
    /// configured default. Stdout stays free for decision lines.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry().with(filter).with(fmt).try_init();
        } else {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init();
        }
    }

    /// Write a single structured line without going through tracing.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> Result<()> {
        serde_json::to_writer(&mut *w, event)?;
        w.write_all(b"\n")?;
        Ok(())
    }
}
