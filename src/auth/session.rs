//! Blocking read → score → emit loop over a line source.

use super::{DecisionSink, StreamAuthenticator};
use crate::error::Result;
use crate::source::{parse_record, SampleSource};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub lines: u64,
    pub samples: u64,
    pub malformed: u64,
    pub decisions: u64,
    pub accepted: u64,
}

/// Drive `auth` from `source` until the stream ends or `stop` is set.
/// `stop` is checked between records and after every read timeout.
/// Malformed lines are counted and skipped. Other source errors and sink
/// errors end the session.
pub fn run_session<S, K>(
    source: &mut S,
    auth: &mut StreamAuthenticator,
    sink: &mut K,
    stop: &AtomicBool,
) -> Result<SessionStats>
where
    S: SampleSource + ?Sized,
    K: DecisionSink + ?Sized,
{
    let mut stats = SessionStats::default();
    while !stop.load(Ordering::Relaxed) {
        let line = match source.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) if e.is_timeout() => continue,
            Err(e) => return Err(e),
        };
        stats.lines += 1;

        let record = match parse_record(&line) {
            Ok(r) => r,
            Err(e) => {
                stats.malformed += 1;
                debug!(error = %e, "record dropped");
                continue;
            }
        };
        stats.samples += 1;

        if let Some(decision) = auth.on_sample(record.adc) {
            stats.decisions += 1;
            if decision.accept {
                stats.accepted += 1;
            }
            sink.emit(&decision)?;
        }
    }
    Ok(stats)
}
