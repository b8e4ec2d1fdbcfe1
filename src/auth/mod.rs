//! Real-time authentication: per-window decisions and where they go.

mod authenticator;
mod session;

pub use authenticator::StreamAuthenticator;
pub use session::{run_session, SessionStats};

use crate::error::Result;
use crate::logging::{DecisionLine, StructuredLogger};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::Write;
use uuid::Uuid;

/// Outcome for one scored window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// 0-based emission index within the session
    pub window: u64,
    /// z-distance to the baseline
    pub distance: f32,
    pub accept: bool,
}

impl Decision {
    /// Wire form sent back to the board.
    pub fn reply_line(&self) -> String {
        format!("AUTH,{}\n", u8::from(self.accept))
    }
}

/// Consumer of decisions, called in stream order.
pub trait DecisionSink {
    fn emit(&mut self, decision: &Decision) -> Result<()>;
}

impl DecisionSink for Vec<Decision> {
    fn emit(&mut self, decision: &Decision) -> Result<()> {
        self.push(*decision);
        Ok(())
    }
}

impl<A: DecisionSink, B: DecisionSink> DecisionSink for (A, B) {
    fn emit(&mut self, decision: &Decision) -> Result<()> {
        self.0.emit(decision)?;
        self.1.emit(decision)
    }
}

impl<S: DecisionSink + ?Sized> DecisionSink for Box<S> {
    fn emit(&mut self, decision: &Decision) -> Result<()> {
        (**self).emit(decision)
    }
}

/// Writes `AUTH,<1|0>` lines back over the serial link.
pub struct SerialReply<W> {
    out: W,
}

impl<W: Write> SerialReply<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DecisionSink for SerialReply<W> {
    fn emit(&mut self, decision: &Decision) -> Result<()> {
        self.out.write_all(decision.reply_line().as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Human-readable (`distance=4.21 AUTH=1`) or ndjson decision lines.
pub struct ConsoleSink<W> {
    out: W,
    json: bool,
    session: Uuid,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, json: bool, session: Uuid) -> Self {
        Self { out, json, session }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DecisionSink for ConsoleSink<W> {
    fn emit(&mut self, decision: &Decision) -> Result<()> {
        if self.json {
            let line = DecisionLine {
                ts: Utc::now().to_rfc3339(),
                session: self.session.to_string(),
                window: decision.window,
                distance: decision.distance,
                accept: decision.accept,
            };
            StructuredLogger::emit_json(&line, &mut self.out)?;
        } else {
            writeln!(
                self.out,
                "distance={:.2} AUTH={}",
                decision.distance,
                u8::from(decision.accept)
            )?;
        }
        Ok(())
    }
}
