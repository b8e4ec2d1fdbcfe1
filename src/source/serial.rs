//! Serial link to the sensor board, through the `serialport` crate. Reads
//! give up after the configured timeout so callers can check their stop
//! flag while the board is silent.

use super::LineSource;
use crate::error::{Error, Result};
use std::io::BufReader;
use std::time::Duration;
use tracing::info;

/// Handle to an open port. Reader and writer are independent clones.
pub type PortHandle = Box<dyn serialport::SerialPort>;

pub struct SerialPort {
    port: PortHandle,
    path: String,
}

impl SerialPort {
    /// Open `path` at `baud`, 8N1, no flow control. A read that sees no byte
    /// for `timeout` fails with a timeout error (see [`Error::is_timeout`]).
    pub fn open(path: &str, baud: u32, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::Configuration(
                "serial read timeout must be > 0 ms".into(),
            ));
        }
        let port = serialport::new(path, baud)
            .timeout(timeout)
            .open()
            .map_err(std::io::Error::from)?;
        info!(
            port = path,
            baud,
            timeout_ms = timeout.as_millis() as u64,
            "serial port open"
        );
        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Line reader over a clone of the port handle.
    pub fn lines(&self) -> Result<LineSource<BufReader<PortHandle>>> {
        Ok(LineSource::new(BufReader::new(self.try_clone()?)))
    }

    /// Writable handle for replies to the board.
    pub fn writer(&self) -> Result<PortHandle> {
        self.try_clone()
    }

    fn try_clone(&self) -> Result<PortHandle> {
        Ok(self.port.try_clone().map_err(std::io::Error::from)?)
    }
}
