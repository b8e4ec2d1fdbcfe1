//! Sensor stream input: the `S,<ms>,<adc>` line protocol and line sources
//! (serial port, recorded capture, any reader).

mod serial;

pub use serial::{PortHandle, SerialPort};

use crate::error::{Error, Result};
use std::io::BufRead;

/// Record prefix the sensor firmware puts on sample lines.
pub const SAMPLE_PREFIX: &str = "S,";

/// One parsed sample line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRecord {
    /// Board uptime in milliseconds, when the field is an unsigned integer
    pub ms: Option<u64>,
    /// Raw ADC reading
    pub adc: f32,
}

/// Parse a protocol line. Surrounding whitespace is ignored. The line must be
/// `S,<ms>,<adc>` with a finite number in `<adc>`; `<ms>` is informational
/// and kept only when it parses.
pub fn parse_record(line: &str) -> Result<SampleRecord> {
    let line = line.trim();
    if !line.starts_with(SAMPLE_PREFIX) {
        return Err(Error::MalformedRecord(format!("not a sample line: {line:?}")));
    }
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 3 {
        return Err(Error::MalformedRecord(format!(
            "expected 3 fields, got {}: {line:?}",
            fields.len()
        )));
    }
    let ms = fields[1].trim().parse::<u64>().ok();
    let adc = fields[2]
        .trim()
        .parse::<f32>()
        .map_err(|e| Error::MalformedRecord(format!("bad adc value {:?}: {e}", fields[2])))?;
    if !adc.is_finite() {
        return Err(Error::MalformedRecord(format!("non-finite adc value {adc}")));
    }
    Ok(SampleRecord { ms, adc })
}

/// Pull-based source of raw protocol lines.
pub trait SampleSource {
    /// Next line without its terminator. `Ok(None)` means the stream ended.
    /// Sources with a read timeout return an error for which
    /// [`Error::is_timeout`] holds; calling again resumes the same line.
    fn next_line(&mut self) -> Result<Option<String>>;
}

/// Line source over any buffered reader. Bytes that aren't UTF-8 are
/// replaced rather than failing the line. A partial line survives a failed
/// read and is completed by the next call.
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(64),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> SampleSource for LineSource<R> {
    fn next_line(&mut self) -> Result<Option<String>> {
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 && self.buf.is_empty() {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&self.buf)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        self.buf.clear();
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{self, BufReader, Cursor, Read};

    /// Reader that replays scripted chunks and read errors.
    struct Scripted(VecDeque<io::Result<&'static [u8]>>);

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                None => Ok(0),
                Some(Err(e)) => Err(e),
                Some(Ok(chunk)) => {
                    buf[..chunk.len()].copy_from_slice(chunk);
                    Ok(chunk.len())
                }
            }
        }
    }

    #[test]
    fn parses_sample_line() {
        assert_eq!(
            parse_record("S,100,512").unwrap(),
            SampleRecord { ms: Some(100), adc: 512.0 }
        );
        assert_eq!(
            parse_record("  S, 2500 , 13.5\r\n").unwrap(),
            SampleRecord { ms: Some(2500), adc: 13.5 }
        );
    }

    #[test]
    fn timestamp_is_informational() {
        assert_eq!(
            parse_record("S,abc,512").unwrap(),
            SampleRecord { ms: None, adc: 512.0 }
        );
        assert_eq!(parse_record("S,-5,512").unwrap().ms, None);
        assert_eq!(parse_record("S,,7").unwrap().adc, 7.0);
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in [
            "S,100",
            "S,100,512,7",
            "X,100,512",
            "s,100,512",
            "S,100,",
            "S,100,high",
            "S,100,NaN",
            "S,100,inf",
            "",
            "AUTH,1",
        ] {
            assert!(
                matches!(parse_record(line), Err(Error::MalformedRecord(_))),
                "{line:?} should be malformed"
            );
        }
    }

    #[test]
    fn line_source_splits_and_strips_terminators() {
        let data = b"S,1,10\r\nS,2,11\ngarbage\xff\xfe\nS,3,12";
        let mut src = LineSource::new(Cursor::new(&data[..]));
        assert_eq!(src.next_line().unwrap().as_deref(), Some("S,1,10"));
        assert_eq!(src.next_line().unwrap().as_deref(), Some("S,2,11"));
        let junk = src.next_line().unwrap().unwrap();
        assert!(junk.starts_with("garbage"));
        assert!(parse_record(&junk).is_err());
        assert_eq!(src.next_line().unwrap().as_deref(), Some("S,3,12"));
        assert_eq!(src.next_line().unwrap(), None);
    }

    #[test]
    fn timeout_keeps_partial_line() {
        let script = VecDeque::from([
            Ok(&b"S,1,"[..]),
            Err(io::Error::from(io::ErrorKind::TimedOut)),
            Ok(&b"10\nS,2,11\n"[..]),
        ]);
        let mut src = LineSource::new(BufReader::new(Scripted(script)));
        let err = src.next_line().unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(src.next_line().unwrap().as_deref(), Some("S,1,10"));
        assert_eq!(src.next_line().unwrap().as_deref(), Some("S,2,11"));
        assert_eq!(src.next_line().unwrap(), None);
    }

    #[test]
    fn trailing_partial_line_is_returned_at_end() {
        let script = VecDeque::from([
            Ok(&b"S,3,"[..]),
            Err(io::Error::from(io::ErrorKind::TimedOut)),
            Ok(&b"12"[..]),
        ]);
        let mut src = LineSource::new(BufReader::new(Scripted(script)));
        assert!(src.next_line().is_err());
        assert_eq!(src.next_line().unwrap().as_deref(), Some("S,3,12"));
        assert_eq!(src.next_line().unwrap(), None);
    }
}
