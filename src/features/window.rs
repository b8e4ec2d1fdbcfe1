//! Fixed-size, fixed-stride sliding window over the live sample stream.

use crate::config::WindowConfig;
use crate::error::{Error, Result};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct WindowBuffer {
    samples: VecDeque<f32>,
    win_n: usize,
    step_n: usize,
    /// Samples ingested since the last emitted window
    since_last_emit: usize,
}

impl WindowBuffer {
    pub fn new(win_n: usize, step_n: usize) -> Result<Self> {
        if win_n == 0 || step_n == 0 {
            return Err(Error::Configuration(format!(
                "window buffer needs win_n >= 1 and step_n >= 1, got {win_n}/{step_n}"
            )));
        }
        Ok(Self {
            samples: VecDeque::with_capacity(win_n),
            win_n,
            step_n,
            since_last_emit: 0,
        })
    }

    pub fn from_config(config: &WindowConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.win_n(), config.step_n())
    }

    /// Push one sample, evicting the oldest past capacity. Returns a snapshot
    /// of the full window, oldest first, when the buffer is full and at least
    /// `step_n` samples arrived since the previous emission.
    pub fn ingest(&mut self, sample: f32) -> Option<Vec<f32>> {
        self.samples.push_back(sample);
        while self.samples.len() > self.win_n {
            self.samples.pop_front();
        }
        self.since_last_emit += 1;

        if self.samples.len() == self.win_n && self.since_last_emit >= self.step_n {
            self.since_last_emit = 0;
            Some(self.samples.iter().copied().collect())
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.win_n
    }

    pub fn since_last_emit(&self) -> usize {
        self.since_last_emit
    }

    pub fn win_n(&self) -> usize {
        self.win_n
    }

    pub fn step_n(&self) -> usize {
        self.step_n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emissions(win_n: usize, step_n: usize, len: usize) -> Vec<Vec<f32>> {
        let mut buf = WindowBuffer::new(win_n, step_n).unwrap();
        (0..len).filter_map(|i| buf.ingest(i as f32)).collect()
    }

    #[test]
    fn rejects_zero_sizes() {
        assert!(WindowBuffer::new(0, 1).is_err());
        assert!(WindowBuffer::new(4, 0).is_err());
    }

    #[test]
    fn nothing_before_first_fill() {
        let mut buf = WindowBuffer::new(5, 1).unwrap();
        for i in 0..4 {
            assert!(buf.ingest(i as f32).is_none());
        }
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.ingest(4.0), Some(vec![0.0, 1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn emission_count_matches_stride() {
        for (w, s, l) in [(4, 2, 20), (5, 5, 23), (10, 3, 10), (10, 3, 9), (8, 1, 30), (6, 4, 50)] {
            let expected = if l >= w { (l - w) / s + 1 } else { 0 };
            assert_eq!(emissions(w, s, l).len(), expected, "w={w} s={s} l={l}");
        }
    }

    #[test]
    fn windows_slide_in_stream_order() {
        let out = emissions(4, 2, 10);
        assert_eq!(
            out,
            vec![
                vec![0.0, 1.0, 2.0, 3.0],
                vec![2.0, 3.0, 4.0, 5.0],
                vec![4.0, 5.0, 6.0, 7.0],
                vec![6.0, 7.0, 8.0, 9.0],
            ]
        );
    }

    #[test]
    fn counter_resets_on_emit_only() {
        let mut buf = WindowBuffer::new(3, 2).unwrap();
        buf.ingest(1.0);
        buf.ingest(2.0);
        assert_eq!(buf.since_last_emit(), 2);
        assert!(buf.ingest(3.0).is_some());
        assert_eq!(buf.since_last_emit(), 0);
        assert!(buf.is_full());
        assert!(buf.ingest(4.0).is_none());
        assert_eq!(buf.since_last_emit(), 1);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn stride_longer_than_window() {
        // first emission waits for step_n samples, not win_n
        let out = emissions(2, 5, 12);
        assert_eq!(out, vec![vec![3.0, 4.0], vec![8.0, 9.0]]);
    }
}
