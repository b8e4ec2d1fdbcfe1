//! Runtime configuration. File values are defaults; CLI flags override them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where `train` writes and `auth` reads the baseline
    pub model_path: PathBuf,
    /// Serial link to the sensor board
    pub serial: SerialConfig,
    /// Windowing used for training (auth takes it from the model)
    pub window: WindowConfig,
    /// Decision threshold
    pub auth: AuthConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud: u32,
    /// Wait after opening the port; most boards reset on connect
    pub settle_ms: u64,
    /// Longest a read blocks before the stop flag is checked again
    pub read_timeout_ms: u64,
}

/// Sample rate and window geometry. Window and stride lengths in samples
/// are derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Sample rate (Hz)
    pub fs: u32,
    /// Window length (seconds)
    pub win_s: f64,
    /// Stride between emitted windows (seconds)
    pub step_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accept when distance < threshold. Lower is stricter.
    pub threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.json"),
            serial: SerialConfig::default(),
            window: WindowConfig::default(),
            auth: AuthConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud: 115_200,
            settle_ms: 1000,
            read_timeout_ms: 1000,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            fs: 100,
            win_s: 8.0,
            step_s: 2.0,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { threshold: 6.0 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl WindowConfig {
    pub fn new(fs: u32, win_s: f64, step_s: f64) -> Self {
        Self { fs, win_s, step_s }
    }

    /// Samples per window, `round(fs * win_s)`.
    pub fn win_n(&self) -> usize {
        samples_for(self.fs, self.win_s)
    }

    /// Samples between emissions, `round(fs * step_s)`.
    pub fn step_n(&self) -> usize {
        samples_for(self.fs, self.step_s)
    }

    /// Minimum recording length (in samples) that holds one full window.
    pub fn min_samples(&self) -> f64 {
        self.fs as f64 * self.win_s
    }

    pub fn validate(&self) -> Result<()> {
        if self.fs == 0 {
            return Err(Error::Configuration("sample rate must be > 0 Hz".into()));
        }
        if !(self.win_s.is_finite() && self.win_s > 0.0) {
            return Err(Error::Configuration(format!(
                "window length must be > 0 s, got {}",
                self.win_s
            )));
        }
        if !(self.step_s.is_finite() && self.step_s > 0.0) {
            return Err(Error::Configuration(format!(
                "step must be > 0 s, got {}",
                self.step_s
            )));
        }
        if self.win_n() == 0 || self.step_n() == 0 {
            return Err(Error::Configuration(format!(
                "fs={} win_s={} step_s={} gives win_n={} step_n={}; both must be >= 1",
                self.fs,
                self.win_s,
                self.step_s,
                self.win_n(),
                self.step_n()
            )));
        }
        Ok(())
    }
}

fn samples_for(fs: u32, seconds: f64) -> usize {
    let n = (fs as f64 * seconds).round();
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(Error::Configuration(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load from a JSON file. A missing file yields defaults; a file that
    /// exists but can't be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&data)
            .map_err(|e| Error::Configuration(format!("invalid {}: {e}", path.display())))
    }

    /// Config file location: `PULSE_AUTH_CONFIG` or `pulse-auth.json`.
    pub fn default_path() -> PathBuf {
        std::env::var("PULSE_AUTH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("pulse-auth.json"))
    }
}
