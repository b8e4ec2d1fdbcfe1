//! Pulse Auth entrypoint: record labeled samples, train a baseline, or
//! authenticate a live serial stream against it.

use clap::{Parser, Subcommand};
use pulse_auth::{
    auth::{run_session, ConsoleSink, DecisionSink, SerialReply, StreamAuthenticator},
    config::AppConfig,
    logging::StructuredLogger,
    model::Trainer,
    source::SerialPort,
    storage::{read_samples, ModelStore, SampleRecorder},
    Result,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

static STOP: AtomicBool = AtomicBool::new(false);

#[derive(Parser)]
#[command(name = "pulse-auth")]
#[command(version)]
#[command(about = "Biometric authentication from a serial ADC stream", long_about = None)]
struct Cli {
    /// Config file (default: $PULSE_AUTH_CONFIG or pulse-auth.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// JSON logs and decision lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record labeled samples from the serial port into a CSV file
    Collect {
        /// 1 = enrolled user, 0 = someone else
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
        label: u8,

        /// CSV file to append to
        #[arg(long)]
        out: PathBuf,

        #[arg(long)]
        port: Option<String>,

        #[arg(long)]
        baud: Option<u32>,
    },

    /// Fit a baseline from a recording of the enrolled user
    Train {
        /// CSV recording (see `collect`)
        #[arg(long)]
        samples: PathBuf,

        /// Where to write the model
        #[arg(long)]
        out: Option<PathBuf>,

        /// Sample rate (Hz)
        #[arg(long)]
        fs: Option<u32>,

        /// Window length (seconds)
        #[arg(long)]
        win: Option<f64>,

        /// Stride between windows (seconds)
        #[arg(long)]
        step: Option<f64>,

        /// Only use rows with this label
        #[arg(long)]
        label: Option<u8>,
    },

    /// Authenticate the live stream against a trained baseline
    Auth {
        #[arg(long)]
        port: Option<String>,

        #[arg(long)]
        baud: Option<u32>,

        #[arg(long)]
        model: Option<PathBuf>,

        /// Accept when distance is below this; lower is stricter
        #[arg(long)]
        threshold: Option<f32>,

        /// Don't write AUTH lines back to the port
        #[arg(long)]
        no_reply: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path)?;
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    config.log.json |= cli.json;

    StructuredLogger::init(config.log.json, &config.log.level);

    let _ = ctrlc::set_handler(|| STOP.store(true, Ordering::Relaxed));

    match cli.command {
        Commands::Collect {
            label,
            out,
            port,
            baud,
        } => {
            if let Some(p) = port {
                config.serial.port = p;
            }
            if let Some(b) = baud {
                config.serial.baud = b;
            }
            cmd_collect(&config, label, &out)
        }
        Commands::Train {
            samples,
            out,
            fs,
            win,
            step,
            label,
        } => {
            if let Some(v) = fs {
                config.window.fs = v;
            }
            if let Some(v) = win {
                config.window.win_s = v;
            }
            if let Some(v) = step {
                config.window.step_s = v;
            }
            if let Some(p) = out {
                config.model_path = p;
            }
            cmd_train(&config, &samples, label)
        }
        Commands::Auth {
            port,
            baud,
            model,
            threshold,
            no_reply,
        } => {
            if let Some(p) = port {
                config.serial.port = p;
            }
            if let Some(b) = baud {
                config.serial.baud = b;
            }
            if let Some(m) = model {
                config.model_path = m;
            }
            if let Some(t) = threshold {
                config.auth.threshold = t;
            }
            cmd_auth(&config, no_reply)
        }
    }
}

fn open_port(config: &AppConfig) -> Result<SerialPort> {
    SerialPort::open(
        &config.serial.port,
        config.serial.baud,
        Duration::from_millis(config.serial.read_timeout_ms),
    )
}

fn cmd_collect(config: &AppConfig, label: u8, out: &std::path::Path) -> Result<()> {
    let port = open_port(config)?;
    let mut recorder = SampleRecorder::open(out, label)?;
    let mut lines = port.lines()?;

    info!(port = port.path(), "collecting (Ctrl+C to stop)");
    let stats = recorder.record_stream(&mut lines, &STOP)?;
    info!(
        recorded = stats.recorded,
        malformed = stats.malformed,
        "collection stopped"
    );
    Ok(())
}

fn cmd_train(config: &AppConfig, samples: &std::path::Path, label: Option<u8>) -> Result<()> {
    let trainer = Trainer::new(config.window)?;
    let recording = read_samples(samples, label)?;
    let report = trainer.fit(&recording)?;

    let store = ModelStore::new(&config.model_path);
    store.save(&report.model)?;
    println!("OK: model saved to {}", store.path().display());
    println!(
        "features_dim = {} windows = {}",
        report.features_dim, report.windows
    );
    Ok(())
}

fn cmd_auth(config: &AppConfig, no_reply: bool) -> Result<()> {
    let model = ModelStore::new(&config.model_path).load()?;
    let mut auth = StreamAuthenticator::new(model, config.auth.threshold)?;

    let port = open_port(config)?;
    std::thread::sleep(Duration::from_millis(config.serial.settle_ms));

    let session = Uuid::new_v4();
    let console = ConsoleSink::new(std::io::stdout(), config.log.json, session);
    let mut sink: Box<dyn DecisionSink> = if no_reply {
        Box::new(console)
    } else {
        Box::new((console, SerialReply::new(port.writer()?)))
    };

    let window = auth.model().window;
    info!(
        %session,
        win_s = window.win_s,
        step_s = window.step_s,
        threshold = auth.threshold(),
        "realtime auth started"
    );

    let mut lines = port.lines()?;
    let stats = run_session(&mut lines, &mut auth, &mut sink, &STOP)?;
    if stats.samples == 0 {
        warn!(lines = stats.lines, "no sample records received");
    }
    info!(
        %session,
        samples = stats.samples,
        malformed = stats.malformed,
        decisions = stats.decisions,
        accepted = stats.accepted,
        "realtime auth stopped"
    );
    Ok(())
}
