mod config;
mod file_sink;
mod logging;
mod wav_source;

use clap::Parser;
use color_eyre::eyre::{eyre, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use config::{FileConfig, LogFormat};
use driftlock_core::Demod;
use file_sink::FileSink;
use indicatif::{ProgressBar, ProgressStyle};
use logging::{LogEvent, StatusEvent, StructuredLogger, SummaryEvent};
use wav_source::WavSource;

#[derive(Parser, Debug)]
#[command(author, version, about = "Soft-decision QPSK demodulator", long_about = None)]
struct Cli {
    /// Input WAV file (stereo I/Q or mono baseband)
    input: PathBuf,

    /// Output file for soft-decision symbols (interleaved signed i8 I/Q)
    output: PathBuf,

    /// Optional TOML configuration file; CLI flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interpolation factor
    #[arg(long)]
    l: Option<usize>,

    /// RRC filter half-order (2*order + 1 taps)
    #[arg(long)]
    rrc_order: Option<usize>,

    /// RRC roll-off factor, in (0, 1]
    #[arg(long)]
    alpha: Option<f64>,

    /// Costas loop bandwidth in Hz
    #[arg(long)]
    pll_bw_hz: Option<f64>,

    /// Symbol rate in Hz
    #[arg(long)]
    sym_rate: Option<f64>,

    /// AGC target amplitude
    #[arg(long)]
    agc_target: Option<f32>,

    /// Structured log output format
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Emit a status line periodically while running
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    let mut demod_config = file_config.demod.unwrap_or_default();
    if let Some(l) = args.l {
        demod_config.l = l;
    }
    if let Some(rrc_order) = args.rrc_order {
        demod_config.rrc_order = rrc_order;
    }
    if let Some(alpha) = args.alpha {
        demod_config.alpha = alpha;
    }
    if let Some(bw) = args.pll_bw_hz {
        demod_config.pll_bw_hz = bw;
    }
    if let Some(rate) = args.sym_rate {
        demod_config.sym_rate = rate;
    }
    if let Some(target) = args.agc_target {
        demod_config.agc_target = target;
    }

    let log_format = args.log_format.or(file_config.log_format).unwrap_or_default();
    let mut logger = StructuredLogger::new(log_format);

    logger.log(LogEvent::Info {
        message: format!("opening input {}", args.input.display()),
    })?;

    let source = WavSource::open(&args.input)
        .map_err(|e| eyre!("failed to open input WAV: {e}"))
        .wrap_err_with(|| format!("input: {}", args.input.display()))?;

    let sink = FileSink::create(&args.output)
        .map_err(|e| eyre!("failed to open output file: {e}"))
        .wrap_err_with(|| format!("output: {}", args.output.display()))?;

    let mut demod = Demod::init(source, demod_config.clone())
        .map_err(|e| eyre!("invalid demodulator configuration: {e}"))?;

    let progress = if args.verbose {
        None
    } else {
        let size = demod.status().size.max(1);
        let bar = ProgressBar::new(size);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} samples ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    };

    demod.start(sink);

    loop {
        std::thread::sleep(Duration::from_millis(200));
        let status = demod.status();

        if args.verbose {
            logger.log(LogEvent::Status(StatusEvent::from_status(&status)))?;
        } else if let Some(bar) = &progress {
            bar.set_position(status.done.min(status.size));
        }

        if !status.running {
            break;
        }
    }

    demod.join();
    let final_status = demod.status();
    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }

    if let Some(err) = &final_status.error {
        logger.log(LogEvent::Error {
            message: "demodulation run failed".to_string(),
            details: Some(err.clone()),
        })?;
        return Err(eyre!("demodulation failed: {err}"));
    }

    logger.log(LogEvent::Summary(SummaryEvent {
        timestamp: chrono::Utc::now(),
        duration_secs: logger.elapsed(),
        bytes_out: final_status.bytes_out,
        final_freq_hz: final_status.freq_hz,
        final_locked: final_status.pll_locked,
    }))?;

    Ok(())
}
