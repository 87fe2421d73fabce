//! Structured logging for demodulator status and run summaries.

use crate::config::LogFormat;
use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use driftlock_core::DemodStatus;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Structured log event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    /// A point-in-time snapshot of the demodulator's loop state
    Status(StatusEvent),

    /// End-of-run summary
    Summary(SummaryEvent),

    /// General info message
    Info { message: String },

    /// Warning message
    Warn { message: String },

    /// Error message
    Error { message: String, details: Option<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub timestamp: DateTime<Utc>,
    pub pll_locked: bool,
    pub freq_hz: f64,
    pub gain: f32,
    pub bytes_out: u64,
    pub samples_done: u64,
    pub samples_total: u64,
}

impl StatusEvent {
    pub fn from_status(status: &DemodStatus) -> Self {
        Self {
            timestamp: Utc::now(),
            pll_locked: status.pll_locked,
            freq_hz: status.freq_hz,
            gain: status.gain,
            bytes_out: status.bytes_out,
            samples_done: status.done,
            samples_total: status.size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryEvent {
    pub timestamp: DateTime<Utc>,
    pub duration_secs: f64,
    pub bytes_out: u64,
    pub final_freq_hz: f64,
    pub final_locked: bool,
}

/// Logger that outputs structured logs to stderr in one of three formats.
pub struct StructuredLogger {
    format: LogFormat,
    writer: Box<dyn Write + Send>,
    start_time: DateTime<Utc>,
}

impl StructuredLogger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            writer: Box::new(io::stderr()),
            start_time: Utc::now(),
        }
    }

    pub fn log(&mut self, event: LogEvent) -> Result<()> {
        let output = match self.format {
            LogFormat::Json => self.format_json(&event)?,
            LogFormat::Logfmt => self.format_logfmt(&event),
            LogFormat::Pretty => self.format_pretty(&event),
        };

        writeln!(self.writer, "{}", output)?;
        self.writer.flush()?;

        Ok(())
    }

    fn format_json(&self, event: &LogEvent) -> Result<String> {
        Ok(serde_json::to_string(event)?)
    }

    fn format_logfmt(&self, event: &LogEvent) -> String {
        let ts = Utc::now().to_rfc3339();

        match event {
            LogEvent::Status(s) => format!(
                "ts=\"{}\" type=status locked={} freq_hz={:.2} gain={:.4} bytes_out={} done={} total={}",
                ts, s.pll_locked, s.freq_hz, s.gain, s.bytes_out, s.samples_done, s.samples_total
            ),
            LogEvent::Summary(s) => format!(
                "ts=\"{}\" type=summary duration_secs={:.2} bytes_out={} freq_hz={:.2} locked={}",
                ts, s.duration_secs, s.bytes_out, s.final_freq_hz, s.final_locked
            ),
            LogEvent::Info { message } => format!("ts=\"{}\" level=info msg=\"{}\"", ts, message),
            LogEvent::Warn { message } => format!("ts=\"{}\" level=warn msg=\"{}\"", ts, message),
            LogEvent::Error { message, details } => {
                if let Some(d) = details {
                    format!("ts=\"{}\" level=error msg=\"{}\" details=\"{}\"", ts, message, d)
                } else {
                    format!("ts=\"{}\" level=error msg=\"{}\"", ts, message)
                }
            }
        }
    }

    fn format_pretty(&self, event: &LogEvent) -> String {
        let ts = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");

        match event {
            LogEvent::Status(s) => format!(
                "[{}] STATUS: {} | freq={:.2}Hz gain={:.4} | {}/{} samples | {} bytes",
                ts,
                if s.pll_locked { "LOCKED" } else { "SEARCHING" },
                s.freq_hz,
                s.gain,
                s.samples_done,
                s.samples_total,
                s.bytes_out
            ),
            LogEvent::Summary(s) => format!(
                "[{}] SUMMARY ({:.2}s): {} bytes | final freq={:.2}Hz locked={}",
                ts, s.duration_secs, s.bytes_out, s.final_freq_hz, s.final_locked
            ),
            LogEvent::Info { message } => format!("[{}] INFO: {}", ts, message),
            LogEvent::Warn { message } => format!("[{}] WARN: {}", ts, message),
            LogEvent::Error { message, details } => {
                if let Some(d) = details {
                    format!("[{}] ERROR: {} | {}", ts, message, d)
                } else {
                    format!("[{}] ERROR: {}", ts, message)
                }
            }
        }
    }

    pub fn elapsed(&self) -> f64 {
        (Utc::now() - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}
