use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structured log events for a sessionization run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    RunStarted {
        input: PathBuf,
        window_secs: i64,
    },
    /// A record the feed could not parse; the run keeps going
    RecordSkipped {
        line: u64,
        reason: String,
    },
    FinalFlush {
        open_sessions: usize,
    },
    RunInterrupted {
        events_processed: u64,
    },
    RunCompleted {
        events_processed: u64,
        sessions_closed: u64,
        records_skipped: u64,
        duration_secs: f64,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for run events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // Log to file if configured (always JSON format for file)
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::RunStarted { input, window_secs } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} {}",
                    "▶".bright_cyan(),
                    "sessionize".bold().bright_white()
                );
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "Input:".dimmed(),
                    input.display().to_string().dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "  {} {}s",
                    "Inactivity window:".dimmed(),
                    window_secs
                );
                let _ = writeln!(stderr);
            }
            LogEvent::RecordSkipped { line, reason } => {
                let _ = writeln!(
                    stderr,
                    "  {} skipped line {}: {}",
                    "⚠".bright_yellow(),
                    line,
                    reason.dimmed()
                );
            }
            LogEvent::FinalFlush { open_sessions } => {
                let _ = writeln!(
                    stderr,
                    "  {} flushing {} open {}",
                    "→".bright_blue(),
                    open_sessions,
                    if *open_sessions == 1 {
                        "session"
                    } else {
                        "sessions"
                    }
                );
            }
            LogEvent::RunInterrupted { events_processed } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} Interrupted after {} events",
                    "⚠".bright_yellow(),
                    events_processed
                );
            }
            LogEvent::RunCompleted { .. } => {
                // The final summary block in main.rs covers this;
                // skipped here to avoid duplication
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::RunStarted { window_secs, .. } => {
                format!("[{}] run:start w={}s", timestamp, window_secs)
            }
            LogEvent::RecordSkipped { line, reason } => {
                format!("[{}] skip:{} {}", timestamp, line, reason)
            }
            LogEvent::FinalFlush { open_sessions } => {
                format!("[{}] flush:{}", timestamp, open_sessions)
            }
            LogEvent::RunInterrupted { events_processed } => {
                format!("[{}] run:interrupt:{}", timestamp, events_processed)
            }
            LogEvent::RunCompleted {
                events_processed,
                sessions_closed,
                records_skipped,
                duration_secs,
            } => format!(
                "[{}] run:done events={} sessions={} skipped={} {:.1}s",
                timestamp, events_processed, sessions_closed, records_skipped, duration_secs
            ),
        };
        let _ = writeln!(stderr, "{}", msg);
    }
}
