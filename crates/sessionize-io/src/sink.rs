use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::DateTime;
use serde::Serialize;

use sessionize_core::{Session, SessionSink, SinkError};

const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Render an epoch timestamp as a calendar string in the log's single
/// assumed time zone.
fn render_timestamp(secs: i64) -> Result<String, SinkError> {
    let stamp = DateTime::from_timestamp(secs, 0).ok_or(SinkError::TimestampOutOfRange(secs))?;
    Ok(stamp.naive_utc().format(TIMESTAMP_FMT).to_string())
}

/// Reference output format: one line per closed session -
/// `key,start,end,duration_secs,count`.
pub struct CsvSink {
    writer: BufWriter<File>,
}

impl CsvSink {
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl SessionSink for CsvSink {
    fn write(&mut self, session: &Session) -> Result<(), SinkError> {
        writeln!(
            self.writer,
            "{},{},{},{},{}",
            session.key,
            render_timestamp(session.opened_at)?,
            render_timestamp(session.last_seen)?,
            session.duration_secs(),
            session.count
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One JSON object per closed session, mirroring the CSV fields.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

#[derive(Serialize)]
struct SessionRecord<'a> {
    key: &'a str,
    start: String,
    end: String,
    duration_secs: i64,
    count: u64,
}

impl JsonlSink {
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl SessionSink for JsonlSink {
    fn write(&mut self, session: &Session) -> Result<(), SinkError> {
        let record = SessionRecord {
            key: &session.key,
            start: render_timestamp(session.opened_at)?,
            end: render_timestamp(session.last_seen)?,
            duration_secs: session.duration_secs(),
            count: session.count,
        };
        let json = serde_json::to_string(&record)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
