use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::debug;

use sessionize_core::{Event, EventFeed, FeedError};

const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// File-backed event feed for header-prefixed access logs.
///
/// Records are comma-separated: `key,YYYY-MM-DD,HH:MM:SS,tz_offset,...`
/// with anything past the timezone offset ignored. Timestamps are decoded
/// by direct calendar decomposition; only an offset of exactly zero is
/// supported.
///
/// The feed reads one record ahead, so `has_more` is exact and a fatal
/// problem in the first record (an unsupported timezone offset, say)
/// surfaces at construction, before any event reaches the engine.
#[derive(Debug)]
pub struct AccessLogFeed {
    reader: BufReader<File>,
    /// 1-based number of the most recently read line
    line: u64,
    pending: Option<Result<Event, FeedError>>,
}

impl AccessLogFeed {
    pub fn open(path: &Path) -> Result<Self, FeedError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 {
            return Err(FeedError::Unsupported(format!(
                "{} is empty (expected a header line)",
                path.display()
            )));
        }
        debug!(path = %path.display(), "opened access log feed");

        let mut feed = Self {
            reader,
            line: 1,
            pending: None,
        };
        feed.advance();

        match feed.pending.take() {
            Some(Err(err)) if !err.is_recoverable() => Err(err),
            other => {
                feed.pending = other;
                Ok(feed)
            }
        }
    }

    /// Read the next record line into the lookahead slot. Blank lines are
    /// skipped; end of file clears the slot.
    fn advance(&mut self) {
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    self.pending = None;
                    return;
                }
                Ok(_) => {
                    self.line += 1;
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.pending = Some(parse_record(line.trim_end(), self.line));
                    return;
                }
                Err(err) => {
                    self.pending = Some(Err(FeedError::Io(err)));
                    return;
                }
            }
        }
    }
}

impl EventFeed for AccessLogFeed {
    fn has_more(&self) -> bool {
        self.pending.is_some()
    }

    fn next_event(&mut self) -> Result<Event, FeedError> {
        let next = self.pending.take().unwrap_or_else(|| {
            Err(FeedError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "event feed is exhausted",
            )))
        });
        self.advance();
        next
    }
}

fn parse_record(line: &str, number: u64) -> Result<Event, FeedError> {
    let mut fields = line.split(',');
    let (Some(key), Some(date), Some(time), Some(zone)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed(number, "expected at least 4 fields"));
    };
    // Fields past the timezone offset (document ids, paths, ...) are ignored.

    if key.is_empty() {
        return Err(malformed(number, "empty client key"));
    }

    let offset: f64 = zone
        .trim()
        .parse()
        .map_err(|_| malformed(number, &format!("unparseable timezone offset {zone:?}")))?;
    if offset != 0.0 {
        return Err(FeedError::Unsupported(format!(
            "timezone offset {} at line {} (only an offset of 0 is supported)",
            zone, number
        )));
    }

    let stamp = NaiveDateTime::parse_from_str(&format!("{date} {time}"), TIMESTAMP_FMT)
        .map_err(|_| malformed(number, &format!("unparseable timestamp {date:?} {time:?}")))?;

    Ok(Event {
        key: key.to_string(),
        time: stamp.and_utc().timestamp(),
    })
}

fn malformed(line: u64, reason: &str) -> FeedError {
    FeedError::Malformed {
        line,
        reason: reason.to_string(),
    }
}
