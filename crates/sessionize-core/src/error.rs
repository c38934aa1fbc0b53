use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    /// Recoverable: the record is skipped and the run continues
    #[error("malformed record at line {line}: {reason}")]
    Malformed { line: u64, reason: String },

    #[error("unsupported input: {0}")]
    Unsupported(String),

    #[error("feed I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedError {
    /// Malformed records may be skipped; everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FeedError::Malformed { .. })
    }
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize session record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("timestamp {0} is outside the representable calendar range")]
    TimestampOutOfRange(i64),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("event feed failed: {0}")]
    Feed(#[from] FeedError),

    #[error("session sink failed: {0}")]
    Sink(#[from] SinkError),
}
