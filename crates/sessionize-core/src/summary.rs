use serde::Serialize;

/// End-of-run accounting for one sessionization pass
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub events_processed: u64,
    pub sessions_closed: u64,
    pub records_skipped: u64,
    pub interrupted: bool,
    pub duration_secs: f64,
}

impl RunSummary {
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            130
        } else {
            0
        }
    }
}
