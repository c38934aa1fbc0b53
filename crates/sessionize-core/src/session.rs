use serde::Serialize;

/// One contiguous window of activity for a single key.
///
/// A session is open from the moment its first event arrives until the
/// engine emits it, after which it is never touched again; a later event
/// for the same key starts a brand-new session with a fresh `sequence`.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Client identifier that owns the session
    pub key: String,
    /// Timestamp of the first event folded in; set once
    pub opened_at: i64,
    /// Timestamp of the most recent event folded in; never decreases
    pub last_seen: i64,
    /// Number of events folded in
    pub count: u64,
    /// Creation-order counter; recovers opening order at final flush
    pub sequence: u64,
}

impl Session {
    pub(crate) fn open(key: String, time: i64, sequence: u64) -> Self {
        Self {
            key,
            opened_at: time,
            last_seen: time,
            count: 1,
            sequence,
        }
    }

    /// Fold one more event into the session.
    pub(crate) fn touch(&mut self, time: i64) {
        self.last_seen = self.last_seen.max(time);
        self.count += 1;
    }

    /// Inclusive duration in seconds: a session is active through the whole
    /// second of its last event, so a single-event session lasts 1s.
    pub fn duration_secs(&self) -> i64 {
        self.last_seen - self.opened_at + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_event_session_lasts_one_second() {
        let session = Session::open("10.0.0.1".to_string(), 100, 0);
        assert_eq!(session.duration_secs(), 1);
        assert_eq!(session.count, 1);
        assert_eq!(session.opened_at, session.last_seen);
    }

    #[test]
    fn touch_advances_last_seen_and_count() {
        let mut session = Session::open("10.0.0.1".to_string(), 100, 0);
        session.touch(110);
        session.touch(112);
        assert_eq!(session.opened_at, 100);
        assert_eq!(session.last_seen, 112);
        assert_eq!(session.count, 3);
        assert_eq!(session.duration_secs(), 13);
    }

    #[test]
    fn touch_with_earlier_time_never_rewinds_last_seen() {
        let mut session = Session::open("10.0.0.1".to_string(), 100, 0);
        session.touch(110);
        session.touch(90);
        assert_eq!(session.last_seen, 110);
        assert_eq!(session.count, 3);
        assert!(session.opened_at <= session.last_seen);
    }
}
