use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use sessionize_logging::{LogEvent, Logger};

use crate::error::{EngineError, FeedError};
use crate::feed::{Event, EventFeed};
use crate::session::Session;
use crate::sink::SessionSink;
use crate::summary::RunSummary;

/// Clock value older than any valid timestamp
const CLOCK_SENTINEL: i64 = i64::MIN;

/// Single-pass session-windowing engine.
///
/// Owns the live session map, the expiration schedule, and the processing
/// clock. Deadlines are appended in increasing order (a consequence of the
/// feed's ordering contract) and consumed front-to-back, so the schedule is
/// never re-sorted and no event ever triggers a scan of the full live set:
/// work is O(1) amortized per event and memory is bounded by the number of
/// concurrently-active keys, not by input size.
pub struct Sessionizer<'a> {
    feed: &'a mut dyn EventFeed,
    sink: &'a mut dyn SessionSink,
    window_secs: i64,
    /// Open sessions keyed by client
    sessions: HashMap<String, Session>,
    /// Check candidates per deadline, FIFO within a deadline
    candidates: HashMap<i64, VecDeque<String>>,
    /// Deadlines in the order they were first scheduled
    deadlines: VecDeque<i64>,
    clock: i64,
    next_sequence: u64,
    sessions_closed: u64,
    logger: Arc<Logger>,
    interrupted: Arc<AtomicBool>,
}

impl<'a> Sessionizer<'a> {
    /// `window_secs` is the inactivity gap (in whole seconds, positive)
    /// after which a session is considered closed.
    pub fn new(
        feed: &'a mut dyn EventFeed,
        sink: &'a mut dyn SessionSink,
        window_secs: i64,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            feed,
            sink,
            window_secs,
            sessions: HashMap::new(),
            candidates: HashMap::new(),
            deadlines: VecDeque::new(),
            clock: CLOCK_SENTINEL,
            next_sequence: 0,
            sessions_closed: 0,
            logger,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle to signal interruption. Sessions still open when the
    /// flag is seen are flushed before `run` returns.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    /// Number of currently open sessions.
    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Drain the feed, then flush whatever is still open.
    pub fn run(&mut self) -> Result<RunSummary, EngineError> {
        let started_at = Instant::now();
        let mut events_processed = 0u64;
        let mut records_skipped = 0u64;
        let mut was_interrupted = false;

        while self.feed.has_more() {
            if self.interrupted.load(Ordering::SeqCst) {
                was_interrupted = true;
                self.logger
                    .log(&LogEvent::RunInterrupted { events_processed });
                break;
            }

            let event = match self.feed.next_event() {
                Ok(event) => event,
                Err(FeedError::Malformed { line, reason }) => {
                    warn!(line, %reason, "skipping malformed record");
                    self.logger.log(&LogEvent::RecordSkipped { line, reason });
                    records_skipped += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            self.observe(event)?;
            events_processed += 1;
        }

        self.flush()?;

        let summary = RunSummary {
            events_processed,
            sessions_closed: self.sessions_closed,
            records_skipped,
            interrupted: was_interrupted,
            duration_secs: started_at.elapsed().as_secs_f64(),
        };
        self.logger.log(&LogEvent::RunCompleted {
            events_processed: summary.events_processed,
            sessions_closed: summary.sessions_closed,
            records_skipped: summary.records_skipped,
            duration_secs: summary.duration_secs,
        });
        Ok(summary)
    }

    /// Fold one event: sweep if the clock advanced, update the key's
    /// session, and schedule an expiration check.
    fn observe(&mut self, event: Event) -> Result<(), EngineError> {
        let Event { key, time } = event;
        let deadline = time + self.window_secs;

        // A late (non-monotonic) event never advances the clock, so it can
        // only delay a closure, never cause an early one.
        if time > self.clock {
            self.clock = time;
            self.sweep(time)?;
            // Scheduled after the sweep: an event's own deadline is never
            // eligible for the sweep its arrival triggered.
            self.deadlines.push_back(deadline);
        }

        match self.sessions.entry(key.clone()) {
            Entry::Occupied(mut open) => open.get_mut().touch(time),
            Entry::Vacant(slot) => {
                let session = Session::open(slot.key().clone(), time, self.next_sequence);
                self.next_sequence += 1;
                slot.insert(session);
            }
        }

        self.candidates.entry(deadline).or_default().push_back(key);
        Ok(())
    }

    /// Close every session whose deadline has passed and whose owner stayed
    /// quiet for the whole window.
    ///
    /// Deadlines are consumed strictly in the order they were scheduled. A
    /// stale candidate (a key that was active again after its check was
    /// scheduled) is skipped, not cancelled: the later entry scheduled by
    /// the reactivating event re-checks it at the right time.
    fn sweep(&mut self, now: i64) -> Result<(), EngineError> {
        let latest_allowed = now - self.window_secs;

        while let Some(&next) = self.deadlines.front() {
            if next >= now {
                break;
            }
            self.deadlines.pop_front();

            let Some(mut keys) = self.candidates.remove(&next) else {
                continue;
            };
            while let Some(key) = keys.pop_front() {
                if let Entry::Occupied(open) = self.sessions.entry(key) {
                    if open.get().last_seen <= latest_allowed {
                        let session = open.remove();
                        self.close(&session)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Close everything still open, in the order the sessions were first
    /// opened. This is the engine's one full collection + sort; it runs
    /// exactly once and is bounded by concurrently-open keys.
    fn flush(&mut self) -> Result<(), EngineError> {
        if !self.sessions.is_empty() {
            self.logger.log(&LogEvent::FinalFlush {
                open_sessions: self.sessions.len(),
            });
        }

        let mut remaining: Vec<Session> = self.sessions.drain().map(|(_, s)| s).collect();
        remaining.sort_by_key(|session| session.sequence);
        for session in &remaining {
            self.close(session)?;
        }

        self.candidates.clear();
        self.deadlines.clear();
        Ok(())
    }

    fn close(&mut self, session: &Session) -> Result<(), EngineError> {
        debug!(
            key = %session.key,
            start = session.opened_at,
            end = session.last_seen,
            count = session.count,
            "closing session"
        );
        self.sink.write(session)?;
        self.sessions_closed += 1;
        Ok(())
    }
}
