use crate::FeedError;

/// A single access-log event: one request from one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Client identifier (e.g. an IP address)
    pub key: String,
    /// Seconds since the Unix epoch
    pub time: i64,
}

/// Source of events in non-decreasing timestamp order.
///
/// The ordering is a contract, not a hint: the engine consumes its
/// expiration schedule strictly in the order deadlines were first
/// scheduled, which is only valid when implementations deliver events
/// oldest-first. An event that violates the ordering is still folded into
/// its session, but it never advances the engine clock, so a session can
/// close late — never early.
pub trait EventFeed {
    /// True while another event may be available.
    fn has_more(&self) -> bool;

    /// Returns the next event.
    ///
    /// A [`FeedError::Malformed`] is recoverable: the caller should log it
    /// and call `next_event` again. Any other error aborts the run.
    fn next_event(&mut self) -> Result<Event, FeedError>;
}
