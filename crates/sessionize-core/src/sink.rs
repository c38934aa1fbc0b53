use crate::{Session, SinkError};

/// Destination for closed sessions.
///
/// `write` is called exactly once per session, in emission order: sweep
/// closures interleaved with feed progress, then the final flush in
/// session-opening order. The engine has no feedback channel once a write
/// returns, so implementations own their buffering; the driver calls
/// `finish` once after the run for anything still buffered.
pub trait SessionSink {
    fn write(&mut self, session: &Session) -> Result<(), SinkError>;

    /// Called once by the driver after the run completes.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
