mod engine;
mod error;
mod feed;
mod session;
mod sink;
mod summary;

pub use engine::Sessionizer;
pub use error::{EngineError, FeedError, SinkError};
pub use feed::{Event, EventFeed};
pub use session::Session;
pub use sink::SessionSink;
pub use summary::RunSummary;
