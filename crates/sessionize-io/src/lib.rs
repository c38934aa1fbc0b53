//! # sessionize-io
//!
//! File-backed collaborators for the sessionize engine.
//!
//! This crate turns raw access-log files into the ordered event stream the
//! engine consumes, and closed sessions back into output records.
//!
//! ## Key Types
//!
//! - [`AccessLogFeed`] - Reads header-prefixed, comma-separated access logs
//! - [`CsvSink`] - Writes one CSV line per closed session
//! - [`JsonlSink`] - Writes one JSON object per closed session
//!
//! ## Input Format
//!
//! One header line, then records of the form
//! `key,YYYY-MM-DD,HH:MM:SS,tz_offset,...` - fields past the timezone
//! offset are ignored, and only an offset of exactly zero is supported.

mod config;
mod feed;
mod sink;

pub use config::{read_window_file, validate_window};
pub use feed::AccessLogFeed;
pub use sink::{CsvSink, JsonlSink};
