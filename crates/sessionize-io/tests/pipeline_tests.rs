use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use sessionize_core::{Session, SessionSink, Sessionizer};
use sessionize_io::{read_window_file, AccessLogFeed, CsvSink, JsonlSink};
use sessionize_logging::{LogFormat, Logger};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn sample_session() -> Session {
    Session {
        key: "10.0.0.1".to_string(),
        // 2017-06-30 00:00:00 .. 00:00:02
        opened_at: 1_498_780_800,
        last_seen: 1_498_780_802,
        count: 3,
        sequence: 0,
    }
}

// ============================================================
// Sink tests
// ============================================================

#[test]
fn csv_sink_writes_the_reference_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.txt");

    let mut sink = CsvSink::create(&path).unwrap();
    sink.write(&sample_session()).unwrap();
    sink.finish().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "10.0.0.1,2017-06-30 00:00:00,2017-06-30 00:00:02,3,3\n"
    );
}

#[test]
fn jsonl_sink_writes_one_object_per_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.jsonl");

    let mut sink = JsonlSink::create(&path).unwrap();
    sink.write(&sample_session()).unwrap();
    sink.finish().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "{\"key\":\"10.0.0.1\",\"start\":\"2017-06-30 00:00:00\",\
         \"end\":\"2017-06-30 00:00:02\",\"duration_secs\":3,\"count\":3}\n"
    );
}

// ============================================================
// Whole-pipeline tests
// ============================================================

#[test]
fn sessionizes_a_log_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let log = write_file(
        &dir,
        "log.csv",
        "ip,date,time,zone,cik,accession,extention\n\
         101.81.133.110,2017-06-30,00:00:00,0.0,1608552.0,0001047469-17-004337,-index.htm\n\
         107.23.85.jfd,2017-06-30,00:00:00,0.0,1027281.0,0000898430-02-001167,-index.htm\n\
         101.81.133.110,2017-06-30,00:00:01,0.0,1136894.0,0000905148-07-003827,-index.htm\n\
         107.23.85.jfd,2017-06-30,00:00:03,0.0,1027281.0,0000898430-02-001167,-index.htm\n",
    );
    let window = read_window_file(&write_file(&dir, "inactivity_period.txt", "2")).unwrap();
    let out = dir.path().join("sessionization.txt");

    let mut feed = AccessLogFeed::open(&log).unwrap();
    let mut sink = CsvSink::create(&out).unwrap();
    let logger = Arc::new(Logger::new(LogFormat::Compact));
    let mut engine = Sessionizer::new(&mut feed, &mut sink, window, logger);

    let summary = engine.run().unwrap();
    sink.finish().unwrap();

    assert_eq!(summary.events_processed, 4);
    assert_eq!(summary.sessions_closed, 3);
    assert_eq!(summary.records_skipped, 0);
    assert!(!summary.interrupted);

    // Both opening sessions expire once the clock reaches t=3; the second
    // visit from 107.23.85.jfd opens a fresh session that is flushed at
    // end of input.
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "101.81.133.110,2017-06-30 00:00:00,2017-06-30 00:00:01,2,2\n\
         107.23.85.jfd,2017-06-30 00:00:00,2017-06-30 00:00:00,1,1\n\
         107.23.85.jfd,2017-06-30 00:00:03,2017-06-30 00:00:03,1,1\n"
    );
}

#[test]
fn malformed_lines_are_skipped_without_losing_sessions() {
    let dir = TempDir::new().unwrap();
    let log = write_file(
        &dir,
        "log.csv",
        "ip,date,time,zone\n\
         10.0.0.1,2017-06-30,00:00:00,0.0\n\
         not a record\n\
         10.0.0.1,2017-06-30,00:00:05,0.0\n",
    );
    let out = dir.path().join("sessionization.txt");

    let mut feed = AccessLogFeed::open(&log).unwrap();
    let mut sink = CsvSink::create(&out).unwrap();
    let logger = Arc::new(Logger::new(LogFormat::Compact));
    let mut engine = Sessionizer::new(&mut feed, &mut sink, 60, logger);

    let summary = engine.run().unwrap();
    sink.finish().unwrap();

    assert_eq!(summary.events_processed, 2);
    assert_eq!(summary.records_skipped, 1);
    assert_eq!(summary.sessions_closed, 1);
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "10.0.0.1,2017-06-30 00:00:00,2017-06-30 00:00:05,6,2\n"
    );
}
