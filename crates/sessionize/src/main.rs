use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use sessionize_core::{RunSummary, SessionSink, Sessionizer};
use sessionize_io::{read_window_file, validate_window, AccessLogFeed, CsvSink, JsonlSink};
use sessionize_logging::{init_tracing, LogEvent, LogFormat, Logger};

#[derive(Parser, Debug)]
#[command(
    name = "sessionize",
    about = "Fold an ordered access log into closed session records",
    version,
    author
)]
struct Cli {
    /// Input access log (one header line, then key,date,time,zone,... records)
    input: PathBuf,

    /// Where to write closed session records
    #[arg(short, long, default_value = "sessionization.txt")]
    output: PathBuf,

    /// Inactivity window in seconds after which a session closes
    #[arg(short = 'w', long, conflicts_with = "inactivity_file")]
    window_secs: Option<f64>,

    /// File containing the inactivity window in seconds
    #[arg(long)]
    inactivity_file: Option<PathBuf>,

    /// Output record format
    #[arg(long, value_enum, default_value = "csv")]
    format: FormatChoice,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Also append run events to a JSONL log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the final run summary as JSON on stdout
    #[arg(long)]
    json_summary: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatChoice {
    Csv,
    Jsonl,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing("info", log_format);

    let window_secs = resolve_window(&cli)?;

    // Create logger
    let logger = match cli.log_file {
        Some(ref path) => {
            Logger::with_file(log_format, path).context("Failed to open log file")?
        }
        None => Logger::new(log_format),
    };
    let logger = Arc::new(logger);
    logger.log(&LogEvent::RunStarted {
        input: cli.input.clone(),
        window_secs,
    });

    // Fatal feed problems (missing file, unsupported timezone offset in the
    // first record) surface here, before the run starts.
    let mut feed = AccessLogFeed::open(&cli.input)
        .with_context(|| format!("failed to open access log {}", cli.input.display()))?;

    let mut sink: Box<dyn SessionSink> = match cli.format {
        FormatChoice::Csv => Box::new(
            CsvSink::create(&cli.output)
                .with_context(|| format!("failed to create {}", cli.output.display()))?,
        ),
        FormatChoice::Jsonl => Box::new(
            JsonlSink::create(&cli.output)
                .with_context(|| format!("failed to create {}", cli.output.display()))?,
        ),
    };

    let mut engine = Sessionizer::new(&mut feed, sink.as_mut(), window_secs, logger);

    // Handle Ctrl+C gracefully: stop pulling events, still flush
    let interrupt_handle = engine.interrupt_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Flushing open sessions...");
        interrupt_handle.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let summary = engine.run().context("sessionization run failed")?;
    sink.finish().context("failed to flush output")?;

    if cli.json_summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, &cli.output);
    }

    std::process::exit(summary.exit_code());
}

fn resolve_window(cli: &Cli) -> Result<i64> {
    if let Some(secs) = cli.window_secs {
        return validate_window(secs);
    }
    if let Some(ref path) = cli.inactivity_file {
        return read_window_file(path);
    }
    anyhow::bail!("no inactivity window given; use --window-secs or --inactivity-file")
}

fn print_summary(summary: &RunSummary, output: &Path) {
    eprintln!();
    if summary.interrupted {
        eprintln!("=== INTERRUPTED ===");
    } else {
        eprintln!("=== DONE ===");
    }
    eprintln!("Events processed: {}", summary.events_processed);
    eprintln!("Sessions closed: {}", summary.sessions_closed);
    if summary.records_skipped > 0 {
        eprintln!("Records skipped: {}", summary.records_skipped);
    }
    eprintln!("Duration: {:.1}s", summary.duration_secs);
    eprintln!("Output: {}", output.display());
}
