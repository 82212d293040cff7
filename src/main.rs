//! CLI entry point for the hashtag trend tracker.
//!
//! Provides subcommands for running the full trend pipeline over a posts CSV,
//! rescoring a previously written aggregate file, and the line-oriented
//! map/reduce key counter.

use anyhow::Result;
use clap::{Parser, Subcommand};
use flate2::read::GzDecoder;
use hashtag_trends::config::{ConfigOverrides, PipelineConfig};
use hashtag_trends::keycount::{map_mentions, reduce_reader, write_pairs};
use hashtag_trends::output::{print_json, print_top_rows, write_report};
use hashtag_trends::parser::{ParseOptions, read_aggregates, read_posts_file};
use hashtag_trends::trends::pipeline;
use hashtag_trends::trends::window::Granularity;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Number of top-K rows echoed to the console after a run.
const SUMMARY_ROWS: usize = 20;

#[derive(Parser)]
#[command(name = "hashtag_trends")]
#[command(about = "Track trending hashtags per time window", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate, score and rank hashtags from a posts CSV
    Track {
        /// Posts CSV (date,hashtag,mentions,estimated_reach,sentiment_score)
        #[arg(short, long)]
        input: String,

        /// Time window aggregation: day, week or month [default: day]
        #[arg(short, long)]
        window: Option<Granularity>,

        /// Top-K hashtags kept per window [default: 10]
        #[arg(short = 'k', long)]
        topk: Option<usize>,

        /// Output files prefix [default: output]
        #[arg(short, long)]
        out_prefix: Option<String>,

        /// Optional: JSON config file; command-line flags take precedence
        #[arg(short, long)]
        config: Option<String>,

        /// Gzip compress the output CSV files
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Drop rows with an unrecognized date instead of aborting
        #[arg(long, default_value_t = false)]
        skip_invalid_dates: bool,
    },
    /// Recompute trend scores and top-K from an aggregated counts CSV
    Rescore {
        /// Aggregated counts CSV (plain or .gz) written by `track`
        #[arg(short, long)]
        input: String,

        /// Top-K hashtags kept per window
        #[arg(short = 'k', long, default_value_t = 10)]
        topk: usize,

        /// Output files prefix
        #[arg(short, long, default_value = "rescored")]
        out_prefix: String,

        /// Gzip compress the output CSV files
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Emit hashtag<TAB>mentions for every row of a posts CSV
    Map {
        /// Posts CSV; reads stdin when omitted
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Sum key<TAB>value lines over runs of the same key
    Reduce {
        /// Mapper output; reads stdin when omitted
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/hashtag_trends.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("hashtag_trends.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Track {
            input,
            window,
            topk,
            out_prefix,
            config,
            gzip,
            skip_invalid_dates,
        } => {
            let base = match config {
                Some(path) => {
                    info!(path = %path, "Loading pipeline config");
                    PipelineConfig::load(&path)?
                }
                None => PipelineConfig::default(),
            };
            let config = base.with_overrides(ConfigOverrides {
                window,
                top_k: topk,
                out_prefix,
                gzip,
                skip_invalid_dates,
            });

            track(&input, &config)?;
        }
        Commands::Rescore {
            input,
            topk,
            out_prefix,
            gzip,
        } => {
            rescore(&input, topk, &out_prefix, gzip)?;
        }
        Commands::Map { input } => {
            let pairs = map_mentions(open_input(input.as_deref())?)?;
            write_pairs(std::io::stdout().lock(), &pairs)?;
        }
        Commands::Reduce { input } => {
            let totals = reduce_reader(open_input(input.as_deref())?)?;
            info!(keys = totals.len(), "Reduced key counts");
            write_pairs(std::io::stdout().lock(), &totals)?;
        }
    }

    Ok(())
}

/// Opens a file for buffered reading, or stdin when no path is given.
fn open_input(path: Option<&str>) -> Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(p) => Box::new(BufReader::new(File::open(p)?)),
        None => Box::new(BufReader::new(std::io::stdin())),
    })
}

/// Runs the full pipeline and writes all three output files.
///
/// Every result set is computed before the first file is written, so an
/// input error never leaves partial output behind.
#[tracing::instrument(skip(config), fields(window = %config.window, top_k = config.top_k))]
fn track(input: &str, config: &PipelineConfig) -> Result<()> {
    info!("Reading posts CSV");
    let options = ParseOptions {
        skip_invalid_dates: config.skip_invalid_dates,
    };
    let (posts, stats) = read_posts_file(input, options)?;
    print_json(&stats)?;

    if stats.rows_skipped() > 0 {
        warn!(
            skipped = stats.rows_skipped(),
            kept_pct = stats.kept_pct(),
            "Some input rows were dropped"
        );
    }

    let report = pipeline::run(&posts, config.window, config.top_k);
    let paths = write_report(&report, &config.out_prefix, config.gzip)?;
    print_top_rows(&report.top(), SUMMARY_ROWS);

    info!(
        aggregates = %paths.aggregates.display(),
        scores = %paths.scores.display(),
        top_k = %paths.top_k.display(),
        "Done"
    );
    Ok(())
}

/// Rescores an aggregated counts file; `.gz` inputs are decompressed.
#[tracing::instrument]
fn rescore(input: &str, top_k: usize, out_prefix: &str, gzip: bool) -> Result<()> {
    let file = File::open(input)?;
    let reader: Box<dyn Read> = if input.ends_with(".gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let aggregates = read_aggregates(reader)?;
    let report = pipeline::rescore(aggregates, top_k);
    write_report(&report, out_prefix, gzip)?;
    print_top_rows(&report.top(), SUMMARY_ROWS);
    Ok(())
}
