//! `presswork` command line interface.
//!
//! Reads a WordPress export file, converts every publishable post into a
//! Markdown directory with its images, and writes one JSON file per author.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use engine_logging::{initialize, LogDestination};
use presswork_engine::{decode_export, parse_wxr, ExportSettings, Exporter, FetchSettings};

#[derive(Parser, Debug)]
#[command(
    name = "presswork",
    version,
    about = "Convert a WordPress export (WXR) into per-post Markdown directories"
)]
struct Args {
    /// Path to the WordPress export XML file
    export: PathBuf,

    /// Destination directory for post folders
    out: PathBuf,

    /// Destination directory for author JSON files (defaults to OUT/authors)
    #[arg(long)]
    authors_dir: Option<PathBuf>,

    /// Maximum number of image downloads in flight
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Per-image download timeout in seconds
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,

    /// Also write logs to ./presswork.log
    #[arg(long)]
    log_file: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    initialize(if args.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    });

    let bytes = match std::fs::read(&args.export) {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("cannot read {}: {err}", args.export.display());
            return ExitCode::FAILURE;
        }
    };
    let decoded = match decode_export(&bytes) {
        Ok(decoded) => decoded,
        Err(err) => {
            error!("cannot decode {}: {err}", args.export.display());
            return ExitCode::FAILURE;
        }
    };
    let channel = match parse_wxr(&decoded.xml) {
        Ok(channel) => channel,
        Err(err) => {
            error!("cannot parse {}: {err}", args.export.display());
            return ExitCode::FAILURE;
        }
    };
    info!(
        "export ({}) contains {} items and {} authors",
        decoded.encoding_label,
        channel.posts.len(),
        channel.authors.len()
    );

    let fetch = FetchSettings {
        request_timeout: Duration::from_secs(args.timeout_secs),
        ..FetchSettings::default()
    };
    let exporter = match Exporter::with_defaults(fetch) {
        Ok(exporter) => exporter,
        Err(err) => {
            error!("cannot build image downloader: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut settings = ExportSettings::new(args.out);
    if let Some(authors_dir) = args.authors_dir {
        settings.authors_dest = authors_dir;
    }
    settings.concurrency = args.concurrency;

    match exporter.run(&channel, &settings) {
        Ok(summary) => {
            info!(
                "converted {} posts ({} failed), extracted {} authors, \
                 downloaded {}/{} images ({} failed)",
                summary.posts_converted,
                summary.posts_failed,
                summary.authors_written,
                summary.images.downloaded,
                summary.images.total,
                summary.images.failed
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("export failed: {err}");
            ExitCode::FAILURE
        }
    }
}
