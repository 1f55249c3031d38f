use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use psyched_radio::{
    AlbumInfo, ClientOptions, ExtractOptions, FeedRequest, LogReporter, NoopReporter,
    ReqwestClient, RunOptions, SharedProgressReporter, download_feed,
};

/// Download every episode of an RSS feed and tag it as a track of an album
#[derive(Parser, Debug)]
#[command(name = "download-feed")]
#[command(version)]
struct Args {
    /// RSS feed URL or path to local RSS file
    feed: String,

    /// Album name written into every file
    album: String,

    /// Artist name written into every file
    artist: String,

    /// Existing directory the episodes are saved into
    destination: PathBuf,

    /// Keep downloading the remaining episodes when one fails
    #[arg(long)]
    continue_on_error: bool,

    /// Skip feed entries without an audio link or a dated title
    #[arg(long)]
    skip_malformed: bool,

    /// Connect, idle read and buffered request timeout, in seconds
    #[arg(short, long, default_value = "60")]
    timeout: u64,

    /// More log output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Quiet mode - only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stdout)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level());

    let client = ReqwestClient::with_options(&ClientOptions::with_timeout(Duration::from_secs(
        args.timeout,
    )))
    .context("Failed to build HTTP client")?;

    let request = FeedRequest {
        feed_source: args.feed.clone(),
        album: AlbumInfo {
            artist: args.artist.clone(),
            album: args.album.clone(),
        },
        destination_dir: args.destination.clone(),
    };

    let options = RunOptions {
        extract: ExtractOptions {
            skip_malformed: args.skip_malformed,
        },
        continue_on_error: args.continue_on_error,
    };

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        LogReporter::shared()
    };

    let result = download_feed(&client, &request, &options, &reporter)
        .await
        .with_context(|| format!("Failed to download feed {}", args.feed))?;

    if !result.failed.is_empty() {
        error!("{} episodes failed:", result.failed.len());
        for (title, message) in &result.failed {
            error!("  {title} - {message}");
        }
        std::process::exit(1);
    }

    info!(
        "Saved {} episodes to {}",
        result.downloaded.len(),
        args.destination.display()
    );

    Ok(())
}
