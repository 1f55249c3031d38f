use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

/// Events emitted while downloading a feed, for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Feed is being fetched from a URL or read from a file
    FetchingFeed { source: String },

    /// Feed has been parsed and turned into a batch of items
    FeedParsed {
        feed_title: String,
        total_entries: usize,
        total_items: usize,
    },

    /// A download is starting
    DownloadStarting {
        track_num: u32,
        total_tracks: u32,
        url: String,
        destination: PathBuf,
        /// Expected content length in bytes, if known
        content_length: Option<u64>,
    },

    /// Download progress update
    DownloadProgress {
        track_num: u32,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
    },

    /// The audio payload has been written to disk
    DownloadCompleted {
        track_num: u32,
        bytes_downloaded: u64,
    },

    /// Tags have been saved to the downloaded file
    TagsWritten { track_num: u32, path: PathBuf },

    /// An item failed to download or tag
    ItemFailed {
        track_num: u32,
        track_title: String,
        error: String,
    },

    /// The batch has been processed
    BatchCompleted {
        downloaded_count: usize,
        failed_count: usize,
    },
}

/// Trait for reporting progress events during a run.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}

/// Reports progress as log lines through `tracing`
///
/// Per-chunk progress is not logged; it would flood the output for large files.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl LogReporter {
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}

impl ProgressReporter for LogReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingFeed { source } => {
                info!("Fetching feed {source}");
            }
            ProgressEvent::FeedParsed {
                feed_title,
                total_entries,
                total_items,
            } => {
                info!("Feed '{feed_title}': {total_items} of {total_entries} entries to download");
            }
            ProgressEvent::DownloadStarting {
                track_num,
                total_tracks,
                url,
                destination,
                content_length,
            } => {
                let size = content_length
                    .map(|len| format!(" ({len} bytes)"))
                    .unwrap_or_default();
                debug!(
                    "[{track_num}/{total_tracks}] Receiving {url} into {}{size}",
                    destination.display()
                );
            }
            ProgressEvent::DownloadProgress { .. } => {}
            ProgressEvent::DownloadCompleted {
                track_num,
                bytes_downloaded,
            } => {
                info!("[{track_num}] Downloaded {bytes_downloaded} bytes");
            }
            ProgressEvent::TagsWritten { track_num, path } => {
                info!("[{track_num}] Tagged {}", path.display());
            }
            ProgressEvent::ItemFailed {
                track_num,
                track_title,
                error,
            } => {
                error!("[{track_num}] {track_title} failed: {error}");
            }
            ProgressEvent::BatchCompleted {
                downloaded_count,
                failed_count,
            } => {
                info!("Done: {downloaded_count} downloaded, {failed_count} failed");
            }
        }
    }
}
