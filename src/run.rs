// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::episode::download_and_tag;
use crate::error::{FilesystemError, RunError};
use crate::feed::{AlbumInfo, ExtractOptions, FeedItem, extract_items};
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};

/// What to download and where to put it
#[derive(Debug, Clone)]
pub struct FeedRequest {
    /// RSS feed URL or path to a local RSS file
    pub feed_source: String,
    pub album: AlbumInfo,
    /// Existing directory the audio files are written into
    pub destination_dir: PathBuf,
}

/// Options for a feed download run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip malformed feed entries instead of failing before any download
    pub extract: ExtractOptions,
    /// Keep going with the next item when one fails
    pub continue_on_error: bool,
}

/// Result of a run
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Paths of the files written and tagged, in track order
    pub downloaded: Vec<PathBuf>,
    /// Details of failed items (track title, error message)
    pub failed: Vec<(String, String)>,
}

/// Download every episode of a feed into the destination directory
///
/// This is the main entry point for the library. It:
/// 1. Checks that the destination directory is usable
/// 2. Fetches the feed and builds the ordered, numbered batch
/// 3. Downloads and tags each item, one after the other
pub async fn download_feed<C: HttpClient>(
    client: &C,
    request: &FeedRequest,
    options: &RunOptions,
    reporter: &SharedProgressReporter,
) -> Result<BatchResult, RunError> {
    check_destination(&request.destination_dir)?;

    let items = extract_items(
        client,
        &request.feed_source,
        &request.album,
        &options.extract,
        reporter,
    )
    .await?;

    run_batch(client, &items, &request.destination_dir, options, reporter).await
}

/// Download and tag `items` in order
///
/// By default the first failing item ends the run. With `continue_on_error`
/// failures are collected and the remaining items are still processed.
/// Files already written are never removed.
pub async fn run_batch<C: HttpClient>(
    client: &C,
    items: &[FeedItem],
    destination_dir: &Path,
    options: &RunOptions,
    reporter: &SharedProgressReporter,
) -> Result<BatchResult, RunError> {
    let mut result = BatchResult::default();

    for item in items {
        match download_and_tag(client, item, destination_dir, reporter).await {
            Ok(path) => result.downloaded.push(path),
            Err(e) => {
                reporter.report(ProgressEvent::ItemFailed {
                    track_num: item.track_num(),
                    track_title: item.track_title(),
                    error: e.to_string(),
                });

                if !options.continue_on_error {
                    return Err(RunError::Item {
                        track: item.track_num(),
                        title: item.track_title(),
                        source: e,
                    });
                }

                warn!(
                    track = item.track_num(),
                    audio = %item.audio_url(),
                    "Continuing after failure"
                );
                result.failed.push((item.track_title(), e.to_string()));
            }
        }
    }

    reporter.report(ProgressEvent::BatchCompleted {
        downloaded_count: result.downloaded.len(),
        failed_count: result.failed.len(),
    });

    if result.downloaded.is_empty() && !result.failed.is_empty() {
        return Err(RunError::AllItemsFailed {
            count: result.failed.len(),
        });
    }

    Ok(result)
}

/// Make sure `dir` exists, is a directory and this process can create files in it
///
/// Writability is checked by creating and dropping an unnamed temporary file in `dir`.
pub fn check_destination(dir: &Path) -> Result<(), FilesystemError> {
    let metadata = match std::fs::metadata(dir) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(FilesystemError::DirectoryNotFound(dir.to_path_buf()));
        }
        Err(e) => {
            return Err(FilesystemError::ReadMetadataFailed {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(FilesystemError::NotADirectory(dir.to_path_buf()));
    }

    match tempfile::tempfile_in(dir) {
        Ok(_) => Ok(()),
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem
            ) =>
        {
            Err(FilesystemError::ReadOnly(dir.to_path_buf()))
        }
        Err(e) => Err(FilesystemError::FileCreateFailed {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}
