use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when retrieving or parsing the RSS feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} fetching feed from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to read feed file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse RSS feed: {0}")]
    ParseFailed(#[from] rss::Error),

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors that can occur when decoding a date from an entry title
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleDateError {
    #[error("title has no {field} field")]
    MissingField { field: &'static str },

    #[error("{field} field '{value}' is not a number")]
    NotNumeric { field: &'static str, value: String },

    #[error("{year:04}-{month:02}-{day:02} is not a calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },
}

/// Errors for a single feed entry that cannot become a downloadable item
#[derive(Error, Debug)]
pub enum EntryError {
    #[error("Entry #{index} has no title")]
    MissingTitle { index: usize },

    #[error("Entry #{index} '{title}' has no audio/mpeg link")]
    MissingAudioLink { index: usize, title: String },

    #[error("Entry #{index} '{title}' has an invalid audio URL '{href}': {source}")]
    InvalidAudioUrl {
        index: usize,
        title: String,
        href: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Entry #{index} '{title}' has no date in its title: {source}")]
    InvalidTitleDate {
        index: usize,
        title: String,
        #[source]
        source: TitleDateError,
    },
}

/// Errors that can occur while turning a feed into an ordered batch of items
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Malformed entry: {0}")]
    Entry(#[from] EntryError),
}

/// Errors that can occur while fetching an item's audio payload
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP request failed for {url}: {source}")]
    HttpFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Stream error while downloading {url}: {source}")]
    StreamFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors caused by the destination directory or the files written into it
#[derive(Error, Debug)]
pub enum FilesystemError {
    #[error("Destination directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Destination is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Destination directory is not writable: {0}")]
    ReadOnly(PathBuf),

    #[error("Failed to inspect {path}: {source}")]
    ReadMetadataFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create file {path}: {source}")]
    FileCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to file {path}: {source}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while writing tags into a downloaded file
#[derive(Error, Debug)]
pub enum TagError {
    #[error("Failed to fetch cover image {url}: {source}")]
    ImageFetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} fetching cover image {url}")]
    ImageHttpStatus { url: String, status: u16 },

    #[error("Failed to open {path} as an audio file: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("Failed to save tags to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("Tagging task did not complete: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Errors for a single item of the batch
#[derive(Error, Debug)]
pub enum ItemError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    #[error(transparent)]
    Tag(#[from] TagError),
}

/// Top-level errors for a feed download run
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    #[error("Track {track:02} '{title}' failed: {source}")]
    Item {
        track: u32,
        title: String,
        #[source]
        source: ItemError,
    },

    #[error("All {count} items failed")]
    AllItemsFailed { count: usize },
}
