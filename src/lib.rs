pub mod episode;
pub mod error;
pub mod feed;
pub mod http;
pub mod progress;
pub mod run;

#[cfg(test)]
mod test_util;

// Re-export main types for convenience
pub use episode::{download_and_tag, generate_filename};
pub use error::{
    DownloadError, EntryError, ExtractError, FeedError, FilesystemError, ItemError, RunError,
    TagError, TitleDateError,
};
pub use feed::{AlbumInfo, ExtractOptions, FeedItem, extract_items, parse_title_date};
pub use http::{ClientOptions, HttpClient, HttpResponse, ReqwestClient};
pub use progress::{LogReporter, NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use run::{BatchResult, FeedRequest, RunOptions, download_feed, run_batch};
