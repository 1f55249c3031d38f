mod extract;
mod fetch;
mod item;
mod parse;

pub use extract::{
    AUDIO_MIME_TYPE, AlbumInfo, ExtractOptions, build_batch, extract_items, item_from_entry,
    number_tracks,
};
pub use fetch::{fetch_feed_bytes, is_url, load_feed, read_feed_file};
pub use item::{FeedItem, parse_title_date};
pub use parse::{EntryLink, FeedEntry, ParsedFeed, parse_feed};
