// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use tracing::{debug, info, warn};
use url::Url;

use crate::error::{EntryError, ExtractError};
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};

use super::fetch::load_feed;
use super::item::FeedItem;
use super::parse::FeedEntry;

/// MIME type of the link that carries the episode audio
pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";

/// Options for turning feed entries into items
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Leave out malformed entries with a warning instead of failing the batch
    pub skip_malformed: bool,
}

/// Caller supplied metadata shared by every item of a batch
#[derive(Debug, Clone)]
pub struct AlbumInfo {
    pub artist: String,
    pub album: String,
}

/// Fetch a feed and build the ordered, numbered batch of items
pub async fn extract_items<C: HttpClient>(
    client: &C,
    feed_source: &str,
    info: &AlbumInfo,
    options: &ExtractOptions,
    reporter: &SharedProgressReporter,
) -> Result<Vec<FeedItem>, ExtractError> {
    reporter.report(ProgressEvent::FetchingFeed {
        source: feed_source.to_string(),
    });

    let feed = load_feed(client, feed_source).await?;
    info!(
        source = feed_source,
        title = %feed.title,
        entries = feed.entries.len(),
        "Parsed feed"
    );

    let items = build_batch(&feed.entries, info, options)?;

    reporter.report(ProgressEvent::FeedParsed {
        feed_title: feed.title,
        total_entries: feed.entries.len(),
        total_items: items.len(),
    });

    Ok(items)
}

/// Map entries to items, sort them by date and number them 1..N
pub fn build_batch(
    entries: &[FeedEntry],
    info: &AlbumInfo,
    options: &ExtractOptions,
) -> Result<Vec<FeedItem>, EntryError> {
    let mut items = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        match item_from_entry(index, entry, info) {
            Ok(item) => items.push(item),
            Err(e) if options.skip_malformed => warn!("Skipping entry: {e}"),
            Err(e) => return Err(e),
        }
    }

    // Stable: entries sharing a date keep their feed order
    items.sort_by_key(FeedItem::date);
    number_tracks(&mut items);

    Ok(items)
}

/// Assign `track_num = 1..N` and `total_tracks = N` in slice order
pub fn number_tracks(items: &mut [FeedItem]) {
    let total_tracks = items.len() as u32;
    for (track_num, item) in (1..).zip(items.iter_mut()) {
        item.set_track(track_num, total_tracks);
    }
}

/// Build one item from a raw entry, reporting what is missing
pub fn item_from_entry(
    index: usize,
    entry: &FeedEntry,
    info: &AlbumInfo,
) -> Result<FeedItem, EntryError> {
    let title = entry
        .title
        .clone()
        .ok_or(EntryError::MissingTitle { index })?;

    let audio_href = entry
        .first_link_of_type(AUDIO_MIME_TYPE)
        .map(|link| link.href.as_str())
        .ok_or_else(|| EntryError::MissingAudioLink {
            index,
            title: title.clone(),
        })?;

    let audio_url = Url::parse(audio_href).map_err(|e| EntryError::InvalidAudioUrl {
        index,
        title: title.clone(),
        href: audio_href.to_string(),
        source: e,
    })?;

    let image_url = entry
        .image_href
        .as_deref()
        .and_then(|href| match Url::parse(href) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(entry = index, %title, href, "Ignoring invalid image URL: {e}");
                None
            }
        });

    let item = FeedItem::new(
        title.clone(),
        audio_url,
        image_url,
        info.artist.clone(),
        info.album.clone(),
    )
    .map_err(|e| EntryError::InvalidTitleDate {
        index,
        title,
        source: e,
    })?;

    debug!(entry = index, date = %item.date(), audio = %item.audio_url(), "Extracted item");
    Ok(item)
}
