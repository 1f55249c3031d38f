// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use lofty::config::WriteOptions;
use lofty::error::LoftyError;
use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt};
use tracing::info;
use url::Url;

use crate::error::TagError;
use crate::feed::FeedItem;
use crate::http::HttpClient;

/// Description stored with the embedded cover image
pub const COVER_DESCRIPTION: &str = "Cover";

/// Tag values for one item, detached from the item so they can move to a blocking task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFields {
    pub album: String,
    pub artist: String,
    pub album_artist: String,
    pub title: String,
    pub disc_num: u32,
    pub total_discs: u32,
    pub track_num: u32,
    pub total_tracks: u32,
    pub year: i32,
}

impl From<&FeedItem> for TagFields {
    fn from(item: &FeedItem) -> Self {
        Self {
            album: item.album().to_string(),
            artist: item.artist().to_string(),
            album_artist: item.album_artist().to_string(),
            title: item.track_title(),
            disc_num: item.disc_num(),
            total_discs: item.total_discs(),
            track_num: item.track_num(),
            total_tracks: item.total_tracks(),
            year: item.year(),
        }
    }
}

/// Write an item's tags, and its cover image if it has one, into `path`
pub async fn write_tags<C: HttpClient>(
    client: &C,
    item: &FeedItem,
    path: &Path,
) -> Result<(), TagError> {
    let cover = match item.image_url() {
        Some(url) => Some(fetch_cover(client, url).await?),
        None => None,
    };

    let fields = TagFields::from(item);
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || apply_tags(&path, &fields, cover)).await?
}

/// Fetch cover image bytes, no retries
pub async fn fetch_cover<C: HttpClient>(client: &C, url: &Url) -> Result<Vec<u8>, TagError> {
    info!("Setting image tag: {url}");

    let response = client
        .get_bytes(url.as_str())
        .await
        .map_err(|e| TagError::ImageFetchFailed {
            url: url.to_string(),
            source: e,
        })?;

    if !response.is_success() {
        return Err(TagError::ImageHttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    Ok(response.body.to_vec())
}

/// Open `path` as an audio file and save `fields` (and `cover`) into its primary tag
///
/// An existing primary tag is updated in place; a file without one gets a new tag.
pub fn apply_tags(path: &Path, fields: &TagFields, cover: Option<Vec<u8>>) -> Result<(), TagError> {
    let read_failed = |source: LoftyError| TagError::ReadFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut tagged_file = Probe::open(path)
        .map_err(read_failed)?
        .read()
        .map_err(read_failed)?;

    let tag_type = tagged_file.primary_tag_type();
    let mut tag = tagged_file
        .remove(tag_type)
        .unwrap_or_else(|| Tag::new(tag_type));

    info!("Setting tag: album={}", fields.album);
    tag.set_album(fields.album.clone());

    info!("Setting tag: artist={}", fields.artist);
    tag.set_artist(fields.artist.clone());

    info!("Setting tag: album artist={}", fields.album_artist);
    tag.insert_text(ItemKey::AlbumArtist, fields.album_artist.clone());

    info!("Setting tag: title={}", fields.title);
    tag.set_title(fields.title.clone());

    info!(
        "Setting tag: disc num={} of {}",
        fields.disc_num, fields.total_discs
    );
    tag.set_disk(fields.disc_num);
    tag.set_disk_total(fields.total_discs);

    info!(
        "Setting tag: track num={} of {}",
        fields.track_num, fields.total_tracks
    );
    tag.set_track(fields.track_num);
    tag.set_track_total(fields.total_tracks);

    info!("Setting tag: release date={}", fields.year);
    tag.insert_text(ItemKey::ReleaseDate, fields.year.to_string());
    tag.insert_text(ItemKey::RecordingDate, fields.year.to_string());

    if let Some(data) = cover {
        tag.remove_picture_type(PictureType::CoverFront);
        tag.push_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(MimeType::Jpeg),
            Some(COVER_DESCRIPTION.to_string()),
            data,
        ));
    }

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|source| TagError::WriteFailed {
            path: PathBuf::from(path),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{BytesResponse, HttpResponse};
    use crate::test_util::silent_mp3;
    use async_trait::async_trait;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    struct MockHttpClient {
        status: u16,
        body: &'static [u8],
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get_bytes(&self, _url: &str) -> Result<BytesResponse, reqwest::Error> {
            Ok(BytesResponse {
                status: self.status,
                body: Bytes::from_static(self.body),
            })
        }

        async fn get_stream(&self, _url: &str) -> Result<HttpResponse, reqwest::Error> {
            unreachable!("cover images are fetched in one piece")
        }
    }

    fn fields() -> TagFields {
        TagFields {
            album: "Show".to_string(),
            artist: "X".to_string(),
            album_artist: "X".to_string(),
            title: "Show: March 4, 2023".to_string(),
            disc_num: 1,
            total_discs: 1,
            track_num: 2,
            total_tracks: 3,
            year: 2023,
        }
    }

    fn write_silent_mp3(dir: &Path) -> PathBuf {
        let path = dir.join("episode.mp3");
        std::fs::write(&path, silent_mp3()).unwrap();
        path
    }

    fn read_primary_tag(path: &Path) -> Tag {
        let mut tagged_file = Probe::open(path).unwrap().read().unwrap();
        let tag_type = tagged_file.primary_tag_type();
        tagged_file.remove(tag_type).unwrap()
    }

    #[test]
    fn tags_read_back_as_written() {
        let dir = tempdir().unwrap();
        let path = write_silent_mp3(dir.path());

        apply_tags(&path, &fields(), None).unwrap();

        let tag = read_primary_tag(&path);
        assert_eq!(tag.album().as_deref(), Some("Show"));
        assert_eq!(tag.artist().as_deref(), Some("X"));
        assert_eq!(tag.get_string(&ItemKey::AlbumArtist), Some("X"));
        assert_eq!(tag.title().as_deref(), Some("Show: March 4, 2023"));
        assert_eq!(tag.track(), Some(2));
        assert_eq!(tag.track_total(), Some(3));
        assert_eq!(tag.disk(), Some(1));
        assert_eq!(tag.disk_total(), Some(1));
        assert_eq!(tag.get_string(&ItemKey::ReleaseDate), Some("2023"));
        assert_eq!(tag.get_string(&ItemKey::RecordingDate), Some("2023"));
        assert!(tag.pictures().is_empty());
    }

    #[test]
    fn cover_is_embedded_as_front_cover() {
        let dir = tempdir().unwrap();
        let path = write_silent_mp3(dir.path());

        apply_tags(&path, &fields(), Some(b"jpeg bytes".to_vec())).unwrap();

        let tag = read_primary_tag(&path);
        let pictures = tag.pictures();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].pic_type(), PictureType::CoverFront);
        assert_eq!(pictures[0].mime_type(), Some(&MimeType::Jpeg));
        assert_eq!(pictures[0].description(), Some(COVER_DESCRIPTION));
        assert_eq!(pictures[0].data(), b"jpeg bytes");
    }

    #[test]
    fn retagging_replaces_previous_values() {
        let dir = tempdir().unwrap();
        let path = write_silent_mp3(dir.path());

        apply_tags(&path, &fields(), Some(b"old".to_vec())).unwrap();

        let updated = TagFields {
            track_num: 3,
            title: "Show: March 11, 2023".to_string(),
            ..fields()
        };
        apply_tags(&path, &updated, Some(b"new".to_vec())).unwrap();

        let tag = read_primary_tag(&path);
        assert_eq!(tag.track(), Some(3));
        assert_eq!(tag.title().as_deref(), Some("Show: March 11, 2023"));
        assert_eq!(tag.pictures().len(), 1);
        assert_eq!(tag.pictures()[0].data(), b"new");
    }

    #[test]
    fn non_audio_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("episode.mp3");
        std::fs::write(&path, b"<html>gateway timeout</html>").unwrap();

        let result = apply_tags(&path, &fields(), None);
        assert!(matches!(result, Err(TagError::ReadFailed { .. })));
    }

    #[tokio::test]
    async fn cover_fetch_failure_is_a_tag_error() {
        let client = MockHttpClient {
            status: 500,
            body: b"",
        };
        let url = Url::parse("https://example.com/cover.jpg").unwrap();

        let result = fetch_cover(&client, &url).await;
        match result {
            Err(TagError::ImageHttpStatus { status, .. }) => assert_eq!(status, 500),
            other => panic!("Expected ImageHttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn write_tags_fetches_and_embeds_cover() {
        let dir = tempdir().unwrap();
        let path = write_silent_mp3(dir.path());
        let client = MockHttpClient {
            status: 200,
            body: b"cover",
        };
        let item = FeedItem::new(
            "PR.03.04.23",
            Url::parse("https://example.com/a.mp3").unwrap(),
            Some(Url::parse("https://example.com/cover.jpg").unwrap()),
            "X",
            "Show",
        )
        .unwrap();

        write_tags(&client, &item, &path).await.unwrap();

        let tag = read_primary_tag(&path);
        assert_eq!(tag.title().as_deref(), Some("Show: March 4, 2023"));
        assert_eq!(tag.pictures()[0].data(), b"cover");
    }
}
