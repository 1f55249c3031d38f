// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use url::Url;

use crate::error::TitleDateError;

/// Multi-disc releases are not produced; every item is disc 1 of 1
const DISC_NUM: u32 = 1;
const TOTAL_DISCS: u32 = 1;

/// A downloadable feed item with everything needed to name and tag it
///
/// The title is decoded into a calendar date when the item is built, so an
/// item always carries a valid date. Track numbers start as `1 of 1` and are
/// assigned once by the extractor after the batch is sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    title: String,
    date: NaiveDate,
    image_url: Option<Url>,
    audio_url: Url,
    artist: String,
    album: String,
    track_num: u32,
    total_tracks: u32,
}

impl FeedItem {
    pub fn new(
        title: impl Into<String>,
        audio_url: Url,
        image_url: Option<Url>,
        artist: impl Into<String>,
        album: impl Into<String>,
    ) -> Result<Self, TitleDateError> {
        let title = title.into();
        let date = parse_title_date(&title)?;

        Ok(Self {
            title,
            date,
            image_url,
            audio_url,
            artist: artist.into(),
            album: album.into(),
            track_num: 1,
            total_tracks: 1,
        })
    }

    /// Raw title from the feed entry
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    pub fn audio_url(&self) -> &Url {
        &self.audio_url
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn album_artist(&self) -> &str {
        &self.artist
    }

    pub fn track_num(&self) -> u32 {
        self.track_num
    }

    pub fn total_tracks(&self) -> u32 {
        self.total_tracks
    }

    pub fn disc_num(&self) -> u32 {
        DISC_NUM
    }

    pub fn total_discs(&self) -> u32 {
        TOTAL_DISCS
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// Human readable title, e.g. "Show: March 4, 2023"
    pub fn track_title(&self) -> String {
        format!("{}: {}", self.album, self.date.format("%B %-d, %Y"))
    }

    pub(crate) fn set_track(&mut self, track_num: u32, total_tracks: u32) {
        self.track_num = track_num;
        self.total_tracks = total_tracks;
    }
}

/// Decode the date encoded in a title of the form `<prefix>.<month>.<day>.<year>[...]`
///
/// Two-digit years are taken as `2000 + year`.
pub fn parse_title_date(title: &str) -> Result<NaiveDate, TitleDateError> {
    let fields: Vec<&str> = title.split('.').collect();

    let month: u32 = parse_field(&fields, 1, "month")?;
    let day: u32 = parse_field(&fields, 2, "day")?;
    let mut year: i32 = parse_field(&fields, 3, "year")?;
    if year < 100 {
        year += 2000;
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or(TitleDateError::InvalidDate {
        year,
        month,
        day,
    })
}

fn parse_field<T: FromStr>(
    fields: &[&str],
    index: usize,
    field: &'static str,
) -> Result<T, TitleDateError> {
    let value = fields
        .get(index)
        .map(|value| value.trim())
        .ok_or(TitleDateError::MissingField { field })?;

    let not_numeric = || TitleDateError::NotNumeric {
        field,
        value: value.to_string(),
    };

    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(not_numeric());
    }
    value.parse().map_err(|_| not_numeric())
}
