// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::FeedError;

/// Represents a parsed feed, reduced to what item extraction needs
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub title: String,
    pub entries: Vec<FeedEntry>,
}

/// One raw feed entry, read defensively: every field may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    /// `itunes:title` when the entry has one, else `<title>`, unmodified
    pub title: Option<String>,
    /// Enclosure first, then namespaced link elements
    pub links: Vec<EntryLink>,
    pub image_href: Option<String>,
}

/// A link attached to an entry, with its declared MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLink {
    pub href: String,
    pub mime_type: Option<String>,
}

impl FeedEntry {
    /// First link whose declared type is `mime_type`
    ///
    /// The comparison ignores case and any parameters after `;`.
    pub fn first_link_of_type(&self, mime_type: &str) -> Option<&EntryLink> {
        self.links.iter().find(|link| {
            link.mime_type
                .as_deref()
                .map(|declared| declared.split(';').next().unwrap_or_default().trim())
                .is_some_and(|declared| declared.eq_ignore_ascii_case(mime_type))
        })
    }
}

/// Parse RSS feed XML bytes into a list of entries
pub fn parse_feed(xml_bytes: &[u8]) -> Result<ParsedFeed, FeedError> {
    let channel = rss::Channel::read_from(xml_bytes)?;

    // Episode artwork falls back to the show's artwork
    let channel_image = channel
        .itunes_ext()
        .and_then(|ext| ext.image())
        .or_else(|| channel.image().map(|img| img.url()))
        .and_then(non_empty);

    let itunes_titles = itunes_titles(xml_bytes);

    let entries = channel
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut entry = parse_entry(item, channel_image.as_deref());
            if let Some(title) = itunes_titles.get(index).cloned().flatten() {
                entry.title = Some(title);
            }
            entry
        })
        .collect();

    Ok(ParsedFeed {
        title: channel.title().to_string(),
        entries,
    })
}

fn parse_entry(item: &rss::Item, channel_image: Option<&str>) -> FeedEntry {
    let mut links = Vec::new();

    if let Some(enclosure) = item.enclosure() {
        links.push(EntryLink {
            href: enclosure.url().trim().to_string(),
            mime_type: non_empty(enclosure.mime_type()),
        });
    }

    // Namespaced <prefix:link href=".." type=".."/> elements, e.g. atom:link
    links.extend(
        item.extensions()
            .values()
            .filter_map(|elements| elements.get("link"))
            .flatten()
            .filter_map(|link| {
                let href = link.attrs().get("href").and_then(|h| non_empty(h))?;
                Some(EntryLink {
                    href,
                    mime_type: link.attrs().get("type").and_then(|t| non_empty(t)),
                })
            }),
    );

    let image_href = item
        .itunes_ext()
        .and_then(|ext| ext.image())
        .and_then(non_empty)
        .or_else(|| channel_image.map(String::from));

    FeedEntry {
        title: item.title().map(String::from),
        links,
        image_href,
    }
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|s| !s.is_empty())
}

/// The `itunes:title` of every `<item>`, in document order
///
/// `rss` consumes the itunes namespace into its extension type, which has no
/// title field, so the raw XML is scanned a second time.
fn itunes_titles(xml_bytes: &[u8]) -> Vec<Option<String>> {
    let mut reader = Reader::from_reader(xml_bytes);
    let mut titles = Vec::new();
    let mut in_item = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => match element.name().as_ref() {
                b"item" => {
                    titles.push(None);
                    in_item = true;
                }
                b"itunes:title" if in_item => {
                    let Ok(text) = reader.read_text(element.name()) else {
                        break;
                    };
                    let title = text.decode().ok().map(|raw| unescape_text(&raw));
                    if let Some(slot) = titles.last_mut() {
                        *slot = title.filter(|t| !t.trim().is_empty());
                    }
                }
                _ => {}
            },
            Ok(Event::End(element)) if element.name().as_ref() == b"item" => in_item = false,
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }

    titles
}

fn unescape_text(raw: &str) -> String {
    if let Some(cdata) = raw
        .trim()
        .strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
    {
        return cdata.to_string();
    }
    quick_xml::escape::unescape(raw)
        .map(|text| text.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
