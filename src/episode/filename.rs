use std::path::{Path, PathBuf};

use crate::feed::FeedItem;

/// Audio files are always saved as MP3
const EXTENSION: &str = "mp3";

/// Characters that would let a name escape the destination directory
fn is_path_separator(c: char) -> bool {
    matches!(c, '/' | '\\' | '\0')
}

/// Generate the filename for an item
///
/// Format: "{artist} - {album} - {track:02} - {track_title}.mp3"
pub fn generate_filename(item: &FeedItem) -> String {
    let name = format!(
        "{} - {} - {:02} - {}.{}",
        item.artist(),
        item.album(),
        item.track_num(),
        item.track_title(),
        EXTENSION
    );

    name.chars()
        .map(|c| if is_path_separator(c) { '-' } else { c })
        .collect()
}

/// Full destination path of an item inside `destination_dir`
pub fn destination_path(item: &FeedItem, destination_dir: &Path) -> PathBuf {
    destination_dir.join(generate_filename(item))
}
