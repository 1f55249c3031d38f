mod download;
mod filename;
mod tag;

pub use download::{download_and_tag, download_audio};
pub use filename::{destination_path, generate_filename};
pub use tag::{COVER_DESCRIPTION, TagFields, apply_tags, fetch_cover, write_tags};
