//! Content-Type selection by file extension.
//!
//! Matching is on the literal file name suffix, so `.PNG` gets no type.

use std::path::Path;

/// Which table to consult. The legacy uploads route historically served
/// `.m4a` as `audio/mpeg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeTable {
    Assets,
    LegacyUploads,
}

const ASSET_TYPES: &[(&[&str], &str)] = &[
    (&[".m4a"], "audio/mp4"),
    (&[".mp3", ".wav"], "audio/mpeg"),
    (&[".mp4", ".mov"], "video/mp4"),
    (&[".pdf"], "application/pdf"),
    (&[".jpg", ".jpeg"], "image/jpeg"),
    (&[".png"], "image/png"),
];

/// Content type for `path`, or `None` to leave the header unset.
pub fn content_type_for(path: &Path, table: MimeTable) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;

    if table == MimeTable::LegacyUploads && name.ends_with(".m4a") {
        return Some("audio/mpeg");
    }

    ASSET_TYPES
        .iter()
        .find(|(suffixes, _)| suffixes.iter().any(|s| name.ends_with(s)))
        .map(|(_, mime)| *mime)
}
