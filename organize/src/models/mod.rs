//! Domain models for the organize planning pipeline.
//!
//! - [`RawTags`] - Decoder output: source tag name to list of values
//! - [`TagSet`] - Canonical tag set for one file
//! - [`AudioFile`] - A discovered audio file with its raw tags
//! - [`fields`] - Canonical field names and album scoping

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Raw tag mapping produced by a decoder, keyed by lowercase source tag name.
pub type RawTags = BTreeMap<String, Vec<String>>;

// =============================================================================
// Canonical Fields
// =============================================================================

/// Canonical field names.
pub mod fields {
    pub const ARTIST: &str = "artist";
    pub const ALBUM: &str = "album";
    pub const ALBUM_ARTIST: &str = "albumartist";
    pub const YEAR: &str = "year";
    pub const DATE: &str = "date";
    pub const ORIGINAL_YEAR: &str = "originalyear";
    pub const ORIGINAL_DATE: &str = "originaldate";
    pub const GENRE: &str = "genre";
    pub const LABEL: &str = "label";
    pub const CATALOG_NO: &str = "catalogno";
    pub const UPC: &str = "upc";
    pub const MEDIA: &str = "media";
    pub const DISC_NUMBER: &str = "discnumber";
    pub const DISC_TOTAL: &str = "disctotal";
    pub const TRACK_NUMBER: &str = "tracknumber";
    pub const TRACK_TOTAL: &str = "tracktotal";
    pub const TITLE: &str = "title";
    pub const FORMAT: &str = "format";
    /// Upper-case file extension.
    pub const FORMAT_UPPER: &str = "FORMAT";

    /// Fields assumed constant across every track of one album.
    pub const ALBUM_SCOPED: [&str; 11] = [
        YEAR,
        DATE,
        ORIGINAL_YEAR,
        ORIGINAL_DATE,
        LABEL,
        CATALOG_NO,
        UPC,
        MEDIA,
        ALBUM_ARTIST,
        DISC_TOTAL,
        TRACK_TOTAL,
    ];

    /// Whether a value for `field` may be shared between files of one album.
    pub fn is_album_scoped(field: &str) -> bool {
        ALBUM_SCOPED.contains(&field)
    }
}

// =============================================================================
// Tag Set
// =============================================================================

/// Canonical tags of one file.
///
/// A field is absent when it is not in the map. Present-but-empty values are
/// kept as-is: rendering appends them, conditions treat them as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet {
    values: BTreeMap<String, String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Present and non-empty.
    pub fn is_set(&self, field: &str) -> bool {
        self.get(field).is_some_and(|v| !v.is_empty())
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    /// Album name used to key album-scoped values, if known.
    pub fn album(&self) -> Option<&str> {
        self.get(fields::ALBUM).filter(|a| !a.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for (k, v) in iter {
            set.set(k, v);
        }
        set
    }
}

// =============================================================================
// Audio File
// =============================================================================

/// A discovered audio file ready for planning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the scan root.
    pub relative: PathBuf,
    /// Decoded raw tags.
    pub raw_tags: RawTags,
}

impl AudioFile {
    pub fn new(path: impl Into<PathBuf>, relative: impl Into<PathBuf>, raw_tags: RawTags) -> Self {
        Self {
            path: path.into(),
            relative: relative.into(),
            raw_tags,
        }
    }

    /// File extension without the dot, as written on disk.
    pub fn extension(&self) -> &str {
        extension_of(&self.path)
    }
}

/// Extension of `path` without the dot, or `""`.
pub fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_scoped_fields() {
        assert!(fields::is_album_scoped("label"));
        assert!(fields::is_album_scoped("tracktotal"));
        assert!(!fields::is_album_scoped("title"));
        assert!(!fields::is_album_scoped("tracknumber"));
    }

    #[test]
    fn test_empty_value_is_present_but_unset() {
        let tags: TagSet = [("album", ""), ("title", "Song")].into_iter().collect();
        assert!(tags.contains("album"));
        assert!(!tags.is_set("album"));
        assert_eq!(tags.album(), None);
        assert!(tags.is_set("title"));
    }

    #[test]
    fn test_extension() {
        let file = AudioFile::new("/m/a/01 Song.FLAC", "a/01 Song.FLAC", RawTags::new());
        assert_eq!(file.extension(), "FLAC");
        assert_eq!(extension_of(Path::new("noext")), "");
    }
}
