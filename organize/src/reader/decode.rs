//! Raw-tag decoding backed by `lofty`.

use log::debug;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};
use std::path::Path;

use super::RawTagSource;
use crate::error::TagReadError;
use crate::models::RawTags;

/// Reads tags with `lofty` and exposes them under lowercase
/// Vorbis-comment style keys (`album`, `tracknumber`, `totaldiscs`, ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagSource;

impl LoftyTagSource {
    pub fn new() -> Self {
        Self
    }
}

impl RawTagSource for LoftyTagSource {
    fn read_tags(&self, path: &Path) -> Result<RawTags, TagReadError> {
        let tagged_file = Probe::open(path)
            .and_then(|probe| probe.read())
            .map_err(|e| TagReadError::new(path, e))?;

        if let Some(primary) = tagged_file.primary_tag() {
            let raw = raw_tags(primary);
            if !raw.is_empty() {
                return Ok(raw);
            }
        }

        // primary tag missing or empty: merge whatever the other tags hold
        let mut raw = RawTags::new();
        for tag in tagged_file.tags() {
            for (key, values) in raw_tags(tag) {
                raw.entry(key).or_insert(values);
            }
        }
        if raw.is_empty() {
            debug!("{}: no tags", path.display());
        }
        Ok(raw)
    }
}

fn raw_key(key: &ItemKey) -> Option<&'static str> {
    let name = match key {
        ItemKey::AlbumTitle => "album",
        ItemKey::TrackTitle => "title",
        ItemKey::TrackArtist => "artist",
        ItemKey::AlbumArtist => "albumartist",
        ItemKey::Performer => "performer",
        ItemKey::Year => "year",
        ItemKey::RecordingDate => "date",
        ItemKey::OriginalReleaseDate => "originaldate",
        ItemKey::Label => "label",
        ItemKey::Publisher => "organization",
        ItemKey::CatalogNumber => "catalognumber",
        ItemKey::Barcode => "barcode",
        ItemKey::OriginalMediaType => "media",
        ItemKey::Genre => "genre",
        ItemKey::DiscNumber => "discnumber",
        ItemKey::DiscTotal => "totaldiscs",
        ItemKey::TrackNumber => "tracknumber",
        ItemKey::TrackTotal => "totaltracks",
        _ => return None,
    };
    Some(name)
}

fn raw_tags(tag: &Tag) -> RawTags {
    let mut raw = RawTags::new();
    for item in tag.items() {
        let key = item.key();
        let Some(name) = raw_key(&key) else {
            continue;
        };
        if let Some(text) = item.value().text() {
            raw.entry(name.to_string())
                .or_default()
                .push(text.to_string());
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::tag::{ItemValue, TagItem, TagType};
    use tempfile::TempDir;

    #[test]
    fn test_item_keys_map_to_raw_names() {
        assert_eq!(raw_key(&ItemKey::AlbumTitle), Some("album"));
        assert_eq!(raw_key(&ItemKey::Publisher), Some("organization"));
        assert_eq!(raw_key(&ItemKey::DiscTotal), Some("totaldiscs"));
        assert_eq!(raw_key(&ItemKey::Comment), None);
    }

    #[test]
    fn test_multi_valued_items_are_kept() {
        let mut tag = Tag::new(TagType::VorbisComments);
        tag.push(TagItem::new(
            ItemKey::CatalogNumber,
            ItemValue::Text("BLP 1577".to_string()),
        ));
        tag.push(TagItem::new(
            ItemKey::CatalogNumber,
            ItemValue::Text("602547288240".to_string()),
        ));
        tag.push(TagItem::new(ItemKey::TrackTitle, ItemValue::Text("Moment's Notice".to_string())));

        let raw = raw_tags(&tag);
        assert_eq!(raw["catalognumber"], vec!["BLP 1577", "602547288240"]);
        assert_eq!(raw["title"], vec!["Moment's Notice"]);
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, b"not audio at all").unwrap();

        let err = LoftyTagSource::new().read_tags(&path).unwrap_err();
        assert_eq!(err.path, path);
    }
}
