//! Album Cache - Reuse interactively supplied album-scoped values
//!
//! The first file of an album that needs, say, `label` prompts for it; every
//! later file of the same album in the same run gets the stored answer.
//! The cache lives for one planning run and is passed explicitly.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::fields;

/// Values filled in for one album, keyed by canonical field.
pub type AlbumValues = HashMap<String, String>;

/// Per-run store of album-scoped answers
#[derive(Debug, Default, Clone, Serialize)]
pub struct AlbumCache {
    /// album name -> field -> value
    albums: HashMap<String, AlbumValues>,
}

impl AlbumCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored value
    pub fn get(&self, album: &str, field: &str) -> Option<&str> {
        self.albums
            .get(album)
            .and_then(|values| values.get(field))
            .map(String::as_str)
    }

    /// Store a value. Fields that are not album-scoped are ignored and
    /// `false` is returned.
    pub fn insert(&mut self, album: &str, field: &str, value: impl Into<String>) -> bool {
        if !fields::is_album_scoped(field) {
            return false;
        }
        self.albums
            .entry(album.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
        true
    }

    /// Number of albums with at least one stored value
    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }
}
