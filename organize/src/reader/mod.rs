//! Library discovery and raw-tag decoding.
//!
//! - [`discover`] walks the scan root for audio files
//! - [`RawTagSource`] decodes one file into [`RawTags`]
//! - [`read_audio_files`] combines both into planner input

mod decode;

pub use decode::LoftyTagSource;

use log::{debug, info};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{ScanError, ScanResult, TagReadError};
use crate::models::{extension_of, AudioFile, RawTags};

/// Extensions treated as audio, compared case-insensitively.
pub const AUDIO_EXTENSIONS: [&str; 28] = [
    "aac", "m4a", "m4b", "m4p", "m4v", "m4r", "3gp", "mp4", "aiff", "aif", "aifc", "ape", "apl",
    "asf", "wma", "wmv", "flac", "mp3", "mpc", "mp+", "mpp", "ogg", "ogv", "oga", "ogx", "ogm",
    "spx", "opus",
];

/// Source of raw key -> values tags for one file.
pub trait RawTagSource {
    fn read_tags(&self, path: &Path) -> Result<RawTags, TagReadError>;
}

pub fn is_audio_path(path: &Path) -> bool {
    let extension = extension_of(path);
    AUDIO_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(extension))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Every audio file under `root`, sorted by path.
pub fn discover(root: &Path, include_hidden: bool) -> ScanResult<Vec<PathBuf>> {
    if !root.exists() {
        return Err(ScanError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| include_hidden || !is_hidden(entry));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| ScanError::Walk {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() && is_audio_path(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    info!("Discovered {} audio files under {}", files.len(), root.display());
    Ok(files)
}

/// Decode tags for each path, keeping paths relative to `root`.
pub fn read_audio_files(
    root: &Path,
    paths: &[PathBuf],
    source: &dyn RawTagSource,
) -> Result<Vec<AudioFile>, TagReadError> {
    paths
        .iter()
        .map(|path| {
            let raw_tags = source.read_tags(path)?;
            debug!("{}: {} raw tags", path.display(), raw_tags.len());
            let relative = path.strip_prefix(root).unwrap_or(path);
            Ok(AudioFile::new(path.clone(), relative, raw_tags))
        })
        .collect()
}
