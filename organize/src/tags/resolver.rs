//! Raw tags -> canonical tag set.

use log::debug;
use std::path::Path;

use super::aliases::{Alias, DEFAULT_ALIASES};
use crate::error::PromptResult;
use crate::models::{extension_of, fields, RawTags, TagSet};
use crate::prompt::PromptContext;

/// Builds a [`TagSet`] for one file from its raw tags.
#[derive(Debug, Clone)]
pub struct TagResolver {
    aliases: Vec<Alias>,
}

impl Default for TagResolver {
    fn default() -> Self {
        Self::with_aliases(DEFAULT_ALIASES.to_vec())
    }
}

impl TagResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aliases(aliases: Vec<Alias>) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// Resolve canonical tags for the file at `path`.
    ///
    /// Fields with no matching source stay absent. Track and disc numbers
    /// are zero-padded to the width of their totals, asking `ctx` for a
    /// missing total. `format`/`FORMAT` come from the file extension.
    pub fn resolve(
        &self,
        raw: &RawTags,
        path: &Path,
        ctx: &mut PromptContext<'_>,
    ) -> PromptResult<TagSet> {
        let mut tags = self.apply_aliases(raw);

        if tags.contains(fields::TRACK_NUMBER) {
            pad_to_total(&mut tags, fields::TRACK_TOTAL, fields::TRACK_NUMBER, path, ctx)?;
        }
        if tags.contains(fields::DISC_NUMBER) {
            pad_to_total(&mut tags, fields::DISC_TOTAL, fields::DISC_NUMBER, path, ctx)?;
        }

        let extension = extension_of(path);
        tags.set(fields::FORMAT, extension.to_lowercase());
        tags.set(fields::FORMAT_UPPER, extension.to_uppercase());

        debug!("Resolved {} tags for {}", tags.len(), path.display());
        Ok(tags)
    }

    /// Alias chains only: no prompting, no padding, no derived fields.
    pub fn apply_aliases(&self, raw: &RawTags) -> TagSet {
        let mut tags = TagSet::new();

        for alias in &self.aliases {
            if tags.contains(alias.field) {
                continue;
            }

            let source = alias
                .sources
                .iter()
                .find_map(|source| raw.get(*source));

            if let Some(values) = source {
                if let Some(value) = alias.extractor.apply(values) {
                    tags.set(alias.field, value);
                }
            }
        }

        tags
    }
}

fn pad_to_total(
    tags: &mut TagSet,
    total_field: &str,
    number_field: &str,
    path: &Path,
    ctx: &mut PromptContext<'_>,
) -> PromptResult<()> {
    let total = match tags.get(total_field) {
        Some(total) => total.to_string(),
        None => {
            let total = ctx.request(tags, total_field, path)?;
            tags.set(total_field, total.clone());
            total
        }
    };

    let width = total.chars().count();
    if width > 1 {
        if let Some(number) = tags.get(number_field) {
            let padded = zero_pad(number, width);
            tags.set(number_field, padded);
        }
    }

    Ok(())
}

/// Left-pad with `0` to `width` characters.
pub fn zero_pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }
    let mut padded = "0".repeat(width - len);
    padded.push_str(value);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;

    fn raw(pairs: &[(&str, &[&str])]) -> RawTags {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_resolve_full_file() {
        let raw = raw(&[
            ("album", &["Kind of Blue"]),
            ("artist", &["Miles Davis"]),
            ("performer", &["Miles Davis Sextet"]),
            ("date", &["1959-08-17"]),
            ("organization", &["Columbia"]),
            ("catalognumber", &["CL 1355", "074646093524"]),
            ("tracknumber", &["3/5"]),
            ("discnumber", &["1/1"]),
            ("title", &["Blue in Green"]),
        ]);
        let mut prompt = ScriptedPrompt::default();
        let mut ctx = PromptContext::new(&mut prompt);

        let tags = TagResolver::new()
            .resolve(&raw, Path::new("/m/03.Flac"), &mut ctx)
            .unwrap();

        assert_eq!(tags.get("year"), Some("1959"));
        assert_eq!(tags.get("date"), Some("1959-08-17"));
        assert_eq!(tags.get("originalyear"), Some("1959"));
        assert_eq!(tags.get("label"), Some("Columbia"));
        assert_eq!(tags.get("catalogno"), Some("CL 1355"));
        assert_eq!(tags.get("upc"), Some("074646093524"));
        assert_eq!(tags.get("albumartist"), Some("Miles Davis Sextet"));
        assert_eq!(tags.get("tracknumber"), Some("3"));
        assert_eq!(tags.get("tracktotal"), Some("5"));
        assert_eq!(tags.get("discnumber"), Some("1"));
        assert_eq!(tags.get("disctotal"), Some("1"));
        assert_eq!(tags.get("format"), Some("flac"));
        assert_eq!(tags.get("FORMAT"), Some("FLAC"));
        assert_eq!(tags.get("genre"), None);
        assert_eq!(prompt.request_count(), 0);
    }

    #[test]
    fn test_track_number_padded_to_total_width() {
        let raw = raw(&[("tracknumber", &["7"]), ("totaltracks", &["12"])]);
        let mut prompt = ScriptedPrompt::default();
        let mut ctx = PromptContext::new(&mut prompt);

        let tags = TagResolver::new()
            .resolve(&raw, Path::new("a.mp3"), &mut ctx)
            .unwrap();
        assert_eq!(tags.get("tracknumber"), Some("07"));
    }

    #[test]
    fn test_missing_total_is_requested_and_cached_per_album() {
        let raw = raw(&[("album", &["X"]), ("tracknumber", &["4"])]);
        let mut prompt = ScriptedPrompt::new(["100"]);
        let mut ctx = PromptContext::new(&mut prompt);
        let resolver = TagResolver::new();

        let first = resolver.resolve(&raw, Path::new("1.ogg"), &mut ctx).unwrap();
        let second = resolver.resolve(&raw, Path::new("2.ogg"), &mut ctx).unwrap();

        assert_eq!(first.get("tracknumber"), Some("004"));
        assert_eq!(second.get("tracktotal"), Some("100"));
        assert_eq!(ctx.prompts_issued(), 1);
    }

    #[test]
    fn test_first_present_candidate_wins_even_if_extractor_fails() {
        // barcode is present but not a UPC; the catalognumber chain runs next
        let raw = raw(&[("barcode", &["5099902987521"]), ("catalognumber", &["602537351169"])]);
        let tags = TagResolver::new().apply_aliases(&raw);
        assert_eq!(tags.get("upc"), Some("602537351169"));
        assert_eq!(tags.get("catalogno"), None);
    }

    #[test]
    fn test_no_candidates_leaves_field_absent() {
        let tags = TagResolver::new().apply_aliases(&RawTags::new());
        assert!(tags.is_empty());
    }

    #[test]
    fn test_zero_pad() {
        assert_eq!(zero_pad("3", 2), "03");
        assert_eq!(zero_pad("10", 2), "10");
        assert_eq!(zero_pad("123", 2), "123");
    }
}
