//! Alias table: which source tags feed each canonical field, and how.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::fields;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").expect("valid regex"));
static UPC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{12}$").expect("valid regex"));

/// How a list of raw values becomes one canonical value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Extractor {
    /// Longest token of the first value, split on non-word characters
    Year,
    /// First value verbatim
    First,
    /// First value that is not a 12-digit UPC
    CatalogNo,
    /// First value that is a 12-digit UPC
    Upc,
    /// Part before the first `/` ("3/12" -> "3", "3" -> "3")
    PreSlash,
    /// Part after the last `/`, only when a `/` is present
    PostSlash,
}

impl Extractor {
    /// Apply this extractor to the raw values of one source tag
    pub fn apply(&self, values: &[String]) -> Option<String> {
        let first = values.first()?;
        match self {
            Extractor::Year => Some(longest_token(first).to_string()),
            Extractor::First => Some(first.clone()),
            Extractor::CatalogNo => values.iter().find(|v| !is_upc(v)).cloned(),
            Extractor::Upc => values.iter().find(|v| is_upc(v)).cloned(),
            Extractor::PreSlash => first.split('/').next().map(str::to_string),
            Extractor::PostSlash => {
                if first.contains('/') {
                    first.rsplit('/').next().map(str::to_string)
                } else {
                    None
                }
            }
        }
    }
}

/// First of the longest tokens; ties keep the earliest.
fn longest_token(value: &str) -> &str {
    NON_WORD
        .split(value)
        .fold("", |best, token| {
            if token.chars().count() > best.chars().count() {
                token
            } else {
                best
            }
        })
}

/// Twelve ASCII digits and nothing else.
pub fn is_upc(value: &str) -> bool {
    UPC.is_match(value)
}

/// One fallback chain for a canonical field
#[derive(Debug, Clone, Serialize)]
pub struct Alias {
    /// Canonical field filled by this chain
    pub field: &'static str,
    /// Source tags tried in order; the first one present is used
    pub sources: &'static [&'static str],
    pub extractor: Extractor,
}

const fn alias(
    field: &'static str,
    sources: &'static [&'static str],
    extractor: Extractor,
) -> Alias {
    Alias {
        field,
        sources,
        extractor,
    }
}

/// Default alias chains, applied in order.
///
/// A field may appear more than once; a later chain only runs when the
/// earlier ones left the field absent.
pub const DEFAULT_ALIASES: &[Alias] = &[
    alias(fields::YEAR, &["year", "date", "originalyear", "originaldate"], Extractor::Year),
    alias(fields::DATE, &["date", "year", "originaldate", "originalyear"], Extractor::First),
    alias(
        fields::ORIGINAL_YEAR,
        &["originalyear", "originaldate", "year", "date"],
        Extractor::Year,
    ),
    alias(
        fields::ORIGINAL_DATE,
        &["originaldate", "originalyear", "date", "year"],
        Extractor::First,
    ),
    alias(fields::LABEL, &["label", "organization"], Extractor::First),
    alias(fields::CATALOG_NO, &["catalognumber"], Extractor::CatalogNo),
    alias(fields::UPC, &["barcode"], Extractor::Upc),
    alias(fields::UPC, &["catalognumber"], Extractor::Upc),
    alias(fields::MEDIA, &["media"], Extractor::First),
    alias(fields::ALBUM_ARTIST, &["albumartist", "performer"], Extractor::First),
    alias(fields::ALBUM, &["album"], Extractor::First),
    alias(fields::GENRE, &["genre"], Extractor::First),
    alias(fields::DISC_TOTAL, &["totaldiscs", "disctotal"], Extractor::First),
    alias(fields::DISC_TOTAL, &["discnumber"], Extractor::PostSlash),
    alias(fields::DISC_NUMBER, &["discnumber"], Extractor::PreSlash),
    alias(fields::ARTIST, &["artist", "performer"], Extractor::First),
    alias(fields::TRACK_TOTAL, &["totaltracks", "tracktotal"], Extractor::First),
    alias(fields::TRACK_TOTAL, &["tracknumber"], Extractor::PostSlash),
    alias(fields::TRACK_NUMBER, &["tracknumber"], Extractor::PreSlash),
    alias(fields::TITLE, &["title"], Extractor::First),
];
