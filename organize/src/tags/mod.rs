//! Tag resolution: normalize heterogeneous raw metadata into canonical fields.
//!
//! - `aliases`: source-tag fallback chains and value extractors
//! - `resolver`: builds a [`TagSet`](crate::models::TagSet) per file,
//!   zero-pads track/disc numbers and derives `format`/`FORMAT`

pub mod aliases;
pub mod resolver;

pub use aliases::{is_upc, Alias, Extractor, DEFAULT_ALIASES};
pub use resolver::{zero_pad, TagResolver};
