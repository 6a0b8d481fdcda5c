//! Template program definition
//!
//! A program is the ordered list of template strings, one per level of the
//! destination tree, plus the companion file extensions carried along by
//! the migration script.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use super::ast::Template;
use super::parser::parse;
use crate::error::{ProgramError, ProgramResult, TemplateResult};

/// Default layout: album artist / year - album [FORMAT] {label catalog} /
/// Disc N (multi-disc only) / track title.format
pub const DEFAULT_SEGMENTS: [&str; 4] = [
    ":albumartist:",
    ":year: - :album: [:FORMAT:]?label|catalogno?\" {:label?:?label?\" \":catalogno?:}\"",
    "?disctotal!=1?\"Disc :discnumber:\"",
    ":tracknumber: :title:.:format:",
];

/// Non-audio files copied next to the audio they accompany
pub const DEFAULT_KEEP_FORMATS: [&str; 10] = [
    "jpg", "jpeg", "jif", "jfif", "png", "bmp", "tiff", "gif", "pdf", "txt",
];

/// A complete template program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateProgram {
    /// Version of the program format
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Template strings, outermost directory first, file name last
    pub segments: Vec<String>,

    /// Companion file extensions (without the dot)
    #[serde(default = "default_keep_formats")]
    pub keep_formats: Vec<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_keep_formats() -> Vec<String> {
    DEFAULT_KEEP_FORMATS.iter().map(|s| s.to_string()).collect()
}

impl TemplateProgram {
    /// Program with the given segments and default keep formats
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version: default_version(),
            description: String::new(),
            segments: segments.into_iter().map(Into::into).collect(),
            keep_formats: default_keep_formats(),
        }
    }

    /// Split a `/`-separated format string into segments
    pub fn from_format_string(format: &str) -> Self {
        Self::new(format.split('/'))
    }

    /// Parse a program from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a program from a JSON file
    pub fn from_file(path: &Path) -> ProgramResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn with_keep_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Parse every segment, failing on the first malformed one
    pub fn compile(&self, cache: &mut TemplateCache) -> ProgramResult<CompiledProgram> {
        if self.segments.is_empty() {
            return Err(ProgramError::Empty);
        }

        let segments = self
            .segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                cache
                    .get_or_parse(segment)
                    .map_err(|source| ProgramError::Segment {
                        index,
                        segment: segment.clone(),
                        source,
                    })
            })
            .collect::<ProgramResult<Vec<_>>>()?;

        Ok(CompiledProgram { segments })
    }
}

impl Default for TemplateProgram {
    fn default() -> Self {
        let mut program = Self::new(DEFAULT_SEGMENTS);
        program.description = "Album artist / year - album / disc / track".to_string();
        program
    }
}

/// Parsed segments, in program order
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    segments: Vec<Rc<Template>>,
}

impl CompiledProgram {
    pub fn segments(&self) -> &[Rc<Template>] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Parse results keyed by template string.
///
/// Parsing is pure, so a string only has to be parsed once per run.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: HashMap<String, Rc<Template>>,
    hits: usize,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_parse(&mut self, source: &str) -> TemplateResult<Rc<Template>> {
        if let Some(template) = self.entries.get(source) {
            self.hits += 1;
            return Ok(Rc::clone(template));
        }

        let template = Rc::new(parse(source)?);
        self.entries.insert(source.to_string(), Rc::clone(&template));
        Ok(template)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered without parsing
    pub fn hits(&self) -> usize {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplateError;

    #[test]
    fn test_default_program_compiles() {
        let mut cache = TemplateCache::new();
        let compiled = TemplateProgram::default().compile(&mut cache).unwrap();
        assert_eq!(compiled.len(), 4);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_program_serialization() {
        let program = TemplateProgram::default();
        let json = program.to_json().unwrap();
        let parsed = TemplateProgram::from_json(&json).unwrap();
        assert_eq!(parsed, program);
    }

    #[test]
    fn test_json_defaults() {
        let program = TemplateProgram::from_json(r#"{"segments": [":artist:", ":title:"]}"#).unwrap();
        assert_eq!(program.version, "1.0");
        assert_eq!(program.keep_formats.len(), DEFAULT_KEEP_FORMATS.len());
    }

    #[test]
    fn test_format_string_split() {
        let program = TemplateProgram::from_format_string(":albumartist:/:album:/:title:.:format:");
        assert_eq!(program.segments, vec![":albumartist:", ":album:", ":title:.:format:"]);
    }

    #[test]
    fn test_malformed_segment_fails_compile() {
        let program = TemplateProgram::new([":artist:", "?disctotal?\"Disc"]);
        let err = program.compile(&mut TemplateCache::new()).unwrap_err();
        match err {
            ProgramError::Segment { index, source, .. } => {
                assert_eq!(index, 1);
                assert_eq!(source, TemplateError::UnbalancedQuotes { position: 11 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_program() {
        let program = TemplateProgram::new(Vec::<String>::new());
        assert!(matches!(
            program.compile(&mut TemplateCache::new()),
            Err(ProgramError::Empty)
        ));
    }

    #[test]
    fn test_cache_reuses_parses() {
        let mut cache = TemplateCache::new();
        let a = cache.get_or_parse(":title:").unwrap();
        let b = cache.get_or_parse(":title:").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }
}
