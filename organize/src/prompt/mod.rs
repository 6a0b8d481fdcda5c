//! Fallback value sources for tags missing from a file.
//!
//! When a template requires a field the file does not carry, the value is
//! requested through a [`Prompt`]. The real CLI asks on the terminal; tests
//! and headless runs plug in [`ScriptedPrompt`] or [`FixedPrompt`].
//!
//! [`PromptContext`] wraps a prompt together with the run's [`AlbumCache`]
//! so album-scoped answers are asked once per album.
//!
//! ```rust,ignore
//! use organize::prompt::{PromptContext, ScriptedPrompt};
//!
//! let mut answers = ScriptedPrompt::new(["Blue Note"]);
//! let mut ctx = PromptContext::new(&mut answers);
//! let label = ctx.request(&tags, "label", path)?;
//! ```

use log::debug;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::cache::AlbumCache;
use crate::error::{PromptError, PromptResult};
use crate::models::{fields, TagSet};

/// A blocking source of values for missing tags.
pub trait Prompt {
    /// Ask for `field` of the file at `path`. `tags` is the file's current
    /// tag set, for context.
    fn request(&mut self, tags: &TagSet, field: &str, path: &Path) -> PromptResult<String>;
}

impl<F> Prompt for F
where
    F: FnMut(&TagSet, &str, &Path) -> PromptResult<String>,
{
    fn request(&mut self, tags: &TagSet, field: &str, path: &Path) -> PromptResult<String> {
        self(tags, field, path)
    }
}

// =============================================================================
// Terminal
// =============================================================================

/// Reads answers line by line, writing the question to `output`.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Questions on stderr so a script written to stdout stays clean.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn request(&mut self, _tags: &TagSet, field: &str, path: &Path) -> PromptResult<String> {
        let io_err = |source| PromptError::Io {
            field: field.to_string(),
            source,
        };

        write!(
            self.output,
            "Enter value for tag \"{}\" in file \"{}\": ",
            field,
            path.display()
        )
        .map_err(io_err)?;
        self.output.flush().map_err(io_err)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_err)?;
        if read == 0 {
            return Err(PromptError::Closed {
                field: field.to_string(),
            });
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }
}

// =============================================================================
// Headless sources
// =============================================================================

/// Replays a fixed list of answers in order and records every request.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    requests: Vec<(String, PathBuf)>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            requests: Vec::new(),
        }
    }

    /// (field, path) of every request made so far.
    pub fn requests(&self) -> &[(String, PathBuf)] {
        &self.requests
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }
}

impl Prompt for ScriptedPrompt {
    fn request(&mut self, _tags: &TagSet, field: &str, path: &Path) -> PromptResult<String> {
        self.requests.push((field.to_string(), path.to_path_buf()));
        self.answers.pop_front().ok_or_else(|| PromptError::Exhausted {
            field: field.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Answers every request with the same value.
#[derive(Debug, Clone)]
pub struct FixedPrompt {
    value: String,
}

impl FixedPrompt {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Prompt for FixedPrompt {
    fn request(&mut self, _tags: &TagSet, field: &str, path: &Path) -> PromptResult<String> {
        debug!("Filling '{}' for {} with '{}'", field, path.display(), self.value);
        Ok(self.value.clone())
    }
}

// =============================================================================
// Context
// =============================================================================

/// A prompt plus the run's album cache.
pub struct PromptContext<'p> {
    cache: AlbumCache,
    prompt: &'p mut dyn Prompt,
    issued: usize,
}

impl<'p> PromptContext<'p> {
    pub fn new(prompt: &'p mut dyn Prompt) -> Self {
        Self::with_cache(AlbumCache::new(), prompt)
    }

    pub fn with_cache(cache: AlbumCache, prompt: &'p mut dyn Prompt) -> Self {
        Self {
            cache,
            prompt,
            issued: 0,
        }
    }

    /// Obtain a value for `field`.
    ///
    /// Album-scoped fields of a file with a known album are served from the
    /// cache when possible, and answers for them are stored back.
    pub fn request(&mut self, tags: &TagSet, field: &str, path: &Path) -> PromptResult<String> {
        let album = if fields::is_album_scoped(field) {
            tags.album()
        } else {
            None
        };

        if let Some(album) = album {
            if let Some(value) = self.cache.get(album, field) {
                debug!("Reusing '{}' = '{}' for album '{}'", field, value, album);
                return Ok(value.to_string());
            }
        }

        let value = self.prompt.request(tags, field, path)?;
        self.issued += 1;

        if let Some(album) = album {
            self.cache.insert(album, field, value.clone());
        }

        Ok(value)
    }

    /// Number of times the underlying prompt was asked.
    pub fn prompts_issued(&self) -> usize {
        self.issued
    }

    pub fn cache(&self) -> &AlbumCache {
        &self.cache
    }
}
