//! Error types for the organize planning pipeline.
//!
//! This module defines one error type per concern:
//!
//! - [`TemplateError`] - Path-template parsing errors
//! - [`ProgramError`] - Template program loading/compilation errors
//! - [`PromptError`] - Interactive value source errors
//! - [`TagReadError`] - Raw tag decoding errors
//! - [`ScanError`] - Library discovery errors
//! - [`EmitError`] - Script/layout output errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Template Errors
// =============================================================================

/// Errors while parsing a single path template.
///
/// Positions are character offsets into the template string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `:` opened a tag reference that never closed.
    #[error("Unterminated tag reference starting at {position}")]
    UnterminatedTag { position: usize },

    /// `::` or `:?:` with no tag name.
    #[error("Empty tag name at {position}")]
    EmptyTagName { position: usize },

    /// A `?` opened a condition header that never closed.
    #[error("Unterminated condition starting at {position}")]
    UnterminatedCondition { position: usize },

    /// The condition header was not followed by an opening `"`.
    #[error("Malformed conditional: expected '\"' after condition at {position}")]
    ExpectedBody { position: usize },

    /// A conditional body was never closed.
    #[error("Malformed conditional: unbalanced quotes in body starting at {position}")]
    UnbalancedQuotes { position: usize },

    /// `??` or a dangling `|` in a condition.
    #[error("Empty test in condition at {position}")]
    EmptyTest { position: usize },

    /// Comparison operator outside the supported set.
    #[error("Unknown operator in test '{test}'")]
    UnknownOperator { test: String },

    /// An operator with nothing to compare on one side.
    #[error("Missing operand in test '{test}'")]
    MissingOperand { test: String },
}

// =============================================================================
// Program Errors
// =============================================================================

/// Errors while loading or compiling a template program.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// Failed to read the program file.
    #[error("Failed to read program: {0}")]
    IoError(#[from] std::io::Error),

    /// The program file is not valid JSON.
    #[error("Invalid program JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A program needs at least one segment.
    #[error("Template program has no segments")]
    Empty,

    /// One of the segments failed to parse.
    #[error("Segment {index} ('{segment}'): {source}")]
    Segment {
        index: usize,
        segment: String,
        #[source]
        source: TemplateError,
    },
}

// =============================================================================
// Prompt Errors
// =============================================================================

/// Errors from the fallback value source.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Reading from the terminal failed.
    #[error("Failed to read value for '{field}': {source}")]
    Io {
        field: String,
        #[source]
        source: std::io::Error,
    },

    /// Input was closed before a value was typed.
    #[error("Input closed while waiting for a value for '{field}'")]
    Closed { field: String },

    /// A scripted source ran out of answers.
    #[error("No scripted answer left for '{field}' in {path}")]
    Exhausted { field: String, path: PathBuf },
}

// =============================================================================
// Tag Read Errors
// =============================================================================

/// Errors from the raw-tag decoder.
#[derive(Debug, Error)]
#[error("Failed to read tags from {path}: {message}")]
pub struct TagReadError {
    pub path: PathBuf,
    pub message: String,
}

impl TagReadError {
    pub fn new(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

// =============================================================================
// Scan Errors
// =============================================================================

/// Errors while discovering audio files.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Scan root does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Scan root exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Walking the tree failed.
    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

// =============================================================================
// Emit Errors
// =============================================================================

/// Errors while writing the migration script or layout.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Output write failed.
    #[error("Failed to write output: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level planning errors.
///
/// This is the main error type returned by [`crate::pipeline::plan_library`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Template program error.
    #[error("Program error: {0}")]
    Program(#[from] ProgramError),

    /// Fallback value source error.
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// Tag decoding error.
    #[error("Tag error: {0}")]
    TagRead(#[from] TagReadError),

    /// Discovery error.
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// Output error.
    #[error("Emit error: {0}")]
    Emit(#[from] EmitError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for template parsing.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Result type for program operations.
pub type ProgramResult<T> = Result<T, ProgramError>;

/// Result type for prompt operations.
pub type PromptResult<T> = Result<T, PromptError>;

/// Result type for discovery operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Result type for emit operations.
pub type EmitResult<T> = Result<T, EmitError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
