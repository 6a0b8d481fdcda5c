//! # Organize - tag-driven music library layout
//!
//! Organize reads the tags of every audio file under a directory, renders a
//! destination path for each from a small template language, merges those
//! paths into one tree and emits the tree as a bash migration script.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Audio files │────▶│ TagResolver │────▶│  Templates  │────▶│ Destination │──▶ script
//! │  (walkdir,  │     │  (aliases,  │     │ (parse, if, │     │    tree     │──▶ layout
//! │   lofty)    │     │   prompts)  │     │  sanitize)  │     │  (dedup)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use organize::{plan_library, PlanOptions, TerminalPrompt};
//! use std::path::Path;
//!
//! let mut prompt = TerminalPrompt::stdio();
//! let plan = plan_library(Path::new("/music/inbox"), &PlanOptions::default(), &mut prompt)?;
//! plan.script_writer().write(&plan.tree, &mut std::io::stdout())?;
//! ```
//!
//! ## Template language
//!
//! - `:name:` inserts a tag, asking for it when missing
//! - `:name?:` inserts a tag if present, never asks
//! - `?test|test?"body"` renders `body` when any test holds;
//!   a test is `name` (present) or `name<op>value` with `== != <> < <= > >=`
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Tag sets, raw tags, audio files
//! - [`cache`] - Per-album answers reused across files
//! - [`prompt`] - Fallback value sources
//! - [`tags`] - Raw tags -> canonical tags
//! - [`template`] - Template parsing, conditions and rendering
//! - [`tree`] - Destination tree and builder
//! - [`reader`] - Discovery and tag decoding
//! - [`emit`] - Migration script and layout output
//! - [`pipeline`] - End-to-end planning

// Core modules
pub mod error;
pub mod models;

// Prompting
pub mod cache;
pub mod prompt;

// Tags and templates
pub mod tags;
pub mod template;

// Planning
pub mod reader;
pub mod tree;
pub mod pipeline;

// Output
pub mod emit;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    EmitError, PipelineError, ProgramError, PromptError, ScanError, TagReadError, TemplateError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{fields, AudioFile, RawTags, TagSet};

// =============================================================================
// Re-exports - Prompting
// =============================================================================

pub use cache::AlbumCache;
pub use prompt::{FixedPrompt, Prompt, PromptContext, ScriptedPrompt, TerminalPrompt};

// =============================================================================
// Re-exports - Tags
// =============================================================================

pub use tags::{TagResolver, DEFAULT_ALIASES};

// =============================================================================
// Re-exports - Templates
// =============================================================================

pub use template::{
    parse,
    render,
    render_segment,
    sanitize,
    CompiledProgram,
    Condition,
    Template,
    TemplateCache,
    TemplateNode,
    TemplateProgram,
};

// =============================================================================
// Re-exports - Tree
// =============================================================================

pub use tree::{BuildStats, DestinationTree, FileMapping, NodeId, Placement, TreeBuilder};

// =============================================================================
// Re-exports - Reader
// =============================================================================

pub use reader::{discover, read_audio_files, LoftyTagSource, RawTagSource};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use emit::{print_layout, ScriptWriter};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{plan_library, plan_library_with, Plan, PlanOptions, DEFAULT_DESTINATION};
