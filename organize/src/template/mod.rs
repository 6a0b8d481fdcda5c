//! Path-template language.
//!
//! This module provides:
//! - `ast`: parsed node tree (literals, tag references, conditionals)
//! - `parser`: template string -> node tree
//! - `condition`: OR-combined tests over a tag set
//! - `render`: node tree + tags -> path segment, with prompt fallback
//! - `sanitize`: path/shell-safe character substitution
//! - `program`: ordered segment list, JSON config and parse cache
//!
//! ## Example
//!
//! ```rust,ignore
//! use organize::template::{parse, render_segment};
//!
//! let template = parse("?disctotal!=1?\"Disc :discnumber:\"")?;
//! let segment = render_segment(&template, &mut tags, path, &mut ctx)?;
//! ```

pub mod ast;
pub mod condition;
pub mod parser;
pub mod program;
pub mod render;
pub mod sanitize;

pub use ast::{Comparison, Condition, Operator, Template, TemplateNode, Test};
pub use condition::compare_values;
pub use parser::{parse, parse_condition};
pub use program::{
    CompiledProgram, TemplateCache, TemplateProgram, DEFAULT_KEEP_FORMATS, DEFAULT_SEGMENTS,
};
pub use render::{render, render_segment};
pub use sanitize::{sanitize, RESERVED};
