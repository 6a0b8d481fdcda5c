//! End-to-end planning: scan root -> destination tree.
//!
//! # Example
//!
//! ```rust,ignore
//! use organize::pipeline::{plan_library, PlanOptions};
//! use organize::prompt::TerminalPrompt;
//! use std::path::Path;
//!
//! let mut prompt = TerminalPrompt::stdio();
//! let plan = plan_library(Path::new("/music/inbox"), &PlanOptions::default(), &mut prompt)?;
//! println!("{} files planned", plan.stats.leaves_created);
//! ```

use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::emit::ScriptWriter;
use crate::error::PipelineResult;
use crate::models::AudioFile;
use crate::prompt::{Prompt, PromptContext};
use crate::reader::{discover, read_audio_files, LoftyTagSource, RawTagSource};
use crate::tags::TagResolver;
use crate::template::{CompiledProgram, TemplateCache, TemplateProgram};
use crate::tree::{BuildStats, DestinationTree, TreeBuilder};

/// Default destination, relative to the working directory.
pub const DEFAULT_DESTINATION: &str = "../output";

/// Options for planning a library
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOptions {
    /// Directory the tree is rooted at
    pub destination: String,

    /// Template program, one segment per tree level
    pub program: TemplateProgram,

    /// Also scan dot-files and dot-directories
    pub include_hidden: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            destination: DEFAULT_DESTINATION.to_string(),
            program: TemplateProgram::default(),
            include_hidden: false,
        }
    }
}

/// A finished plan, ready to be emitted
#[derive(Debug, Clone)]
pub struct Plan {
    /// Scan root the tree's source paths are relative to
    pub source: PathBuf,
    pub tree: DestinationTree,
    pub stats: BuildStats,
    /// Companion extensions copied next to placed files
    pub keep_formats: Vec<String>,
}

impl Plan {
    /// Script writer for this plan.
    pub fn script_writer(&self) -> ScriptWriter {
        ScriptWriter::new(&self.source, self.keep_formats.clone())
    }
}

/// Plan `root` with tags decoded by `lofty`.
pub fn plan_library(
    root: &Path,
    options: &PlanOptions,
    prompt: &mut dyn Prompt,
) -> PipelineResult<Plan> {
    plan_library_with(root, options, &LoftyTagSource::new(), prompt)
}

/// Plan `root` with a custom raw-tag source.
///
/// The program is compiled before anything is read, so a malformed
/// template fails without touching the library.
pub fn plan_library_with(
    root: &Path,
    options: &PlanOptions,
    source: &dyn RawTagSource,
    prompt: &mut dyn Prompt,
) -> PipelineResult<Plan> {
    let program = options.program.compile(&mut TemplateCache::new())?;

    let paths = discover(root, options.include_hidden)?;
    let files = read_audio_files(root, &paths, source)?;
    info!("Read tags for {} files", files.len());

    let (tree, stats) = plan_files(&files, &program, &options.destination, prompt)?;

    Ok(Plan {
        source: root.to_path_buf(),
        tree,
        stats,
        keep_formats: options.program.keep_formats.clone(),
    })
}

/// Build a tree for already-decoded files.
pub fn plan_files(
    files: &[AudioFile],
    program: &CompiledProgram,
    destination: &str,
    prompt: &mut dyn Prompt,
) -> PipelineResult<(DestinationTree, BuildStats)> {
    let resolver = TagResolver::new();
    let mut ctx = PromptContext::new(prompt);
    let built = TreeBuilder::new(&resolver, program).build(files, destination, &mut ctx)?;
    Ok(built)
}
