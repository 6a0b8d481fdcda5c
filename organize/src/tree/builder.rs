//! Drives tag resolution and segment rendering for a list of files and
//! merges the results into one [`DestinationTree`].

use log::{debug, info, warn};
use serde::Serialize;

use super::{DestinationTree, Placement};
use crate::error::PromptResult;
use crate::models::AudioFile;
use crate::prompt::PromptContext;
use crate::tags::TagResolver;
use crate::template::{render_segment, CompiledProgram};

/// Counters collected while building a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub files_seen: usize,
    pub leaves_created: usize,
    /// Files whose destination was already taken by an earlier file.
    pub duplicates: usize,
    /// Files not placed: empty file name, a `.`/`..` segment or a
    /// directory/file clash.
    pub skipped: usize,
    pub prompts_issued: usize,
}

pub struct TreeBuilder<'a> {
    resolver: &'a TagResolver,
    program: &'a CompiledProgram,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(resolver: &'a TagResolver, program: &'a CompiledProgram) -> Self {
        Self { resolver, program }
    }

    /// Place every file under a new tree rooted at `destination`.
    pub fn build(
        &self,
        files: &[AudioFile],
        destination: &str,
        ctx: &mut PromptContext<'_>,
    ) -> PromptResult<(DestinationTree, BuildStats)> {
        let mut tree = DestinationTree::new(destination);
        let mut stats = BuildStats::default();
        let prompts_before = ctx.prompts_issued();

        for file in files {
            stats.files_seen += 1;
            match self.place(&mut tree, file, ctx)? {
                Some(Placement::Created(_)) => stats.leaves_created += 1,
                Some(Placement::Duplicate(id)) => {
                    warn!(
                        "{} renders to the same destination as {}, skipping",
                        file.relative.display(),
                        tree.node(id)
                            .mapping()
                            .map(|m| m.source.display().to_string())
                            .unwrap_or_default()
                    );
                    stats.duplicates += 1;
                }
                Some(Placement::Conflict(id)) => {
                    warn!(
                        "{}: '{}' is both a file and a directory, skipping",
                        file.relative.display(),
                        tree.path_of(id).display()
                    );
                    stats.skipped += 1;
                }
                Some(Placement::Reused(_)) | None => stats.skipped += 1,
            }
        }

        stats.prompts_issued = ctx.prompts_issued() - prompts_before;
        debug!("{} albums with prompted values", ctx.cache().len());
        info!(
            "Planned {} of {} files ({} duplicates, {} skipped, {} prompts)",
            stats.leaves_created,
            stats.files_seen,
            stats.duplicates,
            stats.skipped,
            stats.prompts_issued
        );
        Ok((tree, stats))
    }

    /// Resolve, render and insert one file.
    ///
    /// Returns `None` when the file name segment rendered empty or any
    /// segment rendered to `.` or `..`.
    pub fn place(
        &self,
        tree: &mut DestinationTree,
        file: &AudioFile,
        ctx: &mut PromptContext<'_>,
    ) -> PromptResult<Option<Placement>> {
        let mut tags = self.resolver.resolve(&file.raw_tags, &file.path, ctx)?;

        let templates = self.program.segments();
        let mut rendered = Vec::with_capacity(templates.len());
        for template in templates {
            rendered.push(render_segment(template, &mut tags, &file.path, ctx)?);
        }

        let Some((name, directories)) = rendered.split_last() else {
            return Ok(None);
        };
        if name.is_empty() {
            warn!("{}: file name renders empty, skipping", file.relative.display());
            return Ok(None);
        }
        if let Some(segment) = rendered.iter().find(|s| is_relative_step(s)) {
            warn!(
                "{}: segment renders to '{}', skipping",
                file.relative.display(),
                segment
            );
            return Ok(None);
        }

        let mut level = tree.root();
        for segment in directories {
            if segment.is_empty() {
                debug!("{}: empty segment, level skipped", file.relative.display());
                continue;
            }
            match tree.insert_directory(level, segment) {
                Placement::Created(id) | Placement::Reused(id) => level = id,
                conflict => return Ok(Some(conflict)),
            }
        }

        Ok(Some(tree.insert_leaf(level, name, &file.relative)))
    }
}

/// `.` and `..` would leave the directory they are joined to.
fn is_relative_step(segment: &str) -> bool {
    segment == "." || segment == ".."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawTags;
    use crate::prompt::{FixedPrompt, ScriptedPrompt};
    use crate::template::{TemplateCache, TemplateProgram};
    use std::path::PathBuf;

    fn raw(pairs: &[(&str, &str)]) -> RawTags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
            .collect()
    }

    fn file(relative: &str, pairs: &[(&str, &str)]) -> AudioFile {
        AudioFile::new(format!("/music/{relative}"), relative, raw(pairs))
    }

    fn compile(segments: &[&str]) -> CompiledProgram {
        TemplateProgram::new(segments.iter().copied())
            .compile(&mut TemplateCache::new())
            .unwrap()
    }

    const PROGRAM: [&str; 3] = [":albumartist:", ":year: - :album:", ":tracknumber: :title:.:format:"];

    fn album_track(relative: &str, number: &str, title: &str) -> AudioFile {
        file(
            relative,
            &[
                ("albumartist", "A"),
                ("date", "2001"),
                ("album", "B"),
                ("tracknumber", number),
                ("totaltracks", "2"),
                ("title", title),
            ],
        )
    }

    #[test]
    fn test_two_tracks_share_one_chain() {
        let resolver = TagResolver::new();
        let program = compile(&PROGRAM);
        let files = vec![
            album_track("b/1.mp3", "1", "X"),
            album_track("b/2.mp3", "2", "Y"),
        ];
        let mut prompt = ScriptedPrompt::default();
        let mut ctx = PromptContext::new(&mut prompt);

        let (tree, stats) = TreeBuilder::new(&resolver, &program)
            .build(&files, "/out", &mut ctx)
            .unwrap();

        assert_eq!(tree.width_at(1), 1);
        assert_eq!(tree.width_at(2), 1);
        let a = tree.child(tree.root(), "A").unwrap();
        let album = tree.child(a, "2001 - B").unwrap();
        let names: Vec<_> = tree
            .node(album)
            .children()
            .iter()
            .map(|&id| tree.node(id).segment().to_string())
            .collect();
        assert_eq!(names, vec!["1 X.mp3", "2 Y.mp3"]);

        let mapping = tree.mappings().next().unwrap();
        assert_eq!(mapping.source, PathBuf::from("b/1.mp3"));
        assert_eq!(mapping.destination, PathBuf::from("A/2001 - B/1 X.mp3"));

        assert_eq!(stats.leaves_created, 2);
        assert_eq!(stats.prompts_issued, 0);
    }

    #[test]
    fn test_width_never_exceeds_distinct_values() {
        let resolver = TagResolver::new();
        let program = compile(&PROGRAM);
        let mut files = Vec::new();
        for (artist, album) in [("A", "B"), ("A", "C"), ("D", "B"), ("A", "B")] {
            for n in 1..=3 {
                files.push(file(
                    &format!("{artist}/{album}/{n}.flac"),
                    &[
                        ("albumartist", artist),
                        ("date", "1990"),
                        ("album", album),
                        ("tracknumber", &n.to_string()),
                        ("totaltracks", "3"),
                        ("title", &format!("{artist}{album}{n}")),
                    ],
                ));
            }
        }
        let mut prompt = ScriptedPrompt::default();
        let mut ctx = PromptContext::new(&mut prompt);

        let (tree, stats) = TreeBuilder::new(&resolver, &program)
            .build(&files, "/out", &mut ctx)
            .unwrap();

        assert_eq!(tree.width_at(1), 2);
        assert_eq!(tree.width_at(2), 3);
        assert_eq!(stats.leaves_created, 9);
        assert_eq!(stats.duplicates, 3);
    }

    #[test]
    fn test_album_cache_reused_across_files() {
        let resolver = TagResolver::new();
        let program = compile(&[":album: {:label:}", ":title:.:format:"]);
        let files = vec![
            file("x/1.mp3", &[("album", "X"), ("title", "One")]),
            file("x/2.mp3", &[("album", "X"), ("title", "Two")]),
        ];
        let mut prompt = ScriptedPrompt::new(["Blue Note"]);
        let mut ctx = PromptContext::new(&mut prompt);

        let (tree, stats) = TreeBuilder::new(&resolver, &program)
            .build(&files, "/out", &mut ctx)
            .unwrap();
        drop(ctx);

        assert_eq!(stats.prompts_issued, 1);
        assert_eq!(prompt.request_count(), 1);
        let dir = tree.child(tree.root(), "X {Blue Note}").unwrap();
        assert_eq!(tree.node(dir).children().len(), 2);
    }

    #[test]
    fn test_empty_directory_segment_is_skipped() {
        let resolver = TagResolver::new();
        let program = compile(&[
            ":album:",
            "?disctotal!=1?\"Disc :discnumber:\"",
            ":title:.:format:",
        ]);
        let files = vec![file(
            "s/1.ogg",
            &[("album", "Single"), ("discnumber", "1/1"), ("title", "T")],
        )];
        let mut prompt = ScriptedPrompt::default();
        let mut ctx = PromptContext::new(&mut prompt);

        let (tree, _) = TreeBuilder::new(&resolver, &program)
            .build(&files, "/out", &mut ctx)
            .unwrap();

        let mapping = tree.mappings().next().unwrap();
        assert_eq!(mapping.destination, PathBuf::from("Single/T.ogg"));
    }

    #[test]
    fn test_empty_file_name_is_not_placed() {
        let resolver = TagResolver::new();
        let program = compile(&[":album:", ":title?:"]);
        let files = vec![file("a.mp3", &[("album", "Z")])];
        let mut prompt = FixedPrompt::new("unused");
        let mut ctx = PromptContext::new(&mut prompt);

        let (tree, stats) = TreeBuilder::new(&resolver, &program)
            .build(&files, "/out", &mut ctx)
            .unwrap();

        assert_eq!(tree.leaf_count(), 0);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.files_seen, 1);
    }

    #[test]
    fn test_dot_segments_are_not_placed() {
        let resolver = TagResolver::new();
        let program = compile(&[":albumartist:", ":title:.:format:"]);
        let files = vec![
            file("a/x.mp3", &[("albumartist", ".."), ("title", "x")]),
            file("b/y.mp3", &[("albumartist", "."), ("title", "y")]),
            file("c/z.mp3", &[("albumartist", "..."), ("title", "z")]),
        ];
        let mut prompt = ScriptedPrompt::default();
        let mut ctx = PromptContext::new(&mut prompt);

        let (tree, stats) = TreeBuilder::new(&resolver, &program)
            .build(&files, "/out", &mut ctx)
            .unwrap();

        assert_eq!(stats.skipped, 2);
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.child(tree.root(), ".."), None);
        let mapping = tree.mappings().next().unwrap();
        assert_eq!(mapping.destination, PathBuf::from(".../z.mp3"));
    }

    #[test]
    fn test_prompt_failure_aborts_build() {
        let resolver = TagResolver::new();
        let program = compile(&[":title:"]);
        let files = vec![file("a.mp3", &[])];
        let mut prompt = ScriptedPrompt::default();
        let mut ctx = PromptContext::new(&mut prompt);

        let result = TreeBuilder::new(&resolver, &program).build(&files, "/out", &mut ctx);
        assert!(result.is_err());
    }
}
