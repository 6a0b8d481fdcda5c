//! Template rendering against one file's tags.

use std::path::Path;

use super::ast::{Template, TemplateNode};
use super::sanitize::sanitize;
use crate::error::PromptResult;
use crate::models::TagSet;
use crate::prompt::PromptContext;

/// Render a template to a raw string.
///
/// Required tags missing from `tags` are requested through `ctx` and
/// written back into `tags`, so later segments of the same file reuse them.
/// Optional missing tags emit nothing and trim trailing whitespace from
/// what the segment has produced so far.
pub fn render(
    template: &Template,
    tags: &mut TagSet,
    path: &Path,
    ctx: &mut PromptContext<'_>,
) -> PromptResult<String> {
    let mut out = String::new();
    render_nodes(&template.nodes, tags, path, ctx, &mut out)?;
    Ok(out)
}

/// Render and sanitize one path segment. An empty result means the
/// segment contributes no tree level.
pub fn render_segment(
    template: &Template,
    tags: &mut TagSet,
    path: &Path,
    ctx: &mut PromptContext<'_>,
) -> PromptResult<String> {
    render(template, tags, path, ctx).map(|raw| sanitize(&raw))
}

fn render_nodes(
    nodes: &[TemplateNode],
    tags: &mut TagSet,
    path: &Path,
    ctx: &mut PromptContext<'_>,
    out: &mut String,
) -> PromptResult<()> {
    for node in nodes {
        match node {
            TemplateNode::Literal { text } => out.push_str(text),

            TemplateNode::TagRef { name, required } => {
                if let Some(value) = tags.get(name) {
                    out.push_str(value);
                } else if *required {
                    let value = ctx.request(tags, name, path)?;
                    out.push_str(&value);
                    tags.set(name.clone(), value);
                } else {
                    let kept = out.trim_end().len();
                    out.truncate(kept);
                }
            }

            TemplateNode::Conditional { condition, body } => {
                if condition.evaluate(tags) {
                    render_nodes(body, tags, path, ctx, out)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;
    use crate::template::parser::parse;

    fn tags(pairs: &[(&str, &str)]) -> TagSet {
        pairs.iter().copied().collect()
    }

    fn render_str(template: &str, tags: &mut TagSet, prompt: &mut ScriptedPrompt) -> String {
        let template = parse(template).unwrap();
        let mut ctx = PromptContext::new(prompt);
        render(&template, tags, Path::new("/m/a.mp3"), &mut ctx).unwrap()
    }

    #[test]
    fn test_required_tag_prompts_once() {
        let mut prompt = ScriptedPrompt::new(["Typed Title"]);
        let mut t = tags(&[("tracknumber", "01")]);

        let out = render_str(":tracknumber: :title:", &mut t, &mut prompt);

        assert_eq!(out, "01 Typed Title");
        assert_eq!(prompt.request_count(), 1);
        assert_eq!(t.get("title"), Some("Typed Title"));
    }

    #[test]
    fn test_optional_tag_never_prompts_and_trims() {
        let mut prompt = ScriptedPrompt::default();
        let mut t = tags(&[("tracknumber", "01")]);

        let out = render_str(":tracknumber: :title?:", &mut t, &mut prompt);

        assert_eq!(out, "01");
        assert_eq!(prompt.request_count(), 0);
    }

    #[test]
    fn test_filled_value_is_reused_across_segments() {
        let mut prompt = ScriptedPrompt::new(["X"]);
        let mut t = TagSet::new();
        let first = parse(":title:").unwrap();
        let second = parse(":title:.mp3").unwrap();

        let mut ctx = PromptContext::new(&mut prompt);
        let path = Path::new("a.mp3");
        assert_eq!(render(&first, &mut t, path, &mut ctx).unwrap(), "X");
        assert_eq!(render(&second, &mut t, path, &mut ctx).unwrap(), "X.mp3");
        assert_eq!(ctx.prompts_issued(), 1);
    }

    #[test]
    fn test_disc_conditional() {
        let template = "?disctotal!=1?\"Disc :discnumber:\"";
        let mut prompt = ScriptedPrompt::default();

        let mut single = tags(&[("disctotal", "1")]);
        assert_eq!(render_str(template, &mut single, &mut prompt), "");

        let mut double = tags(&[("disctotal", "2"), ("discnumber", "1")]);
        assert_eq!(render_str(template, &mut double, &mut prompt), "Disc 1");
        assert_eq!(prompt.request_count(), 0);
    }

    #[test]
    fn test_label_catalog_block() {
        let template =
            ":year: - :album: [:FORMAT:]?label|catalogno?\" {:label?:?label?\" \":catalogno?:}\"";
        let mut prompt = ScriptedPrompt::default();
        let base = [("year", "1957"), ("album", "Blue Train"), ("FORMAT", "FLAC")];

        let mut both = tags(&base);
        both.set("label", "Blue Note");
        both.set("catalogno", "BLP 1577");
        assert_eq!(
            render_str(template, &mut both, &mut prompt),
            "1957 - Blue Train [FLAC] {Blue Note BLP 1577}"
        );

        let mut label_only = tags(&base);
        label_only.set("label", "Blue Note");
        assert_eq!(
            render_str(template, &mut label_only, &mut prompt),
            "1957 - Blue Train [FLAC] {Blue Note}"
        );

        let mut catalog_only = tags(&base);
        catalog_only.set("catalogno", "BLP 1577");
        assert_eq!(
            render_str(template, &mut catalog_only, &mut prompt),
            "1957 - Blue Train [FLAC] {BLP 1577}"
        );

        let mut neither = tags(&base);
        assert_eq!(
            render_str(template, &mut neither, &mut prompt),
            "1957 - Blue Train [FLAC]"
        );
    }

    #[test]
    fn test_render_segment_sanitizes() {
        let template = parse(":albumartist:").unwrap();
        let mut t = tags(&[("albumartist", "AC/DC \"Live\"")]);
        let mut prompt = ScriptedPrompt::default();
        let mut ctx = PromptContext::new(&mut prompt);

        let segment = render_segment(&template, &mut t, Path::new("a.mp3"), &mut ctx).unwrap();
        assert_eq!(segment, "AC-DC 'Live'");
    }
}
