//! Plain-text dry-run view of a destination tree.

use std::io::Write;

use crate::error::EmitResult;
use crate::tree::{DestinationTree, NodeId, NodeKind};

const INDENT: &str = "    ";

/// Print one line per node in insertion order, indented four spaces per
/// level.
///
/// Directories show their segment, files show
/// `"source"  ->  "full destination"`.
pub fn print_layout<W: Write>(tree: &DestinationTree, out: &mut W) -> EmitResult<()> {
    print_node(tree, tree.root(), out)?;
    out.flush()?;
    Ok(())
}

fn print_node<W: Write>(tree: &DestinationTree, id: NodeId, out: &mut W) -> EmitResult<()> {
    let node = tree.node(id);
    let indent = INDENT.repeat(node.depth());
    match node.kind() {
        NodeKind::Directory { .. } => {
            writeln!(out, "{indent}{}", node.segment())?;
            for &child in node.children() {
                print_node(tree, child, out)?;
            }
        }
        NodeKind::Leaf(mapping) => writeln!(
            out,
            "{indent}\"{}\"  ->  \"{}\"",
            mapping.source.display(),
            tree.full_path_of(id).display()
        )?,
    }
    Ok(())
}
