//! Destination tree: the merged, deduplicated plan of where every file goes.
//!
//! Nodes live in an arena owned by [`DestinationTree`] and are addressed by
//! [`NodeId`]. Children are owned through their parent's child list; the
//! parent link on each node is a plain index used to rebuild paths.
//!
//! ```text
//! /music/out                  (root: destination directory)
//! └── A                       directory
//!     └── 2001 - B            directory
//!         ├── 1 X.mp3         leaf  a/one.mp3 -> A/2001 - B/1 X.mp3
//!         └── 2 Y.mp3         leaf  a/two.mp3 -> A/2001 - B/2 Y.mp3
//! ```

pub mod builder;

pub use builder::{BuildStats, TreeBuilder};

use serde::Serialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Nodes
// =============================================================================

/// Index of a node inside its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

/// One source -> destination copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMapping {
    /// Source path relative to the scan root.
    pub source: PathBuf,
    /// Destination path relative to the tree root.
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Directory { children: Vec<NodeId> },
    Leaf(FileMapping),
}

#[derive(Debug, Clone)]
pub struct Node {
    segment: String,
    parent: Option<NodeId>,
    depth: usize,
    kind: NodeKind,
}

impl Node {
    /// Rendered path segment (the destination directory for the root).
    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Distance from the root; the root is at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn mapping(&self) -> Option<&FileMapping> {
        match &self.kind {
            NodeKind::Leaf(mapping) => Some(mapping),
            NodeKind::Directory { .. } => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Directory { children } => children,
            NodeKind::Leaf(_) => &[],
        }
    }
}

/// Result of placing a segment under a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A new node was created.
    Created(NodeId),
    /// An existing directory with the same segment was reused.
    Reused(NodeId),
    /// A leaf with the same segment already exists; nothing was added.
    Duplicate(NodeId),
    /// A sibling of the other kind holds this segment; nothing was added.
    Conflict(NodeId),
}

impl Placement {
    pub fn id(&self) -> NodeId {
        match *self {
            Placement::Created(id)
            | Placement::Reused(id)
            | Placement::Duplicate(id)
            | Placement::Conflict(id) => id,
        }
    }
}

// =============================================================================
// Tree
// =============================================================================

#[derive(Debug, Clone)]
pub struct DestinationTree {
    nodes: Vec<Node>,
}

impl DestinationTree {
    /// Empty tree whose root stands for `destination`.
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                segment: destination.into(),
                parent: None,
                depth: 0,
                kind: NodeKind::Directory {
                    children: Vec::new(),
                },
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Destination directory the tree is rooted at.
    pub fn destination(&self) -> &str {
        &self.nodes[0].segment
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Child of `parent` with exactly this segment.
    pub fn child(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        self.node(parent)
            .children()
            .iter()
            .copied()
            .find(|&id| self.node(id).segment == segment)
    }

    /// Find or create the directory `segment` under `parent`.
    pub fn insert_directory(&mut self, parent: NodeId, segment: &str) -> Placement {
        match self.child(parent, segment) {
            Some(id) if self.node(id).is_leaf() => Placement::Conflict(id),
            Some(id) => Placement::Reused(id),
            None => Placement::Created(self.push(
                parent,
                segment.to_string(),
                NodeKind::Directory {
                    children: Vec::new(),
                },
            )),
        }
    }

    /// Add a leaf copying `source` to `segment` under `parent`.
    ///
    /// The first file placed at a path keeps it.
    pub fn insert_leaf(
        &mut self,
        parent: NodeId,
        segment: &str,
        source: impl Into<PathBuf>,
    ) -> Placement {
        match self.child(parent, segment) {
            Some(id) if self.node(id).is_leaf() => Placement::Duplicate(id),
            Some(id) => Placement::Conflict(id),
            None => {
                let destination = self.path_of(parent).join(segment);
                let mapping = FileMapping {
                    source: source.into(),
                    destination,
                };
                Placement::Created(self.push(parent, segment.to_string(), NodeKind::Leaf(mapping)))
            }
        }
    }

    fn push(&mut self, parent: NodeId, segment: String, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = self.node(parent).depth + 1;
        self.nodes.push(Node {
            segment,
            parent: Some(parent),
            depth,
            kind,
        });
        if let NodeKind::Directory { children } = &mut self.nodes[parent.0].kind {
            children.push(id);
        }
        id
    }

    /// Path of `id` relative to the root, rebuilt from parent links.
    pub fn path_of(&self, id: NodeId) -> PathBuf {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if node.parent.is_none() {
                break;
            }
            segments.push(node.segment.as_str());
            current = node.parent;
        }
        segments.iter().rev().collect()
    }

    /// Absolute path of `id`: the destination joined with [`path_of`](Self::path_of).
    pub fn full_path_of(&self, id: NodeId) -> PathBuf {
        Path::new(self.destination()).join(self.path_of(id))
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing has been placed under the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn directory_count(&self) -> usize {
        self.nodes.len() - self.leaf_count()
    }

    /// Number of nodes at `depth`.
    pub fn width_at(&self, depth: usize) -> usize {
        self.nodes.iter().filter(|n| n.depth == depth).count()
    }

    /// Depth-first walk: each node, then its leaves, then its directories.
    pub fn iter(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: vec![self.root()],
        }
    }

    /// Every file mapping, in depth-first order.
    pub fn mappings(&self) -> impl Iterator<Item = &FileMapping> {
        self.iter().filter_map(|(_, node)| node.mapping())
    }
}

/// Iterator returned by [`DestinationTree::iter`].
pub struct DepthFirst<'t> {
    tree: &'t DestinationTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for DepthFirst<'t> {
    type Item = (NodeId, &'t Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);

        let children = node.children();
        let (leaves, directories): (Vec<NodeId>, Vec<NodeId>) = children
            .iter()
            .copied()
            .partition(|&child| self.tree.node(child).is_leaf());

        // popped in reverse: leaves first, then directories, each in insertion order
        self.stack.extend(directories.into_iter().rev());
        self.stack.extend(leaves.into_iter().rev());

        Some((id, node))
    }
}
