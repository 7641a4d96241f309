//! The hierarchical project model built from dotted passage names
//!
//! Nodes live in an arena owned by [`ProjectTree`] and refer to each other by
//! [`NodeId`]. Each node knows its parent so depth and full names can be
//! computed by walking up; children are kept in first-seen order.
//!
//! [`ProjectTree`]: struct.ProjectTree.html
//! [`NodeId`]: type.NodeId.html
use crate::filter::PassageMap;
use crate::passage::{split_name, Passage, NAME_PATH_DELIMITER};
use serde::Deserialize;
use std::fmt;

/// Index of a node within its [`ProjectTree`](struct.ProjectTree.html)
pub type NodeId = usize;

fn default_submodule_height() -> usize {
    3
}

fn default_extension() -> String {
    "tw2".to_string()
}

fn default_includes_file() -> String {
    "includes.txt".to_string()
}

/// Controls how a project tree is laid out on disk
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Layout {
    /// The minimum height of a second-level node for it to become a
    /// submodule directory
    #[serde(default = "default_submodule_height")]
    pub submodule_height: usize,

    /// Extension of passage content files, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// File name of the includes manifest in each directory
    #[serde(default = "default_includes_file")]
    pub includes_file: String,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            submodule_height: default_submodule_height(),
            extension: default_extension(),
            includes_file: default_includes_file(),
        }
    }
}

#[derive(Debug)]
struct Node {
    fragment: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    passage: Option<Passage>,
}

impl Node {
    fn new(fragment: Option<String>, parent: Option<NodeId>) -> Self {
        Node {
            fragment,
            parent,
            children: Vec::new(),
            passage: None,
        }
    }
}

/// A namespace tree of passages
///
/// The root has no name fragment. Its children are modules, and every other
/// node's role (submodule, file, or part of a file) is derived from where it
/// sits in the tree.
#[derive(Debug)]
pub struct ProjectTree {
    nodes: Vec<Node>,
    submodule_height: usize,
}

impl Default for ProjectTree {
    fn default() -> Self {
        ProjectTree::new(default_submodule_height())
    }
}

impl ProjectTree {
    /// Creates a tree holding only the root
    pub fn new(submodule_height: usize) -> Self {
        ProjectTree {
            nodes: vec![Node::new(None, None)],
            submodule_height,
        }
    }

    /// Builds a tree from passages keyed by their full names
    pub fn from_passages(passages: PassageMap, layout: &Layout) -> Self {
        let mut tree = ProjectTree::new(layout.submodule_height);
        let root = tree.root();
        for (name, passage) in passages {
            tree.add_passage(root, passage, &name);
        }
        tracing::debug!(nodes = tree.nodes.len(), "built project tree");
        tree
    }

    pub fn root(&self) -> NodeId {
        0
    }

    // Structure

    /// The name fragment of a node. `None` only for the root
    pub fn fragment(&self, id: NodeId) -> Option<&str> {
        self.nodes[id].fragment.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn passage(&self, id: NodeId) -> Option<&Passage> {
        self.nodes[id].passage.as_ref()
    }

    /// Finds the child of a node with the given name fragment
    pub fn child(&self, id: NodeId, fragment: &str) -> Option<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .find(|&child| self.fragment(child) == Some(fragment))
    }

    /// Finds the node for a dotted name, starting below the root
    pub fn find(&self, name: &str) -> Option<NodeId> {
        name.split(NAME_PATH_DELIMITER)
            .try_fold(self.root(), |id, fragment| self.child(id, fragment))
    }

    /// The dot-joined name fragments from the root down to the node
    pub fn full_name(&self, id: NodeId) -> Option<String> {
        let mut fragments = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(fragment) = self.fragment(node) {
                fragments.push(fragment);
            }
            current = self.parent(node);
        }
        if fragments.is_empty() {
            return None;
        }
        fragments.reverse();
        Some(fragments.join(NAME_PATH_DELIMITER.to_string().as_str()))
    }

    /// Distance from the root, which has depth 0
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Longest distance down to a leaf, which has height 0
    pub fn height(&self, id: NodeId) -> usize {
        self.children(id)
            .iter()
            .map(|&child| 1 + self.height(child))
            .max()
            .unwrap_or(0)
    }

    // Insertion

    /// Returns the child with the given fragment, creating it if needed
    ///
    /// With `overwrite` set, an existing child is replaced by a fresh empty
    /// node in the same position.
    pub fn add_child(&mut self, id: NodeId, fragment: &str, overwrite: bool) -> NodeId {
        let existing = self.child(id, fragment);
        if let (Some(child), false) = (existing, overwrite) {
            return child;
        }

        let child = self.nodes.len();
        self.nodes.push(Node::new(Some(fragment.to_string()), Some(id)));
        let children = &mut self.nodes[id].children;
        match existing.and_then(|old| children.iter().position(|&c| c == old)) {
            Some(pos) => children[pos] = child,
            None => children.push(child),
        }
        child
    }

    /// Files a passage under the given node, following its dotted name and
    /// creating intermediate nodes as needed
    ///
    /// Returns the node the passage was attached to
    pub fn add_passage(&mut self, id: NodeId, passage: Passage, name: &str) -> NodeId {
        let mut current = id;
        let mut rest = name;
        loop {
            let (fragment, remainder) = split_name(rest);
            current = self.add_child(current, fragment, false);
            if remainder.is_empty() {
                self.nodes[current].passage = Some(passage);
                return current;
            }
            rest = remainder;
        }
    }

    // Classification

    pub fn is_root(&self, id: NodeId) -> bool {
        self.parent(id).is_none()
    }

    /// Modules are the direct children of the root
    pub fn is_module(&self, id: NodeId) -> bool {
        self.depth(id) == 1
    }

    /// A second-level node whose subtree is deep enough to get a directory
    pub fn is_submodule(&self, id: NodeId) -> bool {
        self.depth(id) == 2 && self.height(id) >= self.submodule_height
    }

    /// True if the node is written out as a passage content file
    pub fn is_file(&self, id: NodeId) -> bool {
        let parent = match self.parent(id) {
            Some(parent) => parent,
            None => return false,
        };
        if self.is_submodule(parent) {
            return true;
        }
        if self.is_module(parent) {
            return self.passage(id).is_some() || !self.is_submodule(id);
        }
        false
    }

    /// True if the node is a directory with an includes manifest
    pub fn has_includes(&self, id: NodeId) -> bool {
        self.is_root(id) || self.is_module(id) || self.is_submodule(id)
    }

    // Contents

    /// Names of the children that are directories
    pub fn directories(&self, id: NodeId) -> Vec<&str> {
        self.children(id)
            .iter()
            .filter(|&&child| self.is_module(child) || self.is_submodule(child))
            .filter_map(|&child| self.fragment(child))
            .collect()
    }

    /// Names of the children that are files
    pub fn files(&self, id: NodeId) -> Vec<&str> {
        self.children(id)
            .iter()
            .filter(|&&child| self.is_file(child))
            .filter_map(|&child| self.fragment(child))
            .collect()
    }

    /// Lines of the node's includes manifest: directories with a trailing
    /// slash, then files
    pub fn includes(&self, id: NodeId) -> Vec<String> {
        let mut includes: Vec<String> = self
            .directories(id)
            .into_iter()
            .map(|dir| format!("{}/", dir))
            .collect();
        includes.extend(self.files(id).into_iter().map(str::to_string));
        includes
    }

    /// Nodes whose passages make up the node's content file, in tree order
    ///
    /// A submodule with its own passage contributes only that passage; its
    /// descendants are written inside its directory.
    pub fn passage_nodes(&self, id: NodeId) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        if self.passage(id).is_some() {
            nodes.push(id);
            if self.is_submodule(id) {
                return nodes;
            }
        }
        for &child in self.children(id) {
            nodes.extend(self.passage_nodes(child));
        }
        nodes
    }

    /// The passages that make up the node's content file, in tree order
    pub fn passages(&self, id: NodeId) -> Vec<&Passage> {
        self.passage_nodes(id)
            .into_iter()
            .filter_map(|node| self.passage(node))
            .collect()
    }

    /// Iterates over every node reachable from the root, parents first
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root()];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev().copied());
            Some(id)
        })
    }

    // Debugging

    fn fmt_node(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fragment) = self.fragment(id) {
            let indentation = "  ".repeat(self.depth(id) - 1);
            write!(f, "{}{}", indentation, fragment)?;
            if self.is_module(id) {
                write!(f, " (module)")?;
            }
            if self.is_submodule(id) {
                write!(f, " (submodule)")?;
            }
            if self.is_file(id) {
                write!(f, " (file)")?;
            }
            if self.passage(id).is_some() {
                write!(f, " (passage)")?;
            }
            if !self.children(id).is_empty() {
                write!(f, ":")?;
            }
            writeln!(f)?;
        }
        for &child in self.children(id) {
            self.fmt_node(child, f)?;
        }
        Ok(())
    }
}

/// Prints the tree as an indented outline, marking each node's role
impl fmt::Display for ProjectTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root(), f)
    }
}
