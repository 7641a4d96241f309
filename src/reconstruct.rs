//! Turns a project tree into directories, includes manifests, and passage
//! content files
//!
//! [`plan`] decides every write without touching the disk, and [`apply`]
//! carries the plan out under an output root. Applying the same plan twice
//! leaves the same files behind.
//!
//! [`plan`]: fn.plan.html
//! [`apply`]: fn.apply.html
use crate::error::{Error, Result};
use crate::issue::{Warning, WarningKind};
use crate::project::{Layout, NodeId, ProjectTree};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One filesystem write, relative to the output root
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlannedWrite {
    /// Create the directory and any missing parents
    Directory(PathBuf),

    /// Create or overwrite the file
    File { path: PathBuf, contents: String },
}

impl PlannedWrite {
    pub fn path(&self) -> &Path {
        match self {
            PlannedWrite::Directory(path) => path,
            PlannedWrite::File { path, .. } => path,
        }
    }
}

/// The writes that reconstruct a tree, in order
#[derive(Debug, Default)]
pub struct Plan {
    pub writes: Vec<PlannedWrite>,

    /// Passages in the tree that none of the writes include
    pub warnings: Vec<Warning>,
}

impl Plan {
    /// Finds the contents of the file at the given relative path
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.writes.iter().find_map(|write| match write {
            PlannedWrite::File { path: p, contents } if p == path.as_ref() => {
                Some(contents.as_str())
            }
            _ => None,
        })
    }
}

struct Planner<'a> {
    tree: &'a ProjectTree,
    layout: &'a Layout,
    writes: Vec<PlannedWrite>,
    written: HashSet<NodeId>,
}

impl<'a> Planner<'a> {
    fn visit(&mut self, id: NodeId, dir: &Path) {
        let tree = self.tree;
        if tree.has_includes(id) {
            self.writes.push(PlannedWrite::Directory(dir.to_path_buf()));
            self.write_includes(id, dir);
        }
        // A submodule's own content file is written by its parent
        if tree.is_file(id) && !tree.is_submodule(id) {
            self.write_passages(id, dir);
        }
        for &child in tree.children(id) {
            let fragment = match tree.fragment(child) {
                Some(fragment) => fragment,
                None => continue,
            };
            if tree.is_module(child) || tree.is_submodule(child) {
                self.visit(child, &dir.join(fragment));
                if tree.is_submodule(child) && tree.is_file(child) {
                    self.write_passages(child, dir);
                }
            } else if tree.is_file(child) {
                self.visit(child, dir);
            }
        }
    }

    fn write_includes(&mut self, id: NodeId, dir: &Path) {
        let contents: String = self
            .tree
            .includes(id)
            .into_iter()
            .map(|line| line + "\n")
            .collect();
        self.writes.push(PlannedWrite::File {
            path: dir.join(&self.layout.includes_file),
            contents,
        });
    }

    fn write_passages(&mut self, id: NodeId, dir: &Path) {
        let tree = self.tree;
        let fragment = match tree.fragment(id) {
            Some(fragment) => fragment,
            None => return,
        };
        let nodes = tree.passage_nodes(id);
        let contents: String = nodes
            .iter()
            .filter_map(|&node| tree.passage(node))
            .map(|passage| format!("{}\n", passage))
            .collect();
        self.written.extend(nodes);
        self.writes.push(PlannedWrite::File {
            path: dir.join(format!("{}.{}", fragment, self.layout.extension)),
            contents,
        });
    }
}

/// Decides the writes that lay the tree out on disk
///
/// Directories get an includes manifest listing their child directories, then
/// their child files. Each file node gets a content file holding its passages.
pub fn plan(tree: &ProjectTree, layout: &Layout) -> Plan {
    let mut planner = Planner {
        tree,
        layout,
        writes: Vec::new(),
        written: HashSet::new(),
    };
    planner.visit(tree.root(), Path::new(""));

    let warnings = tree
        .iter()
        .filter(|id| tree.passage(*id).is_some() && !planner.written.contains(id))
        .filter_map(|id| tree.full_name(id))
        .map(|name| Warning::new(WarningKind::UnwrittenPassage(name)))
        .collect();

    tracing::debug!(writes = planner.writes.len(), "planned reconstruction");
    Plan {
        writes: planner.writes,
        warnings,
    }
}

/// Carries out the planned writes under the output root
///
/// Existing directories are reused and existing files are overwritten. The
/// first failure stops the run and leaves earlier writes in place.
pub fn apply(writes: &[PlannedWrite], root: &Path) -> Result<()> {
    for write in writes {
        let path = root.join(write.path());
        let res = match write {
            PlannedWrite::Directory(_) => std::fs::create_dir_all(&path),
            PlannedWrite::File { contents, .. } => std::fs::write(&path, contents),
        };
        res.map_err(|source| Error::Filesystem {
            path: path.clone(),
            source,
        })?;
        tracing::trace!(path = %path.display(), "wrote");
    }
    tracing::info!(writes = writes.len(), root = %root.display(), "reconstructed project");
    Ok(())
}
