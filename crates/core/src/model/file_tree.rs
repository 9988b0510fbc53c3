//! Deduplicated tree of every file the project document references.
//!
//! Nodes live in a `petgraph` arena and are addressed by [`FileNodeId`];
//! parent links are stored on the node, child links as graph edges. Requesting
//! the same path twice yields the same id, so identity comparison is an
//! integer comparison.

use crate::error::{GenerationError, Result};
use crate::generator::classify::RootLocation;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use xcbridge_api::SourceTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileNodeId(NodeIndex);

impl FileNodeId {
    pub fn index(&self) -> usize {
        self.0.index()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileNodeKind {
    Group,
    Reference,
}

#[derive(Debug, Clone)]
pub struct FileNode {
    /// Path segment relative to the parent (the whole offset for the root).
    pub name: Option<String>,
    pub kind: FileNodeKind,
    pub source_tree: SourceTree,
    pub parent: Option<FileNodeId>,
}

#[derive(Debug, Clone)]
pub struct FileTree {
    graph: DiGraph<FileNode, ()>,
    root: NodeIndex,
    /// (parent, source tree, segment) -> child
    children: HashMap<(NodeIndex, SourceTree, String), NodeIndex>,
    /// normalized path -> (origin, leaf)
    references: HashMap<String, (SourceTree, NodeIndex)>,
}

impl FileTree {
    pub fn new(root: RootLocation) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(FileNode {
            name: root.path,
            kind: FileNodeKind::Group,
            source_tree: root.source_tree,
            parent: None,
        });
        Self {
            graph,
            root,
            children: HashMap::new(),
            references: HashMap::new(),
        }
    }

    pub fn root(&self) -> FileNodeId {
        FileNodeId(self.root)
    }

    pub fn node(&self, id: FileNodeId) -> &FileNode {
        &self.graph[id.0]
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// True until the first file reference is created.
    pub fn has_no_references(&self) -> bool {
        self.references.is_empty()
    }

    /// Returns the reference for `path`, creating it and any missing
    /// intermediate groups.
    ///
    /// Top-level groups carry `origin`; deeper nodes are relative to their
    /// parent. A path already registered under a different origin, or one
    /// that collides with an existing group/reference, is a conflict.
    pub fn get_or_create(&mut self, origin: SourceTree, path: &str) -> Result<FileNodeId> {
        let normalized = normalize(path);

        if let Some(&(existing, idx)) = self.references.get(&normalized) {
            if existing != origin {
                return Err(GenerationError::FileReferenceConflict {
                    path: normalized,
                    existing,
                    requested: origin,
                });
            }
            return Ok(FileNodeId(idx));
        }

        let conflict = |existing| GenerationError::FileReferenceConflict {
            path: normalized.clone(),
            existing,
            requested: origin,
        };

        let mut segments = segments(&normalized, origin);
        let Some(leaf_name) = segments.pop() else {
            return Err(conflict(self.graph[self.root].source_tree));
        };

        let mut parent = self.root;
        for segment in segments {
            parent = self.child_or_insert(parent, origin, segment, FileNodeKind::Group);
            if self.graph[parent].kind != FileNodeKind::Group {
                return Err(conflict(self.origin_of(parent)));
            }
        }

        let leaf = self.child_or_insert(parent, origin, leaf_name, FileNodeKind::Reference);
        if self.graph[leaf].kind != FileNodeKind::Reference {
            return Err(conflict(self.origin_of(leaf)));
        }

        self.references.insert(normalized, (origin, leaf));
        Ok(FileNodeId(leaf))
    }

    pub fn find_reference(&self, path: &str) -> Option<FileNodeId> {
        self.references
            .get(&normalize(path))
            .map(|&(_, idx)| FileNodeId(idx))
    }

    /// Children in name order.
    pub fn children(&self, id: FileNodeId) -> Vec<FileNodeId> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(id.0, Direction::Outgoing)
            .collect();
        children.sort_by(|a, b| self.graph[*a].name.cmp(&self.graph[*b].name));
        children.into_iter().map(FileNodeId).collect()
    }

    /// Path of a node below the root, segments joined with `/`.
    pub fn path_of(&self, id: FileNodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id.0);
        while let Some(idx) = current {
            if idx == self.root {
                break;
            }
            let node = &self.graph[idx];
            if let Some(name) = &node.name {
                parts.push(name.as_str());
            }
            current = node.parent.map(|p| p.0);
        }
        parts.reverse();
        parts.join("/")
    }

    /// Source tree of the top-level group a node hangs from.
    pub fn origin_of_node(&self, id: FileNodeId) -> SourceTree {
        self.origin_of(id.0)
    }

    /// All references, ordered by path.
    pub fn references(&self) -> Vec<(String, FileNodeId)> {
        let mut refs: Vec<_> = self
            .references
            .iter()
            .map(|(path, &(_, idx))| (path.clone(), FileNodeId(idx)))
            .collect();
        refs.sort();
        refs
    }

    fn origin_of(&self, mut idx: NodeIndex) -> SourceTree {
        while let Some(parent) = self.graph[idx].parent {
            if parent.0 == self.root {
                break;
            }
            idx = parent.0;
        }
        self.graph[idx].source_tree
    }

    fn child_or_insert(
        &mut self,
        parent: NodeIndex,
        origin: SourceTree,
        name: String,
        kind: FileNodeKind,
    ) -> NodeIndex {
        let source_tree = if parent == self.root {
            origin
        } else {
            SourceTree::Group
        };
        let key = (parent, source_tree, name);
        if let Some(&existing) = self.children.get(&key) {
            return existing;
        }

        let idx = self.graph.add_node(FileNode {
            name: Some(key.2.clone()),
            kind,
            source_tree,
            parent: Some(FileNodeId(parent)),
        });
        self.graph.add_edge(parent, idx, ());
        self.children.insert(key, idx);
        idx
    }
}

fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let joined = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Splits a normalized path; absolute paths keep their leading `/` on the
/// first segment so the top-level group resolves on its own.
fn segments(normalized: &str, origin: SourceTree) -> Vec<String> {
    let trimmed = normalized.trim_start_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    let mut segments: Vec<String> = trimmed.split('/').map(str::to_string).collect();
    if origin == SourceTree::Absolute || normalized.starts_with('/') {
        segments[0] = format!("/{}", segments[0]);
    }
    segments
}

struct NodeView<'a> {
    tree: &'a FileTree,
    id: FileNodeId,
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let node = self.tree.node(self.id);
        let children: Vec<NodeView<'_>> = self
            .tree
            .children(self.id)
            .into_iter()
            .map(|id| NodeView {
                tree: self.tree,
                id,
            })
            .collect();

        let mut state = serializer.serialize_struct("FileNode", 4)?;
        state.serialize_field("name", &node.name)?;
        state.serialize_field("kind", &node.kind)?;
        state.serialize_field("source_tree", &node.source_tree)?;
        if node.kind == FileNodeKind::Group {
            state.serialize_field("children", &children)?;
        } else {
            state.skip_field("children")?;
        }
        state.end()
    }
}

impl Serialize for FileTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        NodeView {
            tree: self,
            id: self.root(),
        }
        .serialize(serializer)
    }
}
