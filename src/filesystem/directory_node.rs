use derive_more::Display;

use super::{NodeId, NodeKind, OrderedChildSet};

/// A directory of the tree. Children are held in two sets, one per node kind, each
/// ordered by the child's full path.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{path}")]
pub struct DirectoryNode {
    path: String,
    parent: Option<NodeId>,
    subdirectories: OrderedChildSet<NodeId>,
    files: OrderedChildSet<NodeId>,
}

impl DirectoryNode {
    pub(crate) fn new(path: String, parent: Option<NodeId>) -> Self {
        Self {
            path,
            parent,
            subdirectories: OrderedChildSet::new(),
            files: OrderedChildSet::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub fn subdirectories(&self) -> &OrderedChildSet<NodeId> {
        &self.subdirectories
    }

    pub fn files(&self) -> &OrderedChildSet<NodeId> {
        &self.files
    }

    pub fn children(&self, kind: NodeKind) -> &OrderedChildSet<NodeId> {
        match kind {
            NodeKind::Directory => &self.subdirectories,
            NodeKind::File => &self.files,
        }
    }

    pub(crate) fn children_mut(&mut self, kind: NodeKind) -> &mut OrderedChildSet<NodeId> {
        match kind {
            NodeKind::Directory => &mut self.subdirectories,
            NodeKind::File => &mut self.files,
        }
    }

    pub fn child_count(&self, kind: NodeKind) -> usize {
        self.children(kind).len()
    }

    pub fn child(&self, kind: NodeKind, index: usize) -> Option<NodeId> {
        self.children(kind).get(index).copied()
    }

    pub(crate) fn into_children(self) -> (OrderedChildSet<NodeId>, OrderedChildSet<NodeId>) {
        (self.subdirectories, self.files)
    }
}
