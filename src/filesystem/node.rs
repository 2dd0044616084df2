use std::cmp::Ordering;

use derive_more::{Display, From};

use super::{DirectoryNode, FileNode};

/// Stable index of a node inside a [`super::NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("#{_0}")]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
}

impl NodeKind {
    pub const ALL: [NodeKind; 2] = [NodeKind::Directory, NodeKind::File];
}

/// A node of the tree. Directories and files share one namespace, so every lookup
/// goes through this type and inspects the variant instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum Node {
    Directory(DirectoryNode),
    File(FileNode),
}

impl Node {
    pub fn path(&self) -> &str {
        match self {
            Node::Directory(directory) => directory.path(),
            Node::File(file) => file.path(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Directory(directory) => directory.parent(),
            Node::File(file) => file.parent(),
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Directory(directory) => directory.set_parent(parent),
            Node::File(file) => file.set_parent(parent),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Directory(_) => NodeKind::Directory,
            Node::File(_) => NodeKind::File,
        }
    }

    /// Lexicographic comparison of the two paths.
    pub fn compare(&self, other: &Node) -> Ordering {
        self.path().cmp(other.path())
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Node::Directory(directory) => Some(directory),
            Node::File(_) => None,
        }
    }

    pub fn as_directory_mut(&mut self) -> Option<&mut DirectoryNode> {
        match self {
            Node::Directory(directory) => Some(directory),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(file) => Some(file),
            Node::Directory(_) => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut FileNode> {
        match self {
            Node::File(file) => Some(file),
            Node::Directory(_) => None,
        }
    }
}
