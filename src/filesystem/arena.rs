use snafu::OptionExt;
use tracing::debug;

use crate::ext::TreePathExt;

use super::error::{FileTreeError, LinkageFault, LinkageSnafu, MemorySnafu};
use super::{DirectoryNode, FileNode, Node, NodeId};

/// What to build when a new node is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeSeed {
    Directory,
    File(Vec<u8>),
}

/// Slot storage for every node of a tree.
///
/// Nodes refer to each other by [`NodeId`]. A released slot is recycled by the next
/// allocation, so ids are only stable while the node they name is alive.
#[derive(Debug, Default)]
pub struct NodeArena {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    live: usize,
    max_nodes: Option<usize>,
}

impl NodeArena {
    /// Creates an arena refusing to hold more than `max_nodes` live nodes.
    pub fn with_limit(max_nodes: Option<usize>) -> Self {
        Self {
            max_nodes,
            ..Self::default()
        }
    }

    pub fn live(&self) -> usize {
        self.live
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn path(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(Node::path)
    }

    pub fn directory(&self, id: NodeId) -> Option<&DirectoryNode> {
        self.get(id).and_then(Node::as_directory)
    }

    pub fn directory_mut(&mut self, id: NodeId) -> Option<&mut DirectoryNode> {
        self.get_mut(id).and_then(Node::as_directory_mut)
    }

    pub fn file(&self, id: NodeId) -> Option<&FileNode> {
        self.get(id).and_then(Node::as_file)
    }

    pub fn file_mut(&mut self, id: NodeId) -> Option<&mut FileNode> {
        self.get_mut(id).and_then(Node::as_file_mut)
    }

    /// Creates a detached node named `segment` below `parent`, or a root candidate when
    /// `parent` is `None`. The node records `parent` but is not linked into it.
    pub(crate) fn create(
        &mut self,
        parent: Option<NodeId>,
        segment: &str,
        seed: NodeSeed,
    ) -> Result<NodeId, FileTreeError> {
        let path = match parent {
            Some(parent_id) => self
                .directory(parent_id)
                .context(LinkageSnafu {
                    parent: parent_id.to_string(),
                    child: segment,
                    fault: LinkageFault::ParentNotDirectory,
                })?
                .path()
                .join_segment(segment),
            None => segment.to_string(),
        };

        let node = match seed {
            NodeSeed::Directory => Node::Directory(DirectoryNode::new(path, parent)),
            NodeSeed::File(contents) => Node::File(FileNode::new(path, parent, contents)),
        };
        self.allocate(node)
    }

    fn allocate(&mut self, node: Node) -> Result<NodeId, FileTreeError> {
        let over_quota = self.max_nodes.is_some_and(|limit| self.live >= limit);
        if over_quota {
            debug!("Node quota exhausted while creating '{}'", node.path());
            return MemorySnafu { path: node.path() }.fail();
        }

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                index
            }
            None => {
                if self.slots.try_reserve(1).is_err() {
                    return MemorySnafu { path: node.path() }.fail();
                }
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        self.live += 1;
        Ok(NodeId::new(index))
    }

    /// Frees the slot of `id` without looking at its children.
    pub(crate) fn release(&mut self, id: NodeId) -> Option<Node> {
        let node = self.slots.get_mut(id.index())?.take()?;
        self.free.push(id.index());
        self.live -= 1;
        Some(node)
    }

    /// Frees `id` and, for a directory, its whole subtree. Returns how many nodes were freed.
    pub(crate) fn destroy(&mut self, id: NodeId) -> usize {
        let mut pending = vec![id];
        let mut freed = 0;
        while let Some(id) = pending.pop() {
            match self.release(id) {
                Some(Node::Directory(directory)) => {
                    let (subdirectories, files) = directory.into_children();
                    pending.extend(subdirectories);
                    pending.extend(files);
                    freed += 1;
                }
                Some(Node::File(_)) => freed += 1,
                None => {}
            }
        }
        freed
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}
