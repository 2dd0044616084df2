use std::cmp::Ordering;

use snafu::{OptionExt, ensure};

use crate::ext::TreePathExt;

use super::arena::NodeSeed;
use super::error::{
    AlreadyInTreeSnafu, FileTreeError, LinkageFault, LinkageSnafu, MemorySnafu,
};
use super::{NodeArena, NodeId, NodeKind, OrderedChildSet};

impl NodeArena {
    fn compare_path(&self, id: NodeId, path: &str) -> Ordering {
        self.path(id).map_or(Ordering::Less, |probe| probe.cmp(path))
    }

    fn search(&self, children: &OrderedChildSet<NodeId>, path: &str) -> Result<usize, usize> {
        children.search_by(|&id| self.compare_path(id, path))
    }

    /// Finds a child of `parent` whose path is exactly `path`, in either child set.
    pub fn has_child(&self, parent: NodeId, path: &str) -> Option<(NodeKind, usize)> {
        let directory = self.directory(parent)?;
        NodeKind::ALL.into_iter().find_map(|kind| {
            self.search(directory.children(kind), path)
                .ok()
                .map(|index| (kind, index))
        })
    }

    /// Links `child` under `parent` at its sorted position and points the child back at
    /// `parent`.
    pub(crate) fn link_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), FileTreeError> {
        let parent_path = self
            .directory(parent)
            .context(LinkageSnafu {
                parent: parent.to_string(),
                child: child.to_string(),
                fault: LinkageFault::ParentNotDirectory,
            })?
            .path()
            .to_string();
        let (child_path, kind) = self
            .get(child)
            .map(|node| (node.path().to_string(), node.kind()))
            .context(LinkageSnafu {
                parent: parent_path.as_str(),
                child: child.to_string(),
                fault: LinkageFault::MissingChild,
            })?;

        ensure!(
            self.has_child(parent, &child_path).is_none(),
            AlreadyInTreeSnafu { path: child_path }
        );

        let segment = child_path.strip_parent(&parent_path).context(LinkageSnafu {
            parent: parent_path.as_str(),
            child: child_path.as_str(),
            fault: LinkageFault::NotUnderParent,
        })?;
        ensure!(
            segment.is_single_segment(),
            LinkageSnafu {
                parent: parent_path.as_str(),
                child: child_path.as_str(),
                fault: LinkageFault::Grandchild,
            }
        );

        let position = self
            .directory(parent)
            .map(|directory| self.search(directory.children(kind), &child_path));
        let index = match position {
            Some(Err(index)) => index,
            _ => return AlreadyInTreeSnafu { path: child_path }.fail(),
        };

        if let Some(directory) = self.directory_mut(parent) {
            if directory.children_mut(kind).insert_at(index, child).is_err() {
                return MemorySnafu { path: child_path }.fail();
            }
        }
        if let Some(node) = self.get_mut(child) {
            node.set_parent(Some(parent));
        }
        Ok(())
    }

    /// Removes `child` from the matching child set of `parent`. The child node itself is
    /// left untouched.
    pub(crate) fn unlink_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), FileTreeError> {
        let not_linked = || LinkageSnafu {
            parent: parent.to_string(),
            child: child.to_string(),
            fault: LinkageFault::NotLinked,
        };

        let (child_path, kind) = self
            .get(child)
            .map(|node| (node.path().to_string(), node.kind()))
            .with_context(not_linked)?;
        let index = self
            .directory(parent)
            .and_then(|directory| {
                let index = self.search(directory.children(kind), &child_path).ok()?;
                (directory.child(kind, index) == Some(child)).then_some(index)
            })
            .with_context(not_linked)?;

        if let Some(directory) = self.directory_mut(parent) {
            directory.children_mut(kind).remove_at(index);
        }
        Ok(())
    }

    /// Creates a node named `segment` and links it under `parent`. The new node is
    /// released again when the link is refused.
    pub(crate) fn add_child(
        &mut self,
        parent: NodeId,
        segment: &str,
        seed: NodeSeed,
    ) -> Result<NodeId, FileTreeError> {
        let child = self.create(Some(parent), segment, seed)?;
        if let Err(error) = self.link_child(parent, child) {
            self.release(child);
            return Err(error);
        }
        Ok(child)
    }
}
