use crate::ext::{SEPARATOR, TreePathExt};

use super::{Node, NodeArena, NodeId, NodeKind};

/// Outcome of walking from the root towards a target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    /// No node of the tree lies on the way to the target.
    None,
    /// Deepest directory whose path is a strict prefix of the target.
    Ancestor(NodeId),
    /// The target itself, which is a directory.
    Directory(NodeId),
    /// The target itself, which is a file.
    File(NodeId),
}

impl PathMatch {
    pub fn node(self) -> Option<NodeId> {
        match self {
            PathMatch::None => None,
            PathMatch::Ancestor(id) | PathMatch::Directory(id) | PathMatch::File(id) => Some(id),
        }
    }
}

/// Longest-matching-prefix walk over the nodes of an arena.
pub struct PathTraversal<'a> {
    arena: &'a NodeArena,
}

impl<'a> PathTraversal<'a> {
    pub fn new(arena: &'a NodeArena) -> Self {
        Self { arena }
    }

    /// Returns the deepest node on the way from `root` to `target`.
    pub fn traverse(&self, root: Option<NodeId>, target: &str) -> PathMatch {
        let Some(root) = root else {
            return PathMatch::None;
        };
        let Some(node) = self.arena.get(root) else {
            return PathMatch::None;
        };
        if node.path() == target {
            return Self::exact(root, node);
        }
        if node.as_directory().is_none() || target.strip_parent(node.path()).is_none() {
            return PathMatch::None;
        }

        // Only the child named by the next segment can lie on the way, so the walk
        // follows a single branch.
        let mut current = root;
        loop {
            let Some(directory) = self.arena.directory(current) else {
                return PathMatch::Ancestor(current);
            };
            let Some(remainder) = target.strip_parent(directory.path()) else {
                return PathMatch::Ancestor(current);
            };
            let next_len = target.len() - remainder.len() + remainder.first_segment().len();
            let next_path = &target[..next_len];
            let reaches_target = next_len == target.len();

            let deeper = self
                .arena
                .has_child(current, next_path)
                .and_then(|(kind, index)| directory.child(kind, index).map(|id| (kind, id)));
            match deeper {
                Some((NodeKind::Directory, child)) if reaches_target => {
                    return PathMatch::Directory(child);
                }
                Some((NodeKind::Directory, child)) => current = child,
                Some((NodeKind::File, child)) if reaches_target => return PathMatch::File(child),
                _ => return PathMatch::Ancestor(current),
            }
        }
    }

    fn exact(id: NodeId, node: &Node) -> PathMatch {
        match node {
            Node::Directory(_) => PathMatch::Directory(id),
            Node::File(_) => PathMatch::File(id),
        }
    }
}

/// Splits the part of `target` below `base_path` into segments.
pub(crate) fn remaining_segments<'t>(target: &'t str, base_path: Option<&str>) -> Vec<&'t str> {
    let remainder = match base_path {
        Some(base_path) => target.strip_parent(base_path).unwrap_or(""),
        None => target,
    };
    remainder
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}
