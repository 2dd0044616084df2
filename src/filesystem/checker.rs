use std::cmp::Ordering;

use snafu::{OptionExt, Snafu, ensure};
use tracing::error;

use crate::ext::{SEPARATOR, TreePathExt};

use super::{DirectoryNode, FileTree, Node, NodeId, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum InvariantViolation {
    #[snafu(display("Node {id} is referenced but does not exist"))]
    MissingNode { id: NodeId },
    #[snafu(display("Parent of '{path}' is not a directory"))]
    ParentNotDirectory { path: String },
    #[snafu(display("'{parent}' is not a prefix of '{child}'"))]
    PrefixMismatch { parent: String, child: String },
    #[snafu(display("'{child}' lies more than one segment below '{parent}'"))]
    GrandchildPath { parent: String, child: String },
    #[snafu(display("'{parent}' and '{child}' are not mutually linked"))]
    NotMutuallyLinked { parent: String, child: String },
    #[snafu(display("'{child}' is a {actual} stored among the {expected} children of '{parent}'"))]
    WrongChildKind {
        parent: String,
        child: String,
        expected: NodeKind,
        actual: NodeKind,
    },
    #[snafu(display("Children of '{parent}' are out of order: '{first}' precedes '{second}'"))]
    Unordered {
        parent: String,
        first: String,
        second: String,
    },
    #[snafu(display("'{parent}' holds '{child}' more than once"))]
    DuplicateChild { parent: String, child: String },
    #[snafu(display("Not initialized, but count is {count}"))]
    UninitializedWithNodes { count: usize },
    #[snafu(display("Not initialized, but root is present"))]
    UninitializedWithRoot,
    #[snafu(display("Root is absent but count is {count}"))]
    CountWithoutRoot { count: usize },
    #[snafu(display("Count is 0 but root is present"))]
    RootWithoutCount,
    #[snafu(display("Root '{path}' has a parent"))]
    RootHasParent { path: String },
    #[snafu(display("Count is {expected} but {actual} nodes are reachable from the root"))]
    CountMismatch { expected: usize, actual: usize },
    #[snafu(display("{live} nodes are allocated but only {reachable} are reachable"))]
    LeakedNodes { live: usize, reachable: usize },
}

/// Read-only auditor of the structural invariants of a [`FileTree`].
pub struct InvariantChecker;

impl InvariantChecker {
    /// Checks `id` against its parent: path prefix, single segment, mutual linkage of
    /// every sibling, and strict ordering of the parent's children.
    pub fn check_node(tree: &FileTree, id: NodeId) -> Result<(), InvariantViolation> {
        let node = tree.node(id).context(MissingNodeSnafu { id })?;
        let Some(parent_id) = node.parent() else {
            return Ok(());
        };
        let parent = tree
            .node(parent_id)
            .context(MissingNodeSnafu { id: parent_id })?
            .as_directory()
            .context(ParentNotDirectorySnafu { path: node.path() })?;

        let segment = node
            .path()
            .strip_parent(parent.path())
            .context(PrefixMismatchSnafu {
                parent: parent.path(),
                child: node.path(),
            })?;
        ensure!(
            !segment.is_empty() && !segment.contains(SEPARATOR),
            GrandchildPathSnafu {
                parent: parent.path(),
                child: node.path(),
            }
        );
        ensure!(
            parent.children(node.kind()).iter().any(|&child| child == id),
            NotMutuallyLinkedSnafu {
                parent: parent.path(),
                child: node.path(),
            }
        );

        for kind in NodeKind::ALL {
            Self::check_siblings(tree, parent_id, parent, kind)?;
        }
        Self::check_disjoint_kinds(tree, parent)
    }

    fn check_siblings(
        tree: &FileTree,
        parent_id: NodeId,
        parent: &DirectoryNode,
        kind: NodeKind,
    ) -> Result<(), InvariantViolation> {
        let mut previous: Option<&Node> = None;
        for &child_id in parent.children(kind) {
            let child = tree.node(child_id).context(MissingNodeSnafu { id: child_id })?;
            ensure!(
                child.kind() == kind,
                WrongChildKindSnafu {
                    parent: parent.path(),
                    child: child.path(),
                    expected: kind,
                    actual: child.kind(),
                }
            );
            ensure!(
                child.parent() == Some(parent_id),
                NotMutuallyLinkedSnafu {
                    parent: parent.path(),
                    child: child.path(),
                }
            );
            if let Some(previous) = previous {
                match previous.compare(child) {
                    Ordering::Less => {}
                    Ordering::Equal => {
                        return DuplicateChildSnafu {
                            parent: parent.path(),
                            child: child.path(),
                        }
                        .fail();
                    }
                    Ordering::Greater => {
                        return UnorderedSnafu {
                            parent: parent.path(),
                            first: previous.path(),
                            second: child.path(),
                        }
                        .fail();
                    }
                }
            }
            previous = Some(child);
        }
        Ok(())
    }

    /// A file and a directory of one parent may not share a path.
    fn check_disjoint_kinds(
        tree: &FileTree,
        parent: &DirectoryNode,
    ) -> Result<(), InvariantViolation> {
        let directory_paths: Vec<&str> = parent
            .subdirectories()
            .iter()
            .filter_map(|&id| tree.node(id).map(Node::path))
            .collect();
        for &file_id in parent.files() {
            let Some(path) = tree.node(file_id).map(Node::path) else {
                continue;
            };
            ensure!(
                directory_paths.binary_search(&path).is_err(),
                DuplicateChildSnafu {
                    parent: parent.path(),
                    child: path,
                }
            );
        }
        Ok(())
    }

    /// Checks the top-level state of `tree`, then every node reachable from its root.
    pub fn check_tree(tree: &FileTree) -> Result<(), InvariantViolation> {
        Self::check_tree_state(tree).inspect_err(|violation| error!("{violation}"))
    }

    fn check_tree_state(tree: &FileTree) -> Result<(), InvariantViolation> {
        let count = tree.node_count();
        let root = tree.root();

        if !tree.is_initialized() {
            ensure!(count == 0, UninitializedWithNodesSnafu { count });
            ensure!(root.is_none(), UninitializedWithRootSnafu);
            return Ok(());
        }

        ensure!(root.is_some() || count == 0, CountWithoutRootSnafu { count });
        ensure!(root.is_none() || count != 0, RootWithoutCountSnafu);

        let reachable = match root {
            Some(root) => {
                let node = tree.node(root).context(MissingNodeSnafu { id: root })?;
                ensure!(
                    node.parent().is_none(),
                    RootHasParentSnafu { path: node.path() }
                );
                Self::check_subtree(tree, root)?
            }
            None => 0,
        };

        ensure!(
            reachable == count,
            CountMismatchSnafu {
                expected: count,
                actual: reachable,
            }
        );
        let live = tree.arena().live();
        ensure!(live == reachable, LeakedNodesSnafu { live, reachable });
        Ok(())
    }

    /// Checks every node below and including `root` in preorder. Returns how many nodes
    /// were visited.
    fn check_subtree(tree: &FileTree, root: NodeId) -> Result<usize, InvariantViolation> {
        let mut pending = vec![root];
        let mut reachable = 0;
        while let Some(id) = pending.pop() {
            Self::check_node(tree, id)?;
            reachable += 1;

            if let Some(directory) = tree.node(id).and_then(Node::as_directory) {
                for kind in NodeKind::ALL.into_iter().rev() {
                    pending.extend(directory.children(kind).iter().rev().copied());
                }
            }
        }
        Ok(reachable)
    }
}
