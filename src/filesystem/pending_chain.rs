use tracing::debug;

use super::arena::NodeSeed;
use super::error::FileTreeError;
use super::{NodeArena, NodeId};

/// Nodes built by one insertion that the tree cannot reach yet.
///
/// The chain is linked together as it grows but its first node is only attached to the
/// tree by [`PendingChain::commit`]. Dropping an uncommitted chain releases every node
/// it created, so a failed insertion leaves the arena as it found it.
pub(crate) struct PendingChain<'a> {
    arena: &'a mut NodeArena,
    base: Option<NodeId>,
    created: Vec<NodeId>,
    committed: bool,
}

impl<'a> PendingChain<'a> {
    /// Builds one node per segment below `base`. Every segment but the last becomes a
    /// directory; the last one is built from `leaf`.
    pub fn build(
        arena: &'a mut NodeArena,
        base: Option<NodeId>,
        segments: &[&str],
        leaf: NodeSeed,
    ) -> Result<Self, FileTreeError> {
        let mut chain = Self {
            arena,
            base,
            created: Vec::with_capacity(segments.len()),
            committed: false,
        };

        if let Some((last, intermediate)) = segments.split_last() {
            for segment in intermediate {
                chain.push(segment, NodeSeed::Directory)?;
            }
            chain.push(last, leaf)?;
        }
        Ok(chain)
    }

    fn push(&mut self, segment: &str, seed: NodeSeed) -> Result<NodeId, FileTreeError> {
        let id = match self.created.last().copied() {
            Some(previous) => self.arena.add_child(previous, segment, seed)?,
            None => self.arena.create(self.base, segment, seed)?,
        };
        self.created.push(id);
        Ok(id)
    }

    pub fn first(&self) -> Option<NodeId> {
        self.created.first().copied()
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    /// Attaches the chain under its base, or makes it the new root when there is no base.
    /// Returns the number of nodes added to the tree.
    pub fn commit(mut self, root: &mut Option<NodeId>) -> Result<usize, FileTreeError> {
        let Some(first) = self.first() else {
            return Ok(0);
        };

        match self.base {
            Some(base) => self.arena.link_child(base, first)?,
            None => *root = Some(first),
        }

        self.committed = true;
        Ok(self.len())
    }
}

impl Drop for PendingChain<'_> {
    fn drop(&mut self) {
        if self.committed || self.created.is_empty() {
            return;
        }

        debug!("Rolling back {} uncommitted nodes", self.created.len());
        for id in self.created.drain(..).rev() {
            self.arena.release(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::FileTreeError;

    #[test]
    fn committed_chain_becomes_root() {
        let mut arena = NodeArena::default();
        let mut root = None;

        let chain = PendingChain::build(&mut arena, None, &["x", "y", "z"], NodeSeed::Directory)
            .unwrap();
        let created = chain.commit(&mut root).unwrap();

        assert_eq!(created, 3);
        assert_eq!(root.and_then(|id| arena.path(id)), Some("x"));
        assert_eq!(arena.live(), 3);
    }

    #[test]
    fn failed_build_releases_partial_chain() {
        let mut arena = NodeArena::with_limit(Some(2));

        let error = PendingChain::build(&mut arena, None, &["x", "y", "z"], NodeSeed::Directory)
            .err()
            .expect("quota should stop the third node");

        assert_eq!(
            error,
            FileTreeError::MemoryError {
                path: "x/y/z".to_string()
            }
        );
        assert_eq!(arena.live(), 0);
    }

    #[test]
    fn dropped_chain_is_rolled_back() {
        let mut arena = NodeArena::default();
        let base = arena.create(None, "a", NodeSeed::Directory).unwrap();

        {
            let chain =
                PendingChain::build(&mut arena, Some(base), &["b", "f"], NodeSeed::File(vec![1]))
                    .unwrap();
            assert_eq!(chain.len(), 2);
        }

        assert_eq!(arena.live(), 1);
        assert!(arena.directory(base).unwrap().subdirectories().is_empty());
    }

    #[test]
    fn failed_commit_rolls_back() {
        let mut arena = NodeArena::default();
        let base = arena.create(None, "a", NodeSeed::Directory).unwrap();
        arena
            .add_child(base, "b", NodeSeed::File(Vec::new()))
            .unwrap();
        let mut root = Some(base);

        let chain =
            PendingChain::build(&mut arena, Some(base), &["b"], NodeSeed::Directory).unwrap();
        let result = chain.commit(&mut root);

        assert_eq!(
            result,
            Err(FileTreeError::AlreadyInTree {
                path: "a/b".to_string()
            })
        );
        assert_eq!(arena.live(), 2);
    }
}
