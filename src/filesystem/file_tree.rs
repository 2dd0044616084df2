use snafu::ensure;
use tracing::{debug, error, info};

use crate::config::FileTreeConfig;
use crate::ext::TreePathExt;

use super::arena::NodeSeed;
use super::error::{
    AlreadyInTreeSnafu, ConflictingPathSnafu, FileTreeError, InitializationSnafu,
    InvalidPathSnafu, LifecycleState, NoSuchPathSnafu, NotADirectorySnafu, NotAFileSnafu,
};
use super::pending_chain::PendingChain;
use super::traversal::{PathMatch, PathTraversal, remaining_segments};
use super::{InvariantChecker, Node, NodeArena, NodeId, NodeKind};

/// An in-memory hierarchy of directories and files addressed by `/`-separated paths.
///
/// The root is either a directory hierarchy or a single standalone file. A handle
/// built with [`FileTree::new`] starts initialized and empty; [`FileTree::destroy`]
/// discards every node and leaves the handle uninitialized until [`FileTree::init`].
#[derive(Debug)]
pub struct FileTree {
    initialized: bool,
    arena: NodeArena,
    root: Option<NodeId>,
    count: usize,
    config: FileTreeConfig,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTree {
    pub fn new() -> Self {
        Self::with_config(FileTreeConfig::default())
    }

    pub fn with_config(config: FileTreeConfig) -> Self {
        Self {
            initialized: true,
            arena: NodeArena::with_limit(config.max_nodes()),
            root: None,
            count: 0,
            config,
        }
    }

    /// Brings a destroyed handle back to the initialized, empty state.
    pub fn init(&mut self) -> Result<(), FileTreeError> {
        ensure!(
            !self.initialized,
            InitializationSnafu {
                state: LifecycleState::Initialized
            }
        );

        self.initialized = true;
        self.root = None;
        self.count = 0;
        debug!("File tree initialized");
        Ok(())
    }

    /// Discards every node and leaves the handle uninitialized.
    pub fn destroy(&mut self) -> Result<(), FileTreeError> {
        self.ensure_initialized()?;

        let destroyed = self.root.take().map_or(0, |root| self.arena.destroy(root));
        self.arena.clear();
        self.count = 0;
        self.initialized = false;
        debug!("File tree destroyed ({destroyed} nodes released)");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.count
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn config(&self) -> &FileTreeConfig {
        &self.config
    }

    pub(crate) fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Walks from the root towards `path` and reports the deepest node reached.
    pub fn find(&self, path: &str) -> PathMatch {
        if !self.initialized {
            return PathMatch::None;
        }
        PathTraversal::new(&self.arena).traverse(self.root, path)
    }

    pub(crate) fn ensure_initialized(&self) -> Result<(), FileTreeError> {
        ensure!(
            self.initialized,
            InitializationSnafu {
                state: LifecycleState::Uninitialized
            }
        );
        Ok(())
    }

    pub(crate) fn file_root(&self) -> Option<NodeId> {
        self.root
            .filter(|&root| self.arena.get(root).map(Node::kind) == Some(NodeKind::File))
    }

    /// Inserts the directory `path`, creating any missing directory on the way.
    pub fn insert_dir(&mut self, path: &str) -> Result<(), FileTreeError> {
        self.insert_path(path, NodeSeed::Directory)
    }

    /// Inserts the file `path` holding `contents`, creating any missing directory on the
    /// way. A single-segment path on an empty tree makes the file the root.
    pub fn insert_file(&mut self, path: &str, contents: Vec<u8>) -> Result<(), FileTreeError> {
        self.insert_path(path, NodeSeed::File(contents))
    }

    fn insert_path(&mut self, path: &str, seed: NodeSeed) -> Result<(), FileTreeError> {
        self.ensure_initialized()?;
        path.validate_tree_path()
            .map_err(|fault| InvalidPathSnafu { path, fault }.build())?;

        if let Some(file_root) = self.file_root() {
            ensure!(
                self.arena.path(file_root) != Some(path),
                AlreadyInTreeSnafu { path }
            );
            return ConflictingPathSnafu { path }.fail();
        }

        let base = match self.find(path) {
            PathMatch::Directory(_) | PathMatch::File(_) => {
                return AlreadyInTreeSnafu { path }.fail();
            }
            PathMatch::None if self.root.is_some() => {
                return ConflictingPathSnafu { path }.fail();
            }
            PathMatch::None => None,
            PathMatch::Ancestor(base) => Some(base),
        };

        let segments = remaining_segments(path, base.and_then(|id| self.arena.path(id)));
        if let (Some(base), Some(first)) = (base, segments.first()) {
            ensure!(!self.blocked_by_file(base, path, first), ConflictingPathSnafu { path });
        }

        let chain = PendingChain::build(&mut self.arena, base, &segments, seed)?;
        let created = chain.commit(&mut self.root)?;
        self.count += created;

        info!("Inserted '{path}' ({created} new nodes, {} total)", self.count);
        self.audit();
        Ok(())
    }

    /// Whether the child of `base` on the way to `path` is a file, which cannot be
    /// descended into.
    fn blocked_by_file(&self, base: NodeId, path: &str, first_segment: &str) -> bool {
        let Some(base_path) = self.arena.path(base) else {
            return false;
        };
        let next_len = base_path.len() + 1 + first_segment.len();
        path.get(..next_len)
            .and_then(|next_path| self.arena.has_child(base, next_path))
            .is_some_and(|(kind, _)| kind == NodeKind::File)
    }

    /// Removes the directory `path` with its whole subtree. Returns how many nodes were
    /// destroyed.
    pub fn remove_dir(&mut self, path: &str) -> Result<usize, FileTreeError> {
        self.ensure_initialized()?;

        let directory = match self.find(path) {
            PathMatch::Directory(id) => id,
            PathMatch::File(_) => return NotADirectorySnafu { path }.fail(),
            PathMatch::Ancestor(_) | PathMatch::None => return NoSuchPathSnafu { path }.fail(),
        };

        self.detach(directory)?;
        let destroyed = self.arena.destroy(directory);
        self.count -= destroyed;

        info!("Removed directory '{path}' ({destroyed} nodes destroyed)");
        self.audit();
        Ok(destroyed)
    }

    /// Removes the file `path` and hands its contents back to the caller.
    pub fn remove_file(&mut self, path: &str) -> Result<Vec<u8>, FileTreeError> {
        self.ensure_initialized()?;

        if let Some(file_root) = self.file_root() {
            ensure!(
                self.arena.path(file_root) == Some(path),
                NoSuchPathSnafu { path }
            );
            let contents = self.take_file(file_root);
            self.root = None;
            self.count = 0;
            info!("Removed standalone root file '{path}'");
            self.audit();
            return Ok(contents);
        }

        let file = match self.find(path) {
            PathMatch::File(id) => id,
            PathMatch::Directory(_) => return NotAFileSnafu { path }.fail(),
            PathMatch::Ancestor(_) | PathMatch::None => return NoSuchPathSnafu { path }.fail(),
        };

        self.detach(file)?;
        let contents = self.take_file(file);
        self.count -= 1;

        info!("Removed file '{path}'");
        self.audit();
        Ok(contents)
    }

    /// Unlinks `id` from its parent, or clears the root when `id` has no parent.
    fn detach(&mut self, id: NodeId) -> Result<(), FileTreeError> {
        match self.arena.get(id).and_then(Node::parent) {
            Some(parent) => self.arena.unlink_child(parent, id),
            None => {
                self.root = None;
                Ok(())
            }
        }
    }

    fn take_file(&mut self, id: NodeId) -> Vec<u8> {
        match self.arena.release(id) {
            Some(Node::File(file)) => file.into_contents(),
            _ => Vec::new(),
        }
    }

    fn audit(&self) {
        if !self.config.check_invariants() {
            return;
        }
        if let Err(violation) = InvariantChecker::check_tree(self) {
            error!("File tree invariant broken after mutation: {violation}");
        }
    }

    pub(crate) fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    #[cfg(test)]
    pub(crate) fn set_node_count(&mut self, count: usize) {
        self.count = count;
    }

    #[cfg(test)]
    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::InvariantViolation;
    use rstest::*;

    fn assert_valid(tree: &FileTree) {
        assert_eq!(InvariantChecker::check_tree(tree), Ok::<(), InvariantViolation>(()));
    }

    #[test]
    fn insert_dir_materializes_intermediate_directories() {
        let mut tree = FileTree::new();

        tree.insert_dir("a/b/c").unwrap();

        assert!(tree.contains_dir("a/b/c"));
        assert!(tree.contains_dir("a/b"));
        assert!(tree.contains_dir("a"));
        assert_eq!(tree.node_count(), 3);
        assert_valid(&tree);
    }

    #[test]
    fn insert_below_existing_directory_only_adds_missing_nodes() {
        let mut tree = FileTree::new();
        tree.insert_dir("a/b").unwrap();

        tree.insert_file("a/b/c/d.txt", b"d".to_vec()).unwrap();

        assert_eq!(tree.node_count(), 4);
        assert!(tree.contains_dir("a/b/c"));
        assert!(tree.contains_file("a/b/c/d.txt"));
        assert_valid(&tree);
    }

    #[test]
    fn removing_a_directory_twice_reports_no_such_path() {
        let mut tree = FileTree::new();
        tree.insert_dir("a/b/c").unwrap();
        tree.insert_file("a/b/f", Vec::new()).unwrap();

        assert_eq!(tree.remove_dir("a"), Ok(4));
        assert!(!tree.contains_dir("a"));
        assert_eq!(tree.node_count(), 0);
        assert_eq!(
            tree.remove_dir("a"),
            Err(FileTreeError::NoSuchPath {
                path: "a".to_string()
            })
        );
        assert_valid(&tree);
    }

    #[test]
    fn removing_a_subdirectory_keeps_siblings() {
        let mut tree = FileTree::new();
        tree.insert_dir("a/b/c").unwrap();
        tree.insert_dir("a/d").unwrap();

        assert_eq!(tree.remove_dir("a/b"), Ok(2));

        assert!(tree.contains_dir("a/d"));
        assert!(!tree.contains_dir("a/b/c"));
        assert_eq!(tree.node_count(), 2);
        assert_valid(&tree);
    }

    #[test]
    fn file_root_admits_no_other_paths() {
        let mut tree = FileTree::new();
        tree.insert_file("root.txt", b"data".to_vec()).unwrap();

        assert_eq!(
            tree.insert_dir("other"),
            Err(FileTreeError::ConflictingPath {
                path: "other".to_string()
            })
        );
        assert!(matches!(
            tree.insert_file("root.txt/child", Vec::new()),
            Err(FileTreeError::ConflictingPath { .. })
        ));
        assert!(matches!(
            tree.insert_file("root.txt", Vec::new()),
            Err(FileTreeError::AlreadyInTree { .. })
        ));
        assert_eq!(tree.node_count(), 1);
        assert_valid(&tree);
    }

    #[test]
    fn directory_root_rejects_unrelated_root() {
        let mut tree = FileTree::new();
        tree.insert_dir("a").unwrap();

        assert!(matches!(
            tree.insert_dir("b/c"),
            Err(FileTreeError::ConflictingPath { .. })
        ));
        assert!(matches!(
            tree.insert_file("ab", Vec::new()),
            Err(FileTreeError::ConflictingPath { .. })
        ));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn allocation_failure_on_third_segment_rolls_back() {
        let mut tree = FileTree::with_config(FileTreeConfig::new().with_max_nodes(Some(2)));

        let result = tree.insert_dir("x/y/z");

        assert_eq!(
            result,
            Err(FileTreeError::MemoryError {
                path: "x/y/z".to_string()
            })
        );
        assert!(!tree.contains_dir("x"));
        assert!(!tree.contains_dir("x/y"));
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.root(), None);
        assert_valid(&tree);
    }

    #[test]
    fn allocation_failure_below_existing_directory_leaves_tree_unchanged() {
        let mut tree = FileTree::with_config(FileTreeConfig::new().with_max_nodes(Some(3)));
        tree.insert_file("a/f", b"keep".to_vec()).unwrap();
        let before = tree.listing();

        let result = tree.insert_file("a/x/y", Vec::new());

        assert!(matches!(result, Err(FileTreeError::MemoryError { .. })));
        assert_eq!(tree.listing(), before);
        assert_eq!(tree.node_count(), 2);
        assert_valid(&tree);

        tree.insert_dir("a/x").unwrap();
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn remove_dir_on_file_is_not_a_directory() {
        let mut tree = FileTree::new();
        tree.insert_file("a/b/c", b"c".to_vec()).unwrap();

        assert_eq!(
            tree.remove_dir("a/b/c"),
            Err(FileTreeError::NotADirectory {
                path: "a/b/c".to_string()
            })
        );
        assert_eq!(
            tree.remove_file("a/b"),
            Err(FileTreeError::NotAFile {
                path: "a/b".to_string()
            })
        );
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn remove_file_returns_contents() {
        let mut tree = FileTree::new();
        tree.insert_file("a/f", b"payload".to_vec()).unwrap();

        assert_eq!(tree.remove_file("a/f"), Ok(b"payload".to_vec()));
        assert!(!tree.contains_file("a/f"));
        assert!(tree.contains_dir("a"));
        assert_eq!(tree.node_count(), 1);
        assert_valid(&tree);
    }

    #[test]
    fn remove_file_root_empties_tree() {
        let mut tree = FileTree::new();
        tree.insert_file("root.txt", b"r".to_vec()).unwrap();

        assert!(matches!(
            tree.remove_file("other"),
            Err(FileTreeError::NoSuchPath { .. })
        ));
        assert_eq!(tree.remove_file("root.txt"), Ok(b"r".to_vec()));
        assert_eq!(tree.root(), None);
        assert_eq!(tree.node_count(), 0);

        tree.insert_dir("fresh").unwrap();
        assert!(tree.contains_dir("fresh"));
        assert_valid(&tree);
    }

    #[test]
    fn directory_at_file_path_is_already_in_tree() {
        let mut tree = FileTree::new();
        tree.insert_file("a/f", Vec::new()).unwrap();

        assert_eq!(
            tree.insert_dir("a/f"),
            Err(FileTreeError::AlreadyInTree {
                path: "a/f".to_string()
            })
        );
        assert_eq!(
            tree.insert_dir("a"),
            Err(FileTreeError::AlreadyInTree {
                path: "a".to_string()
            })
        );
    }

    #[test]
    fn inserting_through_a_file_is_conflicting() {
        let mut tree = FileTree::new();
        tree.insert_file("a/f", Vec::new()).unwrap();

        assert_eq!(
            tree.insert_dir("a/f/g/h"),
            Err(FileTreeError::ConflictingPath {
                path: "a/f/g/h".to_string()
            })
        );
        assert_eq!(tree.node_count(), 2);
        assert_valid(&tree);
    }

    #[rstest]
    #[case("")]
    #[case("/a")]
    #[case("a/")]
    #[case("a//b")]
    fn malformed_paths_are_rejected(#[case] path: &str) {
        let mut tree = FileTree::new();

        assert!(matches!(
            tree.insert_dir(path),
            Err(FileTreeError::InvalidPath { .. })
        ));
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn lifecycle_misuse_is_an_initialization_error() {
        let mut tree = FileTree::new();
        assert_eq!(
            tree.init(),
            Err(FileTreeError::InitializationError {
                state: LifecycleState::Initialized
            })
        );

        tree.insert_dir("a/b").unwrap();
        tree.destroy().unwrap();

        let uninitialized = Err(FileTreeError::InitializationError {
            state: LifecycleState::Uninitialized,
        });
        assert_eq!(tree.destroy(), uninitialized);
        assert_eq!(tree.insert_dir("a"), uninitialized);
        assert_eq!(tree.remove_dir("a").map(|_| ()), uninitialized);
        assert_eq!(tree.remove_file("a").map(|_| ()), uninitialized);
        assert!(!tree.contains_dir("a"));
        assert!(!tree.is_initialized());
        assert_eq!(tree.node_count(), 0);
        assert_valid(&tree);

        tree.init().unwrap();
        tree.insert_dir("c").unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_valid(&tree);
    }

    #[test]
    fn invariants_hold_across_mixed_operations() {
        let mut tree = FileTree::with_config(FileTreeConfig::new().with_invariant_checks(true));
        let owned = |path: &str| path.to_string();
        let script: [(&str, bool, bool, Result<(), FileTreeError>); 14] = [
            ("r/a/b", false, true, Ok(())),
            ("r/a/f", true, true, Ok(())),
            ("r/a", true, false, Err(FileTreeError::NotAFile { path: owned("r/a") })),
            ("r/a/f/x", false, true, Err(FileTreeError::ConflictingPath { path: owned("r/a/f/x") })),
            ("r/c", false, true, Ok(())),
            ("r/c", false, true, Err(FileTreeError::AlreadyInTree { path: owned("r/c") })),
            ("r/c/g", true, true, Ok(())),
            ("r/a/b/h", true, true, Ok(())),
            ("r/a", false, false, Ok(())),
            ("r/a", false, false, Err(FileTreeError::NoSuchPath { path: owned("r/a") })),
            ("r/c/g", true, false, Ok(())),
            ("r/d/e/f", false, true, Ok(())),
            ("r/d/e/f", false, false, Ok(())),
            ("r/c", false, false, Ok(())),
        ];

        for (path, is_file, insert, expected) in script {
            let result = match (insert, is_file) {
                (true, true) => tree.insert_file(path, path.as_bytes().to_vec()),
                (true, false) => tree.insert_dir(path),
                (false, true) => tree.remove_file(path).map(|_| ()),
                (false, false) => tree.remove_dir(path).map(|_| ()),
            };
            assert_eq!(result, expected, "unexpected result for '{path}'");
            assert_valid(&tree);
        }

        assert_eq!(tree.listing().as_deref(), Some("r\nr/d\nr/d/e\n"));
    }

    #[test]
    fn very_deep_paths_are_handled_without_recursion() {
        const DEPTH: usize = 10_000;
        let mut tree = FileTree::new();
        let deepest = vec!["d"; DEPTH].join("/");

        tree.insert_dir(&deepest).unwrap();
        assert_eq!(tree.node_count(), DEPTH);
        assert!(tree.contains_dir(&deepest));
        assert!(!tree.contains_file(&deepest));
        assert_valid(&tree);

        let file = format!("{deepest}/f");
        tree.insert_file(&file, b"deep".to_vec()).unwrap();
        assert_eq!(tree.get_contents(&file), Some(&b"deep"[..]));

        assert_eq!(tree.remove_dir("d"), Ok(DEPTH + 1));
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.root(), None);
        assert_valid(&tree);

        tree.insert_dir(&deepest).unwrap();
        tree.destroy().unwrap();
        assert_eq!(tree.arena().live(), 0);
    }
}
