/// Tunables of a [`crate::filesystem::FileTree`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTreeConfig {
    max_nodes: Option<usize>,
    check_invariants: bool,
}

impl FileTreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of live nodes. Allocations beyond the cap fail with a memory error.
    pub fn with_max_nodes(mut self, max_nodes: Option<usize>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Audits the whole tree after every successful mutation and logs any violation.
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    pub fn max_nodes(&self) -> Option<usize> {
        self.max_nodes
    }

    pub fn check_invariants(&self) -> bool {
        self.check_invariants
    }
}
