//! In-memory file tree.
//!
//! Paths map to either directories or files holding opaque bytes. Nodes live in an
//! arena and refer to each other by index: a directory owns two sorted child sets, and
//! every child keeps a non-owning back index to its parent.

mod arena;
mod checker;
mod directory_node;
mod error;
mod file_node;
mod file_tree;
mod file_tree_queries;
mod linkage;
mod node;
mod ordered_child_set;
mod pending_chain;
mod traversal;

pub use arena::NodeArena;
pub use checker::{InvariantChecker, InvariantViolation};
pub use directory_node::DirectoryNode;
pub use error::{FileTreeError, LifecycleState, LinkageFault};
pub use file_node::FileNode;
pub use file_tree::FileTree;
pub use file_tree_queries::NodeStat;
pub use node::{Node, NodeId, NodeKind};
pub use ordered_child_set::OrderedChildSet;
pub use traversal::{PathMatch, PathTraversal};
