use derive_more::Display;
use snafu::Snafu;

use crate::ext::PathFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LifecycleState {
    #[display("initialized")]
    Initialized,
    #[display("uninitialized")]
    Uninitialized,
}

/// Structural reason a link or unlink between two nodes was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LinkageFault {
    #[display("the parent is not a directory of this tree")]
    ParentNotDirectory,
    #[display("the child is not a node of this tree")]
    MissingChild,
    #[display("the child path does not extend the parent path")]
    NotUnderParent,
    #[display("the child path is more than one segment below the parent")]
    Grandchild,
    #[display("the child is not linked under the parent")]
    NotLinked,
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FileTreeError {
    #[snafu(display("Operation not permitted while the file tree is {state}"))]
    InitializationError { state: LifecycleState },
    #[snafu(display("'{path}' is already in the tree"))]
    AlreadyInTree { path: String },
    #[snafu(display("'{path}' conflicts with a file already in the tree"))]
    ConflictingPath { path: String },
    #[snafu(display("Failed to allocate a node for '{path}'"))]
    MemoryError { path: String },
    #[snafu(display("Cannot link '{child}' under '{parent}': {fault}"))]
    LinkageError {
        parent: String,
        child: String,
        fault: LinkageFault,
    },
    #[snafu(display("'{path}' is not in the tree"))]
    NoSuchPath { path: String },
    #[snafu(display("'{path}' is a file, not a directory"))]
    NotADirectory { path: String },
    #[snafu(display("'{path}' is a directory, not a file"))]
    NotAFile { path: String },
    #[snafu(display("'{path}' is not a valid tree path: {fault}"))]
    InvalidPath { path: String, fault: PathFault },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_path() {
        let conflicting = FileTreeError::ConflictingPath {
            path: "other".to_string(),
        };
        let linkage = FileTreeError::LinkageError {
            parent: "a".to_string(),
            child: "a/b/c".to_string(),
            fault: LinkageFault::Grandchild,
        };
        let lifecycle = FileTreeError::InitializationError {
            state: LifecycleState::Uninitialized,
        };

        assert_eq!(
            conflicting.to_string(),
            "'other' conflicts with a file already in the tree"
        );
        assert!(linkage.to_string().contains("more than one segment"));
        assert!(lifecycle.to_string().ends_with("uninitialized"));
    }
}
