use std::mem;

use derive_more::Display;

use super::NodeId;

/// A leaf of the tree holding an opaque byte buffer.
///
/// The buffer is moved in on creation and on replacement and moved back out on
/// replacement and removal; it is never copied.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{path}")]
pub struct FileNode {
    path: String,
    parent: Option<NodeId>,
    contents: Vec<u8>,
}

impl FileNode {
    pub(crate) fn new(path: String, parent: Option<NodeId>, contents: Vec<u8>) -> Self {
        Self {
            path,
            parent,
            contents,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn length(&self) -> usize {
        self.contents.len()
    }

    /// Swaps in `contents` and returns the previous buffer.
    pub fn replace_contents(&mut self, contents: Vec<u8>) -> Vec<u8> {
        mem::replace(&mut self.contents, contents)
    }

    pub fn into_contents(self) -> Vec<u8> {
        self.contents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_contents_hands_back_previous_buffer() {
        let mut file = FileNode::new("a/f".to_string(), None, b"old".to_vec());

        let previous = file.replace_contents(b"newer".to_vec());

        assert_eq!(previous, b"old");
        assert_eq!(file.contents(), b"newer");
        assert_eq!(file.length(), 5);
    }

    #[test]
    fn into_contents_releases_buffer() {
        let file = FileNode::new("f".to_string(), None, vec![1, 2, 3]);
        assert_eq!(file.into_contents(), vec![1, 2, 3]);
    }
}
