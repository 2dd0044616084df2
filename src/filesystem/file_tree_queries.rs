use derive_more::Display;
use tracing::debug;

use super::error::{FileTreeError, NoSuchPathSnafu};
use super::traversal::PathMatch;
use super::{FileTree, NodeId, NodeKind};

/// What [`FileTree::stat`] reports about an existing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NodeStat {
    #[display("directory")]
    Directory,
    #[display("file ({length} bytes)")]
    File { length: usize },
}

impl NodeStat {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeStat::Directory => NodeKind::Directory,
            NodeStat::File { .. } => NodeKind::File,
        }
    }
}

impl FileTree {
    pub fn contains_dir(&self, path: &str) -> bool {
        matches!(self.find(path), PathMatch::Directory(_))
    }

    pub fn contains_file(&self, path: &str) -> bool {
        matches!(self.find(path), PathMatch::File(_))
    }

    fn exact_file(&self, path: &str) -> Option<NodeId> {
        match self.find(path) {
            PathMatch::File(id) => Some(id),
            _ => None,
        }
    }

    /// Borrows the contents of the file `path`.
    pub fn get_contents(&self, path: &str) -> Option<&[u8]> {
        let id = self.exact_file(path)?;
        self.arena().file(id).map(|file| file.contents())
    }

    /// Stores `contents` in the file `path` and returns the previous contents. When
    /// `path` is not a file of the tree, `contents` is dropped and `None` is returned.
    pub fn replace_contents(&mut self, path: &str, contents: Vec<u8>) -> Option<Vec<u8>> {
        let id = self.exact_file(path)?;
        let previous = self
            .arena_mut()
            .file_mut(id)
            .map(|file| file.replace_contents(contents));
        debug!("Replaced contents of '{path}'");
        previous
    }

    pub fn stat(&self, path: &str) -> Result<NodeStat, FileTreeError> {
        self.ensure_initialized()?;

        match self.find(path) {
            PathMatch::Directory(_) => Ok(NodeStat::Directory),
            PathMatch::File(id) => {
                let length = self.arena().file(id).map_or(0, |file| file.length());
                Ok(NodeStat::File { length })
            }
            PathMatch::Ancestor(_) | PathMatch::None => NoSuchPathSnafu { path }.fail(),
        }
    }

    /// Lists every path in preorder: a directory, then its files, then each of its
    /// subdirectories, one path per line. A standalone root file lists as its bare path.
    /// Returns `None` when the tree is not initialized.
    pub fn listing(&self) -> Option<String> {
        if !self.is_initialized() {
            return None;
        }
        let Some(root) = self.root() else {
            return Some(String::new());
        };
        if let Some(file) = self.arena().file(root) {
            return Some(file.path().to_string());
        }

        let mut paths = Vec::with_capacity(self.node_count());
        self.collect_preorder(root, &mut paths);

        let mut listing = String::with_capacity(paths.iter().map(|path| path.len() + 1).sum());
        for path in paths {
            listing.push_str(path);
            listing.push('\n');
        }
        Some(listing)
    }

    fn collect_preorder<'a>(&'a self, root: NodeId, paths: &mut Vec<&'a str>) {
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            let Some(directory) = self.arena().directory(id) else {
                continue;
            };

            paths.push(directory.path());
            paths.extend(directory.files().iter().filter_map(|&file| self.arena().path(file)));
            pending.extend(directory.subdirectories().iter().rev().copied());
        }
    }
}
