use std::borrow::Cow;

use derive_more::Display;
use saphyr::{Scalar, Yaml};
use tracing::{debug, warn};

use crate::filesystem::{FileTree, FileTreeError, NodeStat};

/// One step of a tree script.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ScriptOperation {
    #[display("init")]
    Init,
    #[display("destroy")]
    Destroy,
    #[display("insert_dir {path}")]
    InsertDir { path: String },
    #[display("insert_file {path} ({} bytes)", contents.len())]
    InsertFile { path: String, contents: Vec<u8> },
    #[display("remove_dir {path}")]
    RemoveDir { path: String },
    #[display("remove_file {path}")]
    RemoveFile { path: String },
    #[display("contains_dir {path}")]
    ContainsDir { path: String },
    #[display("contains_file {path}")]
    ContainsFile { path: String },
    #[display("get_contents {path}")]
    GetContents { path: String },
    #[display("replace_contents {path} ({} bytes)", contents.len())]
    ReplaceContents { path: String, contents: Vec<u8> },
    #[display("stat {path}")]
    Stat { path: String },
}

/// What applying a [`ScriptOperation`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Done,
    Removed(usize),
    Contents(Option<Vec<u8>>),
    Flag(bool),
    Stat(NodeStat),
    Failed(FileTreeError),
}

impl From<Result<(), FileTreeError>> for OperationOutcome {
    fn from(result: Result<(), FileTreeError>) -> Self {
        match result {
            Ok(()) => OperationOutcome::Done,
            Err(error) => OperationOutcome::Failed(error),
        }
    }
}

impl OperationOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, OperationOutcome::Failed(_))
    }
}

impl ScriptOperation {
    /// Parses one entry of the `operations` sequence.
    ///
    /// `init` and `destroy` are bare strings. Every other operation is a single-key map
    /// whose value is either the path or a map with `path` and optional `contents`.
    pub fn from_yaml(entry: &Yaml) -> Option<Self> {
        if let Some(name) = entry.as_str() {
            return match name {
                "init" => Some(ScriptOperation::Init),
                "destroy" => Some(ScriptOperation::Destroy),
                _ => {
                    warn!("Unknown script operation '{}'. Skipping.", name);
                    None
                }
            };
        }

        let Some(mapping) = entry.as_mapping() else {
            warn!("Script operation should be a string or a map: {:?}. Skipping.", entry);
            return None;
        };
        let mut entries = mapping.iter();
        let (Some((name, arguments)), None) = (entries.next(), entries.next()) else {
            warn!("Script operation map should hold exactly one key. Skipping.");
            return None;
        };
        let Some(name) = name.as_str() else {
            warn!("Script operation name should be a string: {:?}. Skipping.", name);
            return None;
        };

        let operation = Self::from_arguments(name, arguments);
        if let Some(operation) = &operation {
            debug!("Parsed script operation: {operation}");
        }
        operation
    }

    fn from_arguments(name: &str, arguments: &Yaml) -> Option<Self> {
        let Some(path) = Self::path_argument(arguments) else {
            warn!("Script operation '{}' is missing a path. Skipping.", name);
            return None;
        };

        let operation = match name {
            "insert_dir" => ScriptOperation::InsertDir { path },
            "insert_file" => ScriptOperation::InsertFile {
                path,
                contents: Self::contents_argument(arguments),
            },
            "remove_dir" => ScriptOperation::RemoveDir { path },
            "remove_file" => ScriptOperation::RemoveFile { path },
            "contains_dir" => ScriptOperation::ContainsDir { path },
            "contains_file" => ScriptOperation::ContainsFile { path },
            "get_contents" => ScriptOperation::GetContents { path },
            "replace_contents" => ScriptOperation::ReplaceContents {
                path,
                contents: Self::contents_argument(arguments),
            },
            "stat" => ScriptOperation::Stat { path },
            _ => {
                warn!("Unknown script operation '{}'. Skipping.", name);
                return None;
            }
        };
        Some(operation)
    }

    fn path_argument(arguments: &Yaml) -> Option<String> {
        arguments
            .as_str()
            .or_else(|| Self::string_entry(arguments, "path"))
            .map(|path| path.to_string())
    }

    /// A missing `contents` key stands for an empty file.
    fn contents_argument(arguments: &Yaml) -> Vec<u8> {
        Self::string_entry(arguments, "contents")
            .map(|contents| contents.as_bytes().to_vec())
            .unwrap_or_default()
    }

    fn string_entry<'a>(arguments: &'a Yaml, key: &str) -> Option<&'a str> {
        arguments
            .as_mapping()?
            .get(&Yaml::Value(Scalar::String(Cow::Owned(key.to_string()))))?
            .as_str()
    }

    /// Runs the operation against `tree`. Tree errors are reported as
    /// [`OperationOutcome::Failed`] so a script can keep going after them.
    pub fn apply(&self, tree: &mut FileTree) -> OperationOutcome {
        match self {
            ScriptOperation::Init => tree.init().into(),
            ScriptOperation::Destroy => tree.destroy().into(),
            ScriptOperation::InsertDir { path } => tree.insert_dir(path).into(),
            ScriptOperation::InsertFile { path, contents } => {
                tree.insert_file(path, contents.clone()).into()
            }
            ScriptOperation::RemoveDir { path } => match tree.remove_dir(path) {
                Ok(removed) => OperationOutcome::Removed(removed),
                Err(error) => OperationOutcome::Failed(error),
            },
            ScriptOperation::RemoveFile { path } => match tree.remove_file(path) {
                Ok(contents) => OperationOutcome::Contents(Some(contents)),
                Err(error) => OperationOutcome::Failed(error),
            },
            ScriptOperation::ContainsDir { path } => OperationOutcome::Flag(tree.contains_dir(path)),
            ScriptOperation::ContainsFile { path } => {
                OperationOutcome::Flag(tree.contains_file(path))
            }
            ScriptOperation::GetContents { path } => {
                OperationOutcome::Contents(tree.get_contents(path).map(<[u8]>::to_vec))
            }
            ScriptOperation::ReplaceContents { path, contents } => {
                OperationOutcome::Contents(tree.replace_contents(path, contents.clone()))
            }
            ScriptOperation::Stat { path } => match tree.stat(path) {
                Ok(stat) => OperationOutcome::Stat(stat),
                Err(error) => OperationOutcome::Failed(error),
            },
        }
    }
}
