use std::{
    borrow::Cow,
    io::Cursor,
    path::{Path, PathBuf},
};

use compio::{fs::File, io::AsyncReadExt, io::BufReader};
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::config::FileTreeConfig;
use crate::script::ScriptOperation;

const SCRIPT_FILE_NAME: &str = "tree.yaml";

fn get_script_file_path(root: &Path) -> PathBuf {
    root.join(SCRIPT_FILE_NAME)
}

fn key(name: &str) -> Yaml {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

/// A sequence of tree operations together with the configuration of the tree they run
/// against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeScript {
    config: FileTreeConfig,
    operations: Vec<ScriptOperation>,
}

impl TreeScript {
    /// Reads `tree.yaml` from `root`.
    pub async fn read(root: &Path) -> Result<Self, ScriptError> {
        Self::from_path(get_script_file_path(root)).await
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, ScriptError> {
        debug!("Opening tree script: {}", path.display());
        let file = File::open(&path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;

        let mut reader = BufReader::new(Cursor::new(file));
        let res = reader.read_to_end(Vec::new()).await;
        let count = res.0.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        debug!("Successfully read tree script: {count} bytes");

        let contents = String::from_utf8(res.1).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    pub fn config(&self) -> &FileTreeConfig {
        &self.config
    }

    pub fn operations(&self) -> &[ScriptOperation] {
        &self.operations
    }

    fn parse_config(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<FileTreeConfig, ScriptError> {
        let max_nodes = match top_level.get(&key("max_nodes")) {
            None | Some(Yaml::Value(Scalar::Null)) => None,
            Some(Yaml::Value(Scalar::Integer(value))) => Some(
                usize::try_from(*value).map_err(|_| ScriptError::InvalidMaxNodes)?,
            ),
            Some(_) => return Err(ScriptError::InvalidMaxNodes),
        };
        let check_invariants = match top_level.get(&key("check_invariants")) {
            None => false,
            Some(Yaml::Value(Scalar::Boolean(value))) => *value,
            Some(_) => return Err(ScriptError::InvalidCheckInvariants),
        };

        Ok(FileTreeConfig::new()
            .with_max_nodes(max_nodes)
            .with_invariant_checks(check_invariants))
    }

    fn parse_operations(
        top_level: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<Vec<ScriptOperation>, ScriptError> {
        let Some(operations) = top_level.get(&key("operations")) else {
            return Ok(Vec::new());
        };

        let operations = operations
            .as_sequence()
            .ok_or(ScriptError::OperationsNotSequence)?
            .iter()
            .filter_map(ScriptOperation::from_yaml)
            .collect::<Vec<_>>();

        Ok(operations)
    }
}

impl TryFrom<&str> for TreeScript {
    type Error = ScriptError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents.first().ok_or(ScriptError::MalformedScript)?;

        let top_level = document
            .as_mapping()
            .ok_or(ScriptError::TopLevelNotMap)?;

        let config = Self::parse_config(top_level)?;
        let operations = Self::parse_operations(top_level)?;
        debug!("Parsed {} script operations", operations.len());

        Ok(TreeScript { config, operations })
    }
}

#[derive(Debug, Snafu)]
pub enum ScriptError {
    #[snafu(display("Failed to read the tree script: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The tree script is not valid UTF-8: {}", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the tree script"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted tree script"))]
    MalformedScript,
    #[snafu(display("Top level of the tree script should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Operations section should be a sequence"))]
    OperationsNotSequence,
    #[snafu(display("max_nodes should be a non-negative integer"))]
    InvalidMaxNodes,
    #[snafu(display("check_invariants should be a boolean"))]
    InvalidCheckInvariants,
}
