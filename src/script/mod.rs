mod script_operation;
mod tree_script;

pub use script_operation::{OperationOutcome, ScriptOperation};
pub use tree_script::{ScriptError, TreeScript};
