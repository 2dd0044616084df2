use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::{OutcomePrinter, RuntimeConfig};
use crate::filesystem::{FileTree, InvariantChecker, InvariantViolation};
use crate::script::{OperationOutcome, ScriptError, ScriptOperation, TreeScript};

pub struct Application;

impl Application {
    pub async fn run(runtime_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        let script = Self::load_script(&runtime_config).await?;
        debug!("Loaded script: {:?}", script);

        let printer = OutcomePrinter::detect();
        let tree = Self::execute(&script, runtime_config.check, |operation, outcome| {
            printer.print(operation, outcome)
        })?;

        match tree.listing() {
            Some(listing) => printer.print_listing(&listing),
            None => warn!("The file tree was left destroyed; nothing to list"),
        }
        Ok(())
    }

    async fn load_script(runtime_config: &RuntimeConfig) -> Result<TreeScript, ApplicationError> {
        let script = match &runtime_config.script {
            Some(path) => TreeScript::from_path(path.clone()).await,
            None => TreeScript::read(&runtime_config.root).await,
        };
        script.context(ScriptSnafu)
    }

    /// Applies every operation of `script` to a fresh tree and hands each outcome to
    /// `report`. With `check`, the tree is audited after every mutation and once more at
    /// the end; a final violation fails the run.
    pub fn execute(
        script: &TreeScript,
        check: bool,
        mut report: impl FnMut(&ScriptOperation, &OperationOutcome),
    ) -> Result<FileTree, ApplicationError> {
        let config = script
            .config()
            .clone()
            .with_invariant_checks(check || script.config().check_invariants());
        let mut tree = FileTree::with_config(config);

        let mut failures = 0;
        for operation in script.operations() {
            let outcome = operation.apply(&mut tree);
            if outcome.is_failure() {
                failures += 1;
            }
            report(operation, &outcome);
        }
        info!(
            "Applied {} operations ({} failed), {} nodes in the tree",
            script.operations().len(),
            failures,
            tree.node_count()
        );

        if check {
            InvariantChecker::check_tree(&tree).context(InvariantSnafu)?;
            info!("File tree invariants hold");
        }
        Ok(tree)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the tree script"))]
    ScriptError { source: ScriptError },
    #[snafu(display("The file tree is inconsistent"))]
    InvariantError { source: InvariantViolation },
}
