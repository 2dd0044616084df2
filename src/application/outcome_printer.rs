use colored::Colorize;
use supports_color::Stream;

use crate::script::{OperationOutcome, ScriptOperation};

/// Writes operation outcomes and the final listing to stdout.
#[derive(Debug, Clone, Copy)]
pub struct OutcomePrinter {
    colored: bool,
}

impl OutcomePrinter {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// Colours output only when stdout supports it.
    pub fn detect() -> Self {
        Self::new(supports_color::on(Stream::Stdout).is_some())
    }

    pub fn format(&self, operation: &ScriptOperation, outcome: &OperationOutcome) -> String {
        let result = match outcome {
            OperationOutcome::Done => "ok".to_string(),
            OperationOutcome::Removed(count) => format!("removed {count} nodes"),
            OperationOutcome::Contents(Some(contents)) => {
                format!("{:?}", String::from_utf8_lossy(contents))
            }
            OperationOutcome::Contents(None) => "none".to_string(),
            OperationOutcome::Flag(flag) => flag.to_string(),
            OperationOutcome::Stat(stat) => stat.to_string(),
            OperationOutcome::Failed(error) => format!("error: {error}"),
        };

        if !self.colored {
            return format!("{operation}: {result}");
        }
        let result = if outcome.is_failure() {
            result.red()
        } else {
            result.green()
        };
        format!("{}: {}", operation.to_string().cyan(), result)
    }

    pub fn print(&self, operation: &ScriptOperation, outcome: &OperationOutcome) {
        println!("{}", self.format(operation, outcome));
    }

    pub fn print_listing(&self, listing: &str) {
        if listing.is_empty() {
            println!("(empty tree)");
        } else if listing.ends_with('\n') {
            print!("{listing}");
        } else {
            println!("{listing}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{FileTreeError, NodeStat};
    use rstest::rstest;

    fn stat_a() -> ScriptOperation {
        ScriptOperation::Stat {
            path: "a".to_string(),
        }
    }

    #[rstest]
    #[case(OperationOutcome::Done, "stat a: ok")]
    #[case(OperationOutcome::Removed(3), "stat a: removed 3 nodes")]
    #[case(OperationOutcome::Contents(Some(b"hi".to_vec())), "stat a: \"hi\"")]
    #[case(OperationOutcome::Contents(None), "stat a: none")]
    #[case(OperationOutcome::Flag(false), "stat a: false")]
    #[case(OperationOutcome::Stat(NodeStat::File { length: 2 }), "stat a: file (2 bytes)")]
    #[case(
        OperationOutcome::Failed(FileTreeError::NoSuchPath { path: "a".to_string() }),
        "stat a: error: 'a' is not in the tree"
    )]
    fn outcomes_are_formatted(#[case] outcome: OperationOutcome, #[case] expected: &str) {
        assert_eq!(OutcomePrinter::new(false).format(&stat_a(), &outcome), expected);
    }

    #[test]
    fn colored_output_keeps_the_text() {
        let line = OutcomePrinter::new(true).format(&stat_a(), &OperationOutcome::Flag(true));
        assert!(line.contains("stat a"));
        assert!(line.contains("true"));
    }
}
