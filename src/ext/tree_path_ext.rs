use derive_more::Display;

/// Separator between the segments of a tree path.
pub const SEPARATOR: char = '/';

/// Reason a string was rejected as a tree path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PathFault {
    #[display("path is empty")]
    Empty,
    #[display("path starts with a separator")]
    LeadingSeparator,
    #[display("path ends with a separator")]
    TrailingSeparator,
    #[display("path contains an empty segment")]
    EmptySegment,
}

pub trait TreePathExt {
    /// Builds the path of a child named `segment` below this path.
    fn join_segment(&self, segment: &str) -> String;
    /// Returns what follows `parent` and one separator, if this path lies below `parent`.
    fn strip_parent(&self, parent: &str) -> Option<&str>;
    fn is_single_segment(&self) -> bool;
    fn first_segment(&self) -> &str;
    fn validate_tree_path(&self) -> Result<(), PathFault>;
}

impl TreePathExt for str {
    fn join_segment(&self, segment: &str) -> String {
        let mut path = String::with_capacity(self.len() + 1 + segment.len());
        path.push_str(self);
        path.push(SEPARATOR);
        path.push_str(segment);
        path
    }

    fn strip_parent(&self, parent: &str) -> Option<&str> {
        self.strip_prefix(parent)?.strip_prefix(SEPARATOR)
    }

    fn is_single_segment(&self) -> bool {
        !self.is_empty() && !self.contains(SEPARATOR)
    }

    fn first_segment(&self) -> &str {
        self.split(SEPARATOR).next().unwrap_or(self)
    }

    fn validate_tree_path(&self) -> Result<(), PathFault> {
        if self.is_empty() {
            return Err(PathFault::Empty);
        }
        if self.starts_with(SEPARATOR) {
            return Err(PathFault::LeadingSeparator);
        }
        if self.ends_with(SEPARATOR) {
            return Err(PathFault::TrailingSeparator);
        }
        if self.split(SEPARATOR).any(str::is_empty) {
            return Err(PathFault::EmptySegment);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn join_segment_inserts_single_separator() {
        assert_eq!("a/b".join_segment("c"), "a/b/c");
    }

    #[rstest]
    #[case("a/b", "a", Some("b"))]
    #[case("a/b/c", "a", Some("b/c"))]
    #[case("ab", "a", None)]
    #[case("a", "a", None)]
    #[case("b/c", "a", None)]
    fn strip_parent_requires_separator_boundary(
        #[case] path: &str,
        #[case] parent: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(path.strip_parent(parent), expected);
    }

    #[rstest]
    #[case("a", true)]
    #[case("a/b", false)]
    #[case("", false)]
    fn single_segment_detection(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(path.is_single_segment(), expected);
    }

    #[test]
    fn first_segment_stops_at_separator() {
        assert_eq!("x/y/z".first_segment(), "x");
        assert_eq!("x".first_segment(), "x");
    }

    #[rstest]
    #[case("", Err(PathFault::Empty))]
    #[case("/a", Err(PathFault::LeadingSeparator))]
    #[case("a/", Err(PathFault::TrailingSeparator))]
    #[case("a//b", Err(PathFault::EmptySegment))]
    #[case("a/b/c", Ok(()))]
    #[case("file.txt", Ok(()))]
    fn validate_tree_path_cases(#[case] path: &str, #[case] expected: Result<(), PathFault>) {
        assert_eq!(path.validate_tree_path(), expected);
    }
}
