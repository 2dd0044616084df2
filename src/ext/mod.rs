mod tree_path_ext;

pub use tree_path_ext::{PathFault, SEPARATOR, TreePathExt};
