mod tree_config;

pub use tree_config::FileTreeConfig;
