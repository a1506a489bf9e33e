mod ignores;
mod tree;
mod walker;

pub use ignores::{is_ignored, IgnoreEngine, DEFAULT_IGNORES};
pub use tree::build_tree;
pub use walker::{collect, has_allowed_extension, relative_path, CollectedFile};
