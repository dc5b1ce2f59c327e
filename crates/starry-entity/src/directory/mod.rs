//! Directory domain entities.

pub mod model;
pub mod tree;

pub use model::{CreateDirectory, Directory, DirectoryType};
pub use tree::DirectoryNode;
