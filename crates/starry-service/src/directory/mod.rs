//! Directory tree services.

pub mod service;
pub mod tree;

pub use service::{CreateDirectoryRequest, DirectoryService};
pub use tree::TreeService;
