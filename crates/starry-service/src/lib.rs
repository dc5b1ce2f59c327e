//! # starry-service
//!
//! Business rules of the directory tree. Services receive their stores at
//! construction time as `Arc<dyn ...>` handles and never talk to a
//! particular backend directly.

pub mod context;
pub mod directory;

pub use context::RequestContext;
pub use directory::{CreateDirectoryRequest, DirectoryService, TreeService};
