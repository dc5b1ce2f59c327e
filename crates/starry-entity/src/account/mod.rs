//! Workspace account entities.

pub mod role;

pub use role::WorkspaceRole;
