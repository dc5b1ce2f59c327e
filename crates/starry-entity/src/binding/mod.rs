//! Directory binding entities.

pub mod model;
pub mod target;

pub use model::{BindOutcome, BindTargets, DirectoryBinding, UnbindTargets};
pub use target::TargetType;
