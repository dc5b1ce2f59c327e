//! Route handlers organized by domain.

pub mod binding;
pub mod directory;
pub mod health;
