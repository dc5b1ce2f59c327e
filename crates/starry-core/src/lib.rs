//! # starry-core
//!
//! Core crate for the Starry console directory service. Contains the
//! configuration schemas, the unified error system and pagination types.
//!
//! This crate has **no** internal dependencies on other Starry crates.

pub mod config;
pub mod error;
pub mod pagination;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
