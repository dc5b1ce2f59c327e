//! # starry-entity
//!
//! Domain entity models for the Starry console directory tree. Every
//! struct in this crate represents a database table row or a domain value
//! object. Database entities additionally derive `sqlx::FromRow`.

pub mod account;
pub mod binding;
pub mod directory;
