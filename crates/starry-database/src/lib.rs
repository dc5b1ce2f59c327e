//! # starry-database
//!
//! Persistence for the directory tree. The [`store`] module defines the
//! store contracts; [`repositories`] implements them on PostgreSQL and
//! [`memory`] implements them in-process. [`StoreManager`] picks one at
//! runtime based on configuration.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::connect_pool;
pub use store::{BindingStore, DirectoryStore, StoreManager};
