//! In-process store backend for single-node development and tests.

pub mod store;

pub use store::MemoryStore;
