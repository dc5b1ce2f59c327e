//! PostgreSQL implementations of the store contracts.

pub mod binding;
pub mod directory;

pub use binding::BindingRepository;
pub use directory::DirectoryRepository;
