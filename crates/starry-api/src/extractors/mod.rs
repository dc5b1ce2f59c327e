//! Custom Axum extractors.

pub mod auth;
pub mod json;
pub mod path;

pub use auth::AuthUser;
pub use json::validated;
pub use path::{parse_optional_uuid, parse_uuid};
