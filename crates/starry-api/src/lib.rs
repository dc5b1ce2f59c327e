//! # starry-api
//!
//! HTTP API layer of the Starry console built on Axum.
//!
//! Provides the directory and directory-binding endpoints, the gateway
//! header extractor, role guards, request logging, DTOs and the mapping of
//! [`starry_core::AppError`] onto HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
