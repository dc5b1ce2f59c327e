//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use starry_entity::directory::DirectoryNode;

/// Nested directory forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryTreeResponse {
    /// Root nodes with their subtrees.
    pub dir_tree: Vec<DirectoryNode>,
}

/// Reply to a successful create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryCreatedResponse {
    /// Status message.
    pub message: String,
    /// Generated directory ID.
    pub directory_id: Uuid,
}

/// Reply to a successful rename, move or delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultResponse {
    /// Always `"success"`.
    pub result: String,
    /// Status message.
    pub message: String,
}

impl ResultResponse {
    /// Creates a success reply.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            result: "success".to_string(),
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`; failures are reported as 503.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Store backend in use.
    pub store: String,
}
