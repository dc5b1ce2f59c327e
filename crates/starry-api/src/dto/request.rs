//! Request DTOs with validation.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use starry_core::pagination::{DEFAULT_PAGE_LIMIT, PageRequest};
use starry_entity::binding::TargetType;
use starry_entity::directory::DirectoryType;

/// Validation error code answered with 404 instead of 400.
pub const NOT_FOUND_CODE: &str = "not_found";

/// `?type=` query of the tree routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryTypeQuery {
    /// Directory type; `app`, `knowledge` or `tool`.
    #[serde(rename = "type")]
    pub dir_type: Option<String>,
}

/// `?page=&limit=` query of listing routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Items per page.
    pub limit: Option<u64>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        )
    }
}

/// Create directory request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDirectoryRequest {
    /// Directory name.
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    /// Directory type.
    #[serde(rename = "type")]
    pub dir_type: DirectoryType,
    /// Parent directory ID; absent or null for a root directory.
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Rename directory request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateDirectoryRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
}

/// Move directory request body.
///
/// `parent_id` must be present: `null` moves to root level, a missing key
/// is rejected.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MoveDirectoryRequest {
    /// New parent directory ID. Outer `None` when the key is absent.
    #[serde(default, deserialize_with = "present")]
    #[validate(required(message = "parent_id is required."))]
    pub parent_id: Option<Option<String>>,
}

/// File targets into a directory.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBindingRequest {
    /// Targets to file.
    #[validate(length(min = 1, message = "target IDs is required."))]
    pub target_ids: Vec<Uuid>,
    /// Destination directory.
    pub directory_id: Uuid,
    /// Target kind; `None` for a value that names no kind.
    #[serde(rename = "type", deserialize_with = "known_target_type")]
    #[validate(required(code = "not_found", message = "Invalid binding type"))]
    pub target_type: Option<TargetType>,
}

/// Remove targets from their directories.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RemoveBindingRequest {
    /// Targets to unfile.
    #[validate(length(min = 1, message = "Target ID is required."))]
    pub target_ids: Vec<Uuid>,
    /// Target kind; `None` for a value that names no kind.
    #[serde(rename = "type", deserialize_with = "known_target_type")]
    #[validate(required(code = "not_found", message = "Invalid binding type"))]
    pub target_type: Option<TargetType>,
}

/// Marks a present key, so `null` and absent stay distinguishable.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Reads a target kind, mapping unknown names to `None`.
fn known_target_type<'de, D>(deserializer: D) -> Result<Option<TargetType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.parse().ok())
}
