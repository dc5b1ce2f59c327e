//! Directory tree handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use tracing::warn;

use starry_core::error::AppError;
use starry_core::pagination::Page;
use starry_entity::binding::DirectoryBinding;
use starry_entity::directory::{Directory, DirectoryType};
use starry_service::directory::CreateDirectoryRequest as SvcCreateDirectory;

use crate::dto::request::{
    CreateDirectoryRequest, DirectoryTypeQuery, MoveDirectoryRequest, PageQuery,
    UpdateDirectoryRequest,
};
use crate::dto::response::{DirectoryCreatedResponse, DirectoryTreeResponse, ResultResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_optional_uuid, parse_uuid, validated};
use crate::middleware::rbac;
use crate::state::AppState;

const CREATE_FAILED: &str = "create directory failed, please change another directory name.";
const UPDATE_FAILED: &str = "update directory failed, please change another directory name.";

/// GET /console/api/directory?type=
pub async fn get_directory_tree(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DirectoryTypeQuery>,
) -> Result<Json<DirectoryTreeResponse>, ApiError> {
    rbac::require_editor(&auth)?;

    let dir_type = match query.dir_type.as_deref() {
        Some(value) => value.parse::<DirectoryType>()?,
        None => DirectoryType::App,
    };

    let dir_tree = state
        .directory_service
        .get_directory_tree(&auth, dir_type)
        .await?;
    Ok(Json(DirectoryTreeResponse { dir_tree }))
}

/// POST /console/api/directory
pub async fn create_directory(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateDirectoryRequest>, JsonRejection>,
) -> Result<Json<DirectoryCreatedResponse>, ApiError> {
    rbac::require_admin_or_owner(&auth)?;

    let req = validated(payload)?;
    let parent_id = parse_optional_uuid(req.parent_id.as_deref(), "parent_id")?;

    let directory = state
        .directory_service
        .create_directory(
            &auth,
            SvcCreateDirectory {
                name: req.name,
                dir_type: req.dir_type,
                parent_id,
            },
        )
        .await
        .map_err(|e| persistence_failure(e, CREATE_FAILED))?;

    Ok(Json(DirectoryCreatedResponse {
        message: "Directory created successfully".to_string(),
        directory_id: directory.id,
    }))
}

/// GET /console/api/directory/{id}?type=
pub async fn get_directory_sub(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<DirectoryTypeQuery>,
) -> Result<Json<DirectoryTreeResponse>, ApiError> {
    rbac::require_editor(&auth)?;

    let directory = load_directory(&state, &auth, &id).await?;
    let dir_type = query
        .dir_type
        .as_deref()
        .ok_or_else(|| AppError::validation("only support app/knowledge/tool."))?
        .parse::<DirectoryType>()?;

    let dir_tree = state
        .directory_service
        .get_directory_sub(&auth, dir_type, &directory)
        .await?;
    Ok(Json(DirectoryTreeResponse { dir_tree }))
}

/// PATCH /console/api/directory/{id}
pub async fn update_directory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDirectoryRequest>, JsonRejection>,
) -> Result<Json<ResultResponse>, ApiError> {
    rbac::require_admin_or_owner(&auth)?;

    let directory = load_directory(&state, &auth, &id).await?;
    let req = validated(payload)?;

    state
        .directory_service
        .update_directory(&auth, &directory, &req.name)
        .await
        .map_err(|e| persistence_failure(e, UPDATE_FAILED))?;

    Ok(Json(ResultResponse::success("Directory updated successfully")))
}

/// PUT /console/api/directory/{id}
pub async fn move_directory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<MoveDirectoryRequest>, JsonRejection>,
) -> Result<Json<ResultResponse>, ApiError> {
    rbac::require_admin_or_owner(&auth)?;

    let directory = load_directory(&state, &auth, &id).await?;
    let req = validated(payload)?;
    let parent_id = req
        .parent_id
        .ok_or_else(|| AppError::validation("parent_id is required."))?;
    let parent_id = parse_optional_uuid(parent_id.as_deref(), "parent_id")?;

    state
        .directory_service
        .move_directory(&auth, &directory, parent_id)
        .await?;

    Ok(Json(ResultResponse::success("Directory moved successfully")))
}

/// GET /console/api/directory/{id}/bindings?page=&limit=
pub async fn list_directory_bindings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<DirectoryBinding>>, ApiError> {
    rbac::require_editor(&auth)?;

    let directory = load_directory(&state, &auth, &id).await?;
    let page = state
        .directory_service
        .list_directory_bindings(&auth, &directory, query.into())
        .await?;
    Ok(Json(page))
}

/// DELETE /console/api/directory/{id}
pub async fn delete_directory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ResultResponse>, ApiError> {
    rbac::require_admin_or_owner(&auth)?;

    let directory = load_directory(&state, &auth, &id).await?;
    state
        .directory_service
        .delete_directory(&auth, &directory)
        .await?;

    Ok(Json(ResultResponse::success("Directory deleted successfully")))
}

/// Resolves the `{id}` path segment to a directory of the caller's tenant.
async fn load_directory(state: &AppState, auth: &AuthUser, id: &str) -> Result<Directory, AppError> {
    let id = parse_uuid(id, "directory_id")?;
    state.directory_service.get_directory(auth, id).await
}

/// Create and rename report storage failures with a fixed message; the
/// cause only goes to the log.
fn persistence_failure(err: AppError, message: &'static str) -> AppError {
    if err.is_persistence() {
        warn!(error = %err, "Directory write rejected by store");
        return AppError::validation(message);
    }
    err
}
