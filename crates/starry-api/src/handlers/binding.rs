//! Directory binding handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::{Value, json};

use starry_core::error::AppError;
use starry_entity::binding::TargetType;

use crate::dto::request::{CreateBindingRequest, RemoveBindingRequest};
use crate::error::ApiError;
use crate::extractors::{AuthUser, validated};
use crate::middleware::rbac;
use crate::state::AppState;

/// POST /console/api/directory-bindings/create
///
/// Files the targets into the requested directory, moving any that are
/// filed elsewhere. The batch is applied atomically.
pub async fn create_bindings(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateBindingRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    rbac::require_dataset_editor(&auth)?;

    let req = validated(payload)?;
    let target_type = binding_type(req.target_type)?;

    state
        .directory_service
        .refile_targets(&auth, req.directory_id, &req.target_ids, target_type)
        .await?;

    Ok(Json(json!({})))
}

/// POST /console/api/directory-bindings/remove
pub async fn remove_bindings(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<RemoveBindingRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    rbac::require_dataset_editor(&auth)?;

    let req = validated(payload)?;
    let target_type = binding_type(req.target_type)?;

    state
        .directory_service
        .delete_directory_binding(&auth, &req.target_ids, target_type)
        .await?;

    Ok(Json(json!({})))
}

/// The body's `type` after validation; absent only for unknown names.
fn binding_type(target_type: Option<TargetType>) -> Result<TargetType, AppError> {
    target_type.ok_or_else(|| AppError::not_found("Invalid binding type"))
}
