//! `AuthUser` extractor: reads the gateway identity headers and builds the
//! request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use starry_core::error::AppError;
use starry_entity::account::WorkspaceRole;
use starry_service::context::RequestContext;

use crate::error::ApiError;

/// Tenant the caller is acting in.
pub const TENANT_HEADER: &str = "x-tenant-id";
/// Acting account.
pub const ACCOUNT_HEADER: &str = "x-account-id";
/// Workspace role of the acting account inside the tenant.
pub const ROLE_HEADER: &str = "x-account-role";

/// Extracted caller context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = header_uuid(parts, TENANT_HEADER)?;
        let account_id = header_uuid(parts, ACCOUNT_HEADER)?;
        let role = header_str(parts, ROLE_HEADER)?
            .parse::<WorkspaceRole>()
            .map_err(|_| AppError::authentication(format!("Invalid {ROLE_HEADER} header")))?;

        Ok(AuthUser(RequestContext::new(tenant_id, account_id, role)))
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::authentication(format!("Missing {name} header")))
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Uuid, AppError> {
    header_str(parts, name)?
        .parse::<Uuid>()
        .map_err(|_| AppError::authentication(format!("Invalid {name} header")))
}
