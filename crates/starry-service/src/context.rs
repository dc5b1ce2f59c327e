//! Request context carrying the acting tenant, account and workspace role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use starry_entity::account::WorkspaceRole;

/// Context for the current request.
///
/// Built by the HTTP layer from gateway headers (or by the CLI) and passed
/// into every service method so each operation knows *which* tenant it is
/// scoped to and *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The tenant workspace every lookup is scoped to.
    pub tenant_id: Uuid,
    /// The acting account.
    pub account_id: Uuid,
    /// The account's role inside the tenant.
    pub role: WorkspaceRole,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(tenant_id: Uuid, account_id: Uuid, role: WorkspaceRole) -> Self {
        Self {
            tenant_id,
            account_id,
            role,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the account may manage the directory tree itself.
    pub fn can_manage_directories(&self) -> bool {
        self.role.is_admin_or_owner()
    }

    /// Returns whether the account may read the directory tree.
    pub fn can_view_directories(&self) -> bool {
        self.role.is_editor()
    }

    /// Returns whether the account may file targets into directories.
    pub fn can_bind_targets(&self) -> bool {
        self.role.is_dataset_editor()
    }
}
