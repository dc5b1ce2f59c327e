//! Directory binding entity model and batch requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use starry_core::config::RebindPolicy;

use super::target::TargetType;

/// Assignment of one target to one directory. A target has at most one
/// binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DirectoryBinding {
    /// Binding row ID.
    pub id: Uuid,
    /// Directory the target is filed into.
    pub directory_id: Uuid,
    /// Bound target ID.
    pub target_id: Uuid,
    /// Bound target kind.
    pub target_type: TargetType,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Account that filed the target.
    pub created_by: Uuid,
    /// When the binding was created.
    pub created_at: DateTime<Utc>,
}

/// Batch request filing targets into a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindTargets {
    /// Acting tenant; every target must belong to it.
    pub tenant_id: Uuid,
    /// Destination directory.
    pub directory_id: Uuid,
    /// Kind of every target in the batch.
    pub target_type: TargetType,
    /// Targets to file, without duplicates.
    pub target_ids: Vec<Uuid>,
    /// Acting account.
    pub created_by: Uuid,
    /// Behaviour for targets that are already bound.
    pub policy: RebindPolicy,
}

/// Batch request removing targets from whatever directory holds them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnbindTargets {
    /// Acting tenant; every target must belong to it.
    pub tenant_id: Uuid,
    /// Kind of every target in the batch.
    pub target_type: TargetType,
    /// Targets to unfile.
    pub target_ids: Vec<Uuid>,
}

/// What a bind batch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindOutcome {
    /// Targets that had no binding before.
    pub created: u64,
    /// Existing bindings moved to the requested directory.
    pub reassigned: u64,
    /// Existing bindings left as they were.
    pub unchanged: u64,
}
