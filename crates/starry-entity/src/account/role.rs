//! Workspace role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role an account holds inside the current tenant workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceRole {
    /// Workspace owner.
    Owner,
    /// Workspace administrator.
    Admin,
    /// Can build apps and tools.
    Editor,
    /// Regular member.
    Normal,
    /// Can manage knowledge datasets only.
    DatasetOperator,
}

impl WorkspaceRole {
    /// Owner or admin.
    pub fn is_admin_or_owner(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Owner, admin or editor.
    pub fn is_editor(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin | Self::Editor)
    }

    /// Any role allowed to manage datasets, editors included.
    pub fn is_dataset_editor(&self) -> bool {
        self.is_editor() || matches!(self, Self::DatasetOperator)
    }

    /// Return the role as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Normal => "normal",
            Self::DatasetOperator => "dataset_operator",
        }
    }
}

impl fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkspaceRole {
    type Err = starry_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "normal" => Ok(Self::Normal),
            "dataset_operator" => Ok(Self::DatasetOperator),
            _ => Err(starry_core::AppError::validation(format!(
                "Invalid workspace role: '{s}'. Expected one of: owner, admin, editor, normal, dataset_operator"
            ))),
        }
    }
}
