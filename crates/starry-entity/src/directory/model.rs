//! Directory entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use starry_core::AppError;

use crate::binding::TargetType;

/// Kind of entity a directory tree organises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "directory_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DirectoryType {
    /// Holds apps.
    App,
    /// Holds knowledge datasets.
    Knowledge,
    /// Holds tool providers.
    Tool,
}

impl DirectoryType {
    /// All directory types, in display order.
    pub const ALL: [DirectoryType; 3] = [Self::App, Self::Knowledge, Self::Tool];

    /// Return the type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Knowledge => "knowledge",
            Self::Tool => "tool",
        }
    }

    /// The only target type that may be filed into a directory of this type.
    pub fn target_type(&self) -> TargetType {
        match self {
            Self::App => TargetType::App,
            Self::Knowledge => TargetType::Knowledge,
            Self::Tool => TargetType::Tool,
        }
    }
}

impl fmt::Display for DirectoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectoryType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(Self::App),
            "knowledge" => Ok(Self::Knowledge),
            "tool" => Ok(Self::Tool),
            _ => Err(AppError::validation("only support app/knowledge/tool.")),
        }
    }
}

/// A node in a tenant's directory forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Directory {
    /// Unique directory identifier.
    pub id: Uuid,
    /// Owning tenant workspace.
    pub tenant_id: Uuid,
    /// Display name, unique among siblings.
    pub name: String,
    /// What the directory organises.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub dir_type: DirectoryType,
    /// Parent directory (null for root-level directories).
    pub parent_id: Option<Uuid>,
    /// Depth in the tree (0 for root level).
    pub level: i32,
    /// Account that created the directory.
    pub created_by: Uuid,
    /// When the directory was created.
    pub created_at: DateTime<Utc>,
    /// When the directory was last renamed or moved.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new directory. The level is derived by the
/// store from the parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDirectory {
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Directory name.
    pub name: String,
    /// Directory type.
    pub dir_type: DirectoryType,
    /// Parent directory (None for root level).
    pub parent_id: Option<Uuid>,
    /// Creating account.
    pub created_by: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_type_parsing() {
        assert_eq!("app".parse::<DirectoryType>().unwrap(), DirectoryType::App);
        assert_eq!(
            "knowledge".parse::<DirectoryType>().unwrap(),
            DirectoryType::Knowledge
        );
        let err = "dataset".parse::<DirectoryType>().unwrap_err();
        assert_eq!(err.kind, starry_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_type_serializes_under_type_key() {
        let now = Utc::now();
        let dir = Directory {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "root1".into(),
            dir_type: DirectoryType::Tool,
            parent_id: None,
            level: 0,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&dir).unwrap();
        assert_eq!(json["type"], "tool");
        assert!(json["parent_id"].is_null());
    }
}
