//! Bindable target kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use starry_core::AppError;

/// Kind of external entity that can be filed into a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "binding_target_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// An app.
    App,
    /// A knowledge dataset.
    Knowledge,
    /// An API tool provider.
    Tool,
}

impl TargetType {
    /// All target types.
    pub const ALL: [TargetType; 3] = [Self::App, Self::Knowledge, Self::Tool];

    /// Return the type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Knowledge => "knowledge",
            Self::Tool => "tool",
        }
    }

    /// Table holding rows of this target kind.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::App => "apps",
            Self::Knowledge => "datasets",
            Self::Tool => "tool_api_providers",
        }
    }

    /// Human label used in not-found messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::App => "App",
            Self::Knowledge => "Dataset",
            Self::Tool => "Tool",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = AppError;

    /// Unknown kinds are reported as not found, matching the lookup that
    /// would have failed for them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(Self::App),
            "knowledge" => Ok(Self::Knowledge),
            "tool" => Ok(Self::Tool),
            _ => Err(AppError::not_found("Invalid binding type")),
        }
    }
}
