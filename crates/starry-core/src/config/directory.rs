//! Directory tree behaviour switches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// What a bind call does for a target that already has a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RebindPolicy {
    /// Leave the existing binding (and the target's directory pointer)
    /// untouched. The second call is a silent no-op.
    #[default]
    KeepExisting,
    /// Move the existing binding to the directory named in the call.
    Reassign,
}

impl RebindPolicy {
    /// Return the policy as its configuration string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeepExisting => "keep_existing",
            Self::Reassign => "reassign",
        }
    }
}

impl fmt::Display for RebindPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RebindPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep_existing" => Ok(Self::KeepExisting),
            "reassign" => Ok(Self::Reassign),
            _ => Err(AppError::configuration(format!(
                "Invalid rebind policy: '{s}'. Expected one of: keep_existing, reassign"
            ))),
        }
    }
}

/// Directory service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Behaviour of bind calls for already-bound targets.
    #[serde(default)]
    pub rebind_policy: RebindPolicy,
    /// Maximum number of target ids accepted by one binding call.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            rebind_policy: RebindPolicy::default(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

fn default_max_batch_size() -> usize {
    100
}
