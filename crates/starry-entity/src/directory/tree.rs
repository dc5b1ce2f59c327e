//! Nested directory views returned by tree queries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Directory, DirectoryType};

/// A directory together with its children and direct binding count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryNode {
    /// Directory ID.
    pub id: Uuid,
    /// Directory name.
    pub name: String,
    /// Directory type.
    #[serde(rename = "type")]
    pub dir_type: DirectoryType,
    /// Depth level.
    pub level: i32,
    /// Parent directory ID.
    pub parent_id: Option<Uuid>,
    /// Child directories in creation order.
    pub sub_dir: Vec<DirectoryNode>,
    /// Number of targets bound directly to this directory.
    pub binding_count: u64,
}

impl DirectoryNode {
    /// Build a node for `directory` with no children attached yet.
    pub fn new(directory: &Directory, binding_count: u64) -> Self {
        Self {
            id: directory.id,
            name: directory.name.clone(),
            dir_type: directory.dir_type,
            level: directory.level,
            parent_id: directory.parent_id,
            sub_dir: Vec::new(),
            binding_count,
        }
    }

    /// Total number of nodes in this subtree, the node itself included.
    pub fn node_count(&self) -> usize {
        1 + self.sub_dir.iter().map(DirectoryNode::node_count).sum::<usize>()
    }
}
