//! Directory tree assembly.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use starry_core::error::AppError;
use starry_database::DirectoryStore;
use starry_entity::directory::{Directory, DirectoryNode, DirectoryType};

/// Builds nested directory views with direct binding counts.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Directory store.
    directories: Arc<dyn DirectoryStore>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(directories: Arc<dyn DirectoryStore>) -> Self {
        Self { directories }
    }

    /// Builds the forest of every root directory of `dir_type` in the
    /// tenant, or the single subtree under `root` when one is given.
    ///
    /// Two store round trips: the flat list of the tenant's directories of
    /// that type and one grouped binding count.
    pub async fn build(
        &self,
        tenant_id: Uuid,
        dir_type: DirectoryType,
        root: Option<&Directory>,
    ) -> Result<Vec<DirectoryNode>, AppError> {
        let directories = self.directories.list_by_type(tenant_id, dir_type).await?;
        let ids: Vec<Uuid> = directories.iter().map(|d| d.id).collect();
        let counts = self.directories.count_bindings(&ids).await?;

        let forest = assemble_forest(&directories, &counts, root.map(|d| d.id));
        debug!(
            tenant_id = %tenant_id,
            dir_type = %dir_type,
            loaded = directories.len(),
            nodes = forest.iter().map(DirectoryNode::node_count).sum::<usize>(),
            "Directory tree assembled"
        );
        Ok(forest)
    }
}

/// Nests a flat directory list.
///
/// With `start = None` every directory without a parent becomes a root;
/// otherwise only the directory with that id does (empty result when it is
/// not in the list). Children keep the order of `directories`. Each id is
/// emitted at most once, so corrupt cyclic rows cannot recurse forever.
pub fn assemble_forest(
    directories: &[Directory],
    counts: &HashMap<Uuid, u64>,
    start: Option<Uuid>,
) -> Vec<DirectoryNode> {
    let mut children: HashMap<Uuid, Vec<&Directory>> = HashMap::new();
    let mut roots = Vec::new();
    for directory in directories {
        match directory.parent_id {
            Some(parent_id) => children.entry(parent_id).or_default().push(directory),
            None => roots.push(directory),
        }
    }

    let starts: Vec<&Directory> = match start {
        Some(id) => directories.iter().filter(|d| d.id == id).collect(),
        None => roots,
    };

    let mut visited = HashSet::new();
    starts
        .into_iter()
        .filter_map(|directory| build_node(directory, &children, counts, &mut visited))
        .collect()
}

fn build_node(
    directory: &Directory,
    children: &HashMap<Uuid, Vec<&Directory>>,
    counts: &HashMap<Uuid, u64>,
    visited: &mut HashSet<Uuid>,
) -> Option<DirectoryNode> {
    if !visited.insert(directory.id) {
        warn!(directory_id = %directory.id, "Directory cycle detected, skipping node");
        return None;
    }

    let binding_count = counts.get(&directory.id).copied().unwrap_or(0);
    let mut node = DirectoryNode::new(directory, binding_count);
    if let Some(kids) = children.get(&directory.id) {
        node.sub_dir = kids
            .iter()
            .filter_map(|child| build_node(child, children, counts, visited))
            .collect();
    }
    Some(node)
}
