//! In-memory directory and binding store guarded by one Tokio RwLock.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use starry_core::config::RebindPolicy;
use starry_core::error::AppError;
use starry_core::pagination::PageRequest;
use starry_core::result::AppResult;
use starry_entity::binding::{
    BindOutcome, BindTargets, DirectoryBinding, TargetType, UnbindTargets,
};
use starry_entity::directory::{CreateDirectory, Directory, DirectoryType};

use crate::store::{BindingStore, DirectoryStore};

/// A target row owned by another subsystem. Only the tenant and the
/// mirrored directory pointer matter here.
#[derive(Debug, Clone)]
struct TargetRow {
    tenant_id: Uuid,
    directory_id: Option<Uuid>,
}

/// Internal state shared by both store contracts.
#[derive(Debug, Default)]
struct InnerState {
    /// Directories in creation order.
    directories: Vec<Directory>,
    /// Bindings in creation order.
    bindings: Vec<DirectoryBinding>,
    /// Registered targets.
    targets: HashMap<(TargetType, Uuid), TargetRow>,
}

impl InnerState {
    fn directory(&self, id: Uuid) -> Option<&Directory> {
        self.directories.iter().find(|d| d.id == id)
    }

    fn directory_mut(&mut self, id: Uuid) -> Option<&mut Directory> {
        self.directories.iter_mut().find(|d| d.id == id)
    }

    fn scoped(&self, id: Uuid, tenant_id: Uuid) -> Option<&Directory> {
        self.directory(id).filter(|d| d.tenant_id == tenant_id)
    }

    /// Level for a child of `parent_id`, validating tenant and type.
    fn child_level(
        &self,
        tenant_id: Uuid,
        dir_type: DirectoryType,
        parent_id: Option<Uuid>,
    ) -> AppResult<i32> {
        let Some(parent_id) = parent_id else {
            return Ok(0);
        };
        let parent = self.scoped(parent_id, tenant_id).ok_or_else(|| {
            AppError::validation(format!("Parent directory {parent_id} not found"))
        })?;
        if parent.dir_type != dir_type {
            return Err(AppError::validation(format!(
                "Parent directory {parent_id} is a '{}' directory, not '{dir_type}'",
                parent.dir_type
            )));
        }
        Ok(parent.level + 1)
    }

    /// Reject a name already used by another sibling.
    fn ensure_unique_name(
        &self,
        tenant_id: Uuid,
        dir_type: DirectoryType,
        parent_id: Option<Uuid>,
        name: &str,
        except: Option<Uuid>,
    ) -> AppResult<()> {
        let taken = self.directories.iter().any(|d| {
            d.tenant_id == tenant_id
                && d.dir_type == dir_type
                && d.parent_id == parent_id
                && d.name == name
                && Some(d.id) != except
        });
        if taken {
            return Err(AppError::conflict(format!(
                "Directory name '{name}' already exists"
            )));
        }
        Ok(())
    }

    /// Ids of every descendant of `id`.
    fn descendants(&self, id: Uuid) -> Vec<Uuid> {
        let mut found = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for child in self.directories.iter().filter(|d| d.parent_id == Some(current)) {
                if seen.insert(child.id) {
                    found.push(child.id);
                    frontier.push(child.id);
                }
            }
        }
        found
    }

    /// Ids of the ancestors of `id`, nearest first.
    fn ancestors(&self, id: Uuid) -> Vec<Uuid> {
        let mut found = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.directory(id).and_then(|d| d.parent_id);
        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                break;
            }
            found.push(parent_id);
            current = self.directory(parent_id).and_then(|d| d.parent_id);
        }
        found
    }

    fn ensure_target(
        &self,
        tenant_id: Uuid,
        target_type: TargetType,
        target_id: Uuid,
    ) -> AppResult<()> {
        match self.targets.get(&(target_type, target_id)) {
            Some(row) if row.tenant_id == tenant_id => Ok(()),
            _ => Err(AppError::not_found(format!("{} not found", target_type.label()))),
        }
    }

    fn set_target_pointer(
        &mut self,
        target_type: TargetType,
        target_id: Uuid,
        directory_id: Option<Uuid>,
    ) {
        if let Some(row) = self.targets.get_mut(&(target_type, target_id)) {
            row.directory_id = directory_id;
        }
    }
}

/// In-memory implementation of [`DirectoryStore`] and [`BindingStore`].
///
/// Every mutation runs under one write guard and validates its whole input
/// before changing anything, so batches are all-or-nothing like their
/// PostgreSQL counterparts. Contents are lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Protected inner state.
    state: Arc<RwLock<InnerState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a target row so it can be bound. Targets are owned by
    /// other subsystems; this stands in for their tables.
    pub async fn insert_target(&self, tenant_id: Uuid, target_type: TargetType, target_id: Uuid) {
        let mut state = self.state.write().await;
        state.targets.insert(
            (target_type, target_id),
            TargetRow {
                tenant_id,
                directory_id: None,
            },
        );
    }

    /// The mirrored directory pointer of a registered target.
    pub async fn target_directory(
        &self,
        target_type: TargetType,
        target_id: Uuid,
    ) -> Option<Option<Uuid>> {
        let state = self.state.read().await;
        state
            .targets
            .get(&(target_type, target_id))
            .map(|row| row.directory_id)
    }

    /// Total number of binding rows.
    pub async fn binding_rows(&self) -> usize {
        self.state.read().await.bindings.len()
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn find_by_id_and_tenant(
        &self,
        id: Uuid,
        tenant_id: Uuid,
    ) -> AppResult<Option<Directory>> {
        let state = self.state.read().await;
        Ok(state.scoped(id, tenant_id).cloned())
    }

    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<Directory>> {
        let state = self.state.read().await;
        Ok(state
            .directories
            .iter()
            .filter(|d| d.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn list_by_type(
        &self,
        tenant_id: Uuid,
        dir_type: DirectoryType,
    ) -> AppResult<Vec<Directory>> {
        let state = self.state.read().await;
        Ok(state
            .directories
            .iter()
            .filter(|d| d.tenant_id == tenant_id && d.dir_type == dir_type)
            .cloned()
            .collect())
    }

    async fn create(&self, data: &CreateDirectory) -> AppResult<Directory> {
        let mut state = self.state.write().await;
        let level = state.child_level(data.tenant_id, data.dir_type, data.parent_id)?;
        state.ensure_unique_name(
            data.tenant_id,
            data.dir_type,
            data.parent_id,
            &data.name,
            None,
        )?;

        let now = Utc::now();
        let directory = Directory {
            id: Uuid::new_v4(),
            tenant_id: data.tenant_id,
            name: data.name.clone(),
            dir_type: data.dir_type,
            parent_id: data.parent_id,
            level,
            created_by: data.created_by,
            created_at: now,
            updated_at: now,
        };
        state.directories.push(directory.clone());
        Ok(directory)
    }

    async fn rename(&self, directory: &Directory, new_name: &str) -> AppResult<Directory> {
        let mut state = self.state.write().await;
        let current = state
            .scoped(directory.id, directory.tenant_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Directory {} not found", directory.id)))?;
        state.ensure_unique_name(
            current.tenant_id,
            current.dir_type,
            current.parent_id,
            new_name,
            Some(current.id),
        )?;

        let row = state
            .directory_mut(current.id)
            .ok_or_else(|| AppError::not_found(format!("Directory {} not found", current.id)))?;
        row.name = new_name.to_string();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn reparent(
        &self,
        directory: &Directory,
        new_parent_id: Option<Uuid>,
    ) -> AppResult<Directory> {
        if new_parent_id == Some(directory.id) {
            return Err(AppError::validation(
                "Directory can not be moved into itself.",
            ));
        }

        let mut state = self.state.write().await;
        let current = state
            .scoped(directory.id, directory.tenant_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Directory {} not found", directory.id)))?;
        let new_level = state.child_level(current.tenant_id, current.dir_type, new_parent_id)?;
        if let Some(parent_id) = new_parent_id {
            if state.ancestors(parent_id).contains(&current.id) {
                return Err(AppError::validation(
                    "Directory can not be moved into its own sub directory.",
                ));
            }
        }
        state.ensure_unique_name(
            current.tenant_id,
            current.dir_type,
            new_parent_id,
            &current.name,
            Some(current.id),
        )?;

        let delta = new_level - current.level;
        if delta != 0 {
            for id in state.descendants(current.id) {
                if let Some(row) = state.directory_mut(id) {
                    row.level += delta;
                }
            }
        }

        let row = state
            .directory_mut(current.id)
            .ok_or_else(|| AppError::not_found(format!("Directory {} not found", current.id)))?;
        row.parent_id = new_parent_id;
        row.level = new_level;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, directory: &Directory) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.scoped(directory.id, directory.tenant_id).is_none() {
            return Err(AppError::not_found(format!(
                "Directory {} not found",
                directory.id
            )));
        }
        if state
            .directories
            .iter()
            .any(|d| d.parent_id == Some(directory.id))
        {
            return Err(AppError::conflict(format!(
                "Directory {} can not be deleted, there is sub directory.",
                directory.id
            )));
        }

        for row in state.targets.values_mut() {
            if row.directory_id == Some(directory.id) {
                row.directory_id = None;
            }
        }
        let before = state.bindings.len();
        state.bindings.retain(|b| b.directory_id != directory.id);
        let unbound = before - state.bindings.len();
        state.directories.retain(|d| d.id != directory.id);

        debug!(
            directory_id = %directory.id,
            bindings_removed = unbound,
            "Directory row deleted"
        );
        Ok(())
    }

    async fn count_bindings(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, u64>> {
        let state = self.state.read().await;
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let mut counts = HashMap::new();
        for binding in state
            .bindings
            .iter()
            .filter(|b| wanted.contains(&b.directory_id))
        {
            *counts.entry(binding.directory_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl BindingStore for MemoryStore {
    async fn bind(&self, req: &BindTargets) -> AppResult<BindOutcome> {
        let mut state = self.state.write().await;
        if state.scoped(req.directory_id, req.tenant_id).is_none() {
            return Err(AppError::not_found(format!(
                "Directory {} not found",
                req.directory_id
            )));
        }
        for &target_id in &req.target_ids {
            state.ensure_target(req.tenant_id, req.target_type, target_id)?;
        }

        let mut outcome = BindOutcome::default();
        for &target_id in &req.target_ids {
            let current = state
                .bindings
                .iter()
                .position(|b| b.target_id == target_id);

            match current {
                Some(index) if state.bindings[index].directory_id == req.directory_id => {
                    outcome.unchanged += 1;
                }
                Some(_) if req.policy == RebindPolicy::KeepExisting => {
                    outcome.unchanged += 1;
                }
                Some(index) => {
                    let binding = &mut state.bindings[index];
                    binding.directory_id = req.directory_id;
                    binding.created_by = req.created_by;
                    binding.created_at = Utc::now();
                    state.set_target_pointer(req.target_type, target_id, Some(req.directory_id));
                    outcome.reassigned += 1;
                }
                None => {
                    state.bindings.push(DirectoryBinding {
                        id: Uuid::new_v4(),
                        directory_id: req.directory_id,
                        target_id,
                        target_type: req.target_type,
                        tenant_id: req.tenant_id,
                        created_by: req.created_by,
                        created_at: Utc::now(),
                    });
                    state.set_target_pointer(req.target_type, target_id, Some(req.directory_id));
                    outcome.created += 1;
                }
            }
        }
        Ok(outcome)
    }

    async fn unbind(&self, req: &UnbindTargets) -> AppResult<u64> {
        let mut state = self.state.write().await;
        for &target_id in &req.target_ids {
            state.ensure_target(req.tenant_id, req.target_type, target_id)?;
        }

        let mut removed = 0u64;
        for &target_id in &req.target_ids {
            let before = state.bindings.len();
            state
                .bindings
                .retain(|b| !(b.target_id == target_id && b.tenant_id == req.tenant_id));
            removed += (before - state.bindings.len()) as u64;
            state.set_target_pointer(req.target_type, target_id, None);
        }
        Ok(removed)
    }

    async fn find_by_target(&self, target_id: Uuid) -> AppResult<Option<DirectoryBinding>> {
        let state = self.state.read().await;
        Ok(state
            .bindings
            .iter()
            .find(|b| b.target_id == target_id)
            .cloned())
    }

    async fn list_by_directory(
        &self,
        tenant_id: Uuid,
        directory_id: Uuid,
        target_type: TargetType,
        page: PageRequest,
    ) -> AppResult<(Vec<DirectoryBinding>, u64)> {
        let state = self.state.read().await;
        let filed: Vec<&DirectoryBinding> = state
            .bindings
            .iter()
            .filter(|b| {
                b.tenant_id == tenant_id
                    && b.directory_id == directory_id
                    && b.target_type == target_type
            })
            .collect();
        let total = filed.len() as u64;
        let window = filed
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok((window, total))
    }
}
