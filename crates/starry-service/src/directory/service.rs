//! Directory CRUD, moves and target bindings.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use starry_core::config::{DirectoryConfig, RebindPolicy};
use starry_core::error::AppError;
use starry_core::pagination::{Page, PageRequest};
use starry_database::{BindingStore, DirectoryStore};
use starry_entity::binding::{
    BindOutcome, BindTargets, DirectoryBinding, TargetType, UnbindTargets,
};
use starry_entity::directory::{CreateDirectory, Directory, DirectoryNode, DirectoryType};

use super::tree::TreeService;
use crate::context::RequestContext;

/// Applies the directory tree rules on top of the stores.
///
/// Role checks are the caller's job; every method here assumes the
/// context has already been authorized and only enforces tenant scoping.
#[derive(Debug, Clone)]
pub struct DirectoryService {
    /// Directory store.
    directories: Arc<dyn DirectoryStore>,
    /// Binding store.
    bindings: Arc<dyn BindingStore>,
    /// Tree builder.
    tree: TreeService,
    /// Rebind policy and batch limits.
    config: DirectoryConfig,
}

/// Request to create a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDirectoryRequest {
    /// Directory name.
    pub name: String,
    /// Directory type.
    pub dir_type: DirectoryType,
    /// Parent directory ID (None for root-level).
    pub parent_id: Option<Uuid>,
}

impl DirectoryService {
    /// Creates a new directory service.
    pub fn new(
        directories: Arc<dyn DirectoryStore>,
        bindings: Arc<dyn BindingStore>,
        config: DirectoryConfig,
    ) -> Self {
        let tree = TreeService::new(Arc::clone(&directories));
        Self {
            directories,
            bindings,
            tree,
            config,
        }
    }

    /// Gets a directory of the caller's tenant by ID.
    pub async fn get_directory(
        &self,
        ctx: &RequestContext,
        directory_id: Uuid,
    ) -> Result<Directory, AppError> {
        self.directories
            .find_by_id_and_tenant(directory_id, ctx.tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Directory {directory_id} not found")))
    }

    /// Forest of every root directory of a type.
    pub async fn get_directory_tree(
        &self,
        ctx: &RequestContext,
        dir_type: DirectoryType,
    ) -> Result<Vec<DirectoryNode>, AppError> {
        self.tree.build(ctx.tenant_id, dir_type, None).await
    }

    /// The subtree rooted at `directory`, as a one-element forest.
    pub async fn get_directory_sub(
        &self,
        ctx: &RequestContext,
        dir_type: DirectoryType,
        directory: &Directory,
    ) -> Result<Vec<DirectoryNode>, AppError> {
        if directory.dir_type != dir_type {
            return Err(AppError::not_found(format!(
                "Directory {} not found",
                directory.id
            )));
        }
        self.tree
            .build(ctx.tenant_id, dir_type, Some(directory))
            .await
    }

    /// Creates a new directory.
    pub async fn create_directory(
        &self,
        ctx: &RequestContext,
        req: CreateDirectoryRequest,
    ) -> Result<Directory, AppError> {
        let name = normalize_name(&req.name)?;

        let directory = self
            .directories
            .create(&CreateDirectory {
                tenant_id: ctx.tenant_id,
                name,
                dir_type: req.dir_type,
                parent_id: req.parent_id,
                created_by: ctx.account_id,
            })
            .await?;

        info!(
            tenant_id = %ctx.tenant_id,
            account_id = %ctx.account_id,
            directory_id = %directory.id,
            dir_type = %directory.dir_type,
            level = directory.level,
            "Directory created"
        );

        Ok(directory)
    }

    /// Renames a directory.
    pub async fn update_directory(
        &self,
        ctx: &RequestContext,
        directory: &Directory,
        name: &str,
    ) -> Result<Directory, AppError> {
        let name = normalize_name(name)?;
        let updated = self.directories.rename(directory, &name).await?;

        info!(
            tenant_id = %ctx.tenant_id,
            account_id = %ctx.account_id,
            directory_id = %directory.id,
            "Directory renamed"
        );

        Ok(updated)
    }

    /// Moves a directory under a new parent, or to root level when
    /// `parent_id` is `None`.
    ///
    /// The store rejects a parent that is missing, of another type, the
    /// directory itself or one of its descendants.
    pub async fn move_directory(
        &self,
        ctx: &RequestContext,
        directory: &Directory,
        parent_id: Option<Uuid>,
    ) -> Result<Directory, AppError> {
        let moved = self.directories.reparent(directory, parent_id).await?;

        info!(
            tenant_id = %ctx.tenant_id,
            account_id = %ctx.account_id,
            directory_id = %directory.id,
            from = ?directory.parent_id,
            to = ?parent_id,
            level = moved.level,
            "Directory moved"
        );

        Ok(moved)
    }

    /// Deletes a leaf directory and its bindings.
    pub async fn delete_directory(
        &self,
        ctx: &RequestContext,
        directory: &Directory,
    ) -> Result<(), AppError> {
        self.directories.delete(directory).await?;

        info!(
            tenant_id = %ctx.tenant_id,
            account_id = %ctx.account_id,
            directory_id = %directory.id,
            "Directory deleted"
        );

        Ok(())
    }

    /// Files targets into a directory under the configured rebind policy.
    pub async fn save_directory_binding(
        &self,
        ctx: &RequestContext,
        directory_id: Uuid,
        target_ids: &[Uuid],
        target_type: TargetType,
    ) -> Result<BindOutcome, AppError> {
        let outcome = self
            .bind_targets(
                ctx,
                directory_id,
                target_ids,
                target_type,
                self.config.rebind_policy,
            )
            .await?;

        info!(
            tenant_id = %ctx.tenant_id,
            account_id = %ctx.account_id,
            directory_id = %directory_id,
            target_type = %target_type,
            created = outcome.created,
            reassigned = outcome.reassigned,
            unchanged = outcome.unchanged,
            "Directory bindings saved"
        );

        Ok(outcome)
    }

    /// Removes the bindings of targets, wherever they are filed.
    pub async fn delete_directory_binding(
        &self,
        ctx: &RequestContext,
        target_ids: &[Uuid],
        target_type: TargetType,
    ) -> Result<u64, AppError> {
        let target_ids = self.prepare_batch(target_ids)?;
        let target_count = target_ids.len();

        let removed = self
            .bindings
            .unbind(&UnbindTargets {
                tenant_id: ctx.tenant_id,
                target_type,
                target_ids,
            })
            .await?;

        info!(
            tenant_id = %ctx.tenant_id,
            account_id = %ctx.account_id,
            target_type = %target_type,
            target_count,
            removed,
            "Directory bindings removed"
        );

        Ok(removed)
    }

    /// Moves targets into `directory_id` wherever they are filed now,
    /// regardless of the configured rebind policy. The whole batch is one
    /// atomic store call: either every target ends up in the directory or
    /// none moves.
    pub async fn refile_targets(
        &self,
        ctx: &RequestContext,
        directory_id: Uuid,
        target_ids: &[Uuid],
        target_type: TargetType,
    ) -> Result<BindOutcome, AppError> {
        let outcome = self
            .bind_targets(
                ctx,
                directory_id,
                target_ids,
                target_type,
                RebindPolicy::Reassign,
            )
            .await?;

        info!(
            tenant_id = %ctx.tenant_id,
            account_id = %ctx.account_id,
            directory_id = %directory_id,
            target_type = %target_type,
            created = outcome.created,
            moved = outcome.reassigned,
            unchanged = outcome.unchanged,
            "Targets refiled"
        );

        Ok(outcome)
    }

    /// One page of the targets filed directly into `directory`, oldest
    /// first. Only targets of the kind the directory holds are listed.
    pub async fn list_directory_bindings(
        &self,
        ctx: &RequestContext,
        directory: &Directory,
        page: PageRequest,
    ) -> Result<Page<DirectoryBinding>, AppError> {
        let (bindings, total) = self
            .bindings
            .list_by_directory(
                ctx.tenant_id,
                directory.id,
                directory.dir_type.target_type(),
                page,
            )
            .await?;
        Ok(Page::new(bindings, total, page))
    }

    async fn bind_targets(
        &self,
        ctx: &RequestContext,
        directory_id: Uuid,
        target_ids: &[Uuid],
        target_type: TargetType,
        policy: RebindPolicy,
    ) -> Result<BindOutcome, AppError> {
        let target_ids = self.prepare_batch(target_ids)?;
        self.ensure_binding_directory(ctx, directory_id, target_type)
            .await?;

        self.bindings
            .bind(&BindTargets {
                tenant_id: ctx.tenant_id,
                directory_id,
                target_type,
                target_ids,
                created_by: ctx.account_id,
                policy,
            })
            .await
    }

    /// Deduplicates target ids, keeping first occurrences, and enforces
    /// the configured batch limit.
    fn prepare_batch(&self, target_ids: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        let mut seen = HashSet::with_capacity(target_ids.len());
        let unique: Vec<Uuid> = target_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        if unique.len() > self.config.max_batch_size {
            return Err(AppError::validation(format!(
                "At most {} target ids are accepted per request",
                self.config.max_batch_size
            )));
        }
        Ok(unique)
    }

    async fn ensure_binding_directory(
        &self,
        ctx: &RequestContext,
        directory_id: Uuid,
        target_type: TargetType,
    ) -> Result<Directory, AppError> {
        let directory = self.get_directory(ctx, directory_id).await?;
        if directory.dir_type.target_type() != target_type {
            return Err(AppError::validation(format!(
                "A '{}' directory can not hold '{target_type}' targets",
                directory.dir_type
            )));
        }
        Ok(directory)
    }
}

fn normalize_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Directory name cannot be empty"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use starry_core::error::ErrorKind;
    use starry_database::StoreManager;
    use starry_database::memory::MemoryStore;
    use starry_entity::account::WorkspaceRole;

    struct Fixture {
        store: MemoryStore,
        service: DirectoryService,
        ctx: RequestContext,
    }

    fn fixture(policy: RebindPolicy) -> Fixture {
        let store = MemoryStore::new();
        let stores = StoreManager::memory(store.clone());
        let config = DirectoryConfig {
            rebind_policy: policy,
            max_batch_size: 3,
        };
        Fixture {
            store,
            service: DirectoryService::new(stores.directories(), stores.bindings(), config),
            ctx: RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), WorkspaceRole::Owner),
        }
    }

    async fn create(f: &Fixture, name: &str, parent_id: Option<Uuid>) -> Directory {
        f.service
            .create_directory(
                &f.ctx,
                CreateDirectoryRequest {
                    name: name.to_string(),
                    dir_type: DirectoryType::App,
                    parent_id,
                },
            )
            .await
            .unwrap()
    }

    async fn app(f: &Fixture) -> Uuid {
        let id = Uuid::new_v4();
        f.store.insert_target(f.ctx.tenant_id, TargetType::App, id).await;
        id
    }

    #[tokio::test]
    async fn test_create_trims_and_rejects_blank_names() {
        let f = fixture(RebindPolicy::KeepExisting);
        let dir = create(&f, "  root1 ", None).await;
        assert_eq!(dir.name, "root1");
        assert_eq!(dir.level, 0);

        let err = f
            .service
            .create_directory(
                &f.ctx,
                CreateDirectoryRequest {
                    name: "   ".to_string(),
                    dir_type: DirectoryType::App,
                    parent_id: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_get_directory_is_tenant_scoped() {
        let f = fixture(RebindPolicy::KeepExisting);
        let dir = create(&f, "root1", None).await;
        assert_eq!(f.service.get_directory(&f.ctx, dir.id).await.unwrap(), dir);

        let stranger = RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), WorkspaceRole::Owner);
        let err = f.service.get_directory(&stranger, dir.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, format!("Directory {} not found", dir.id));
    }

    #[tokio::test]
    async fn test_tree_contains_new_root() {
        let f = fixture(RebindPolicy::KeepExisting);
        let dir = create(&f, "root1", None).await;

        let tree = f
            .service
            .get_directory_tree(&f.ctx, DirectoryType::App)
            .await
            .unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, dir.id);
        assert_eq!(tree[0].parent_id, None);
        assert!(tree[0].sub_dir.is_empty());
        assert_eq!(tree[0].binding_count, 0);

        let tools = f
            .service
            .get_directory_tree(&f.ctx, DirectoryType::Tool)
            .await
            .unwrap();
        assert!(tools.is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_leaf() {
        let f = fixture(RebindPolicy::KeepExisting);
        let parent = create(&f, "parent", None).await;
        let child = create(&f, "child", Some(parent.id)).await;

        let err = f.service.delete_directory(&f.ctx, &parent).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        f.service.delete_directory(&f.ctx, &child).await.unwrap();
        f.service.delete_directory(&f.ctx, &parent).await.unwrap();
        let tree = f
            .service
            .get_directory_tree(&f.ctx, DirectoryType::App)
            .await
            .unwrap();
        assert!(tree.is_empty());
    }

    #[tokio::test]
    async fn test_move_rejects_cycles() {
        let f = fixture(RebindPolicy::KeepExisting);
        let a = create(&f, "a", None).await;
        let b = create(&f, "b", Some(a.id)).await;
        let c = create(&f, "c", Some(b.id)).await;

        let err = f
            .service
            .move_directory(&f.ctx, &a, Some(a.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = f
            .service
            .move_directory(&f.ctx, &a, Some(c.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let moved = f.service.move_directory(&f.ctx, &b, None).await.unwrap();
        assert_eq!(moved.parent_id, None);
        assert_eq!(moved.level, 0);
        let c = f.service.get_directory(&f.ctx, c.id).await.unwrap();
        assert_eq!(c.level, 1);
    }

    #[tokio::test]
    async fn test_move_rejects_other_type_parent() {
        let f = fixture(RebindPolicy::KeepExisting);
        let a = create(&f, "a", None).await;
        let tools = f
            .service
            .create_directory(
                &f.ctx,
                CreateDirectoryRequest {
                    name: "tools".to_string(),
                    dir_type: DirectoryType::Tool,
                    parent_id: None,
                },
            )
            .await
            .unwrap();

        let err = f
            .service
            .move_directory(&f.ctx, &a, Some(tools.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_bind_is_idempotent_under_keep_existing() {
        let f = fixture(RebindPolicy::KeepExisting);
        let d1 = create(&f, "d1", None).await;
        let d2 = create(&f, "d2", None).await;
        let x = app(&f).await;

        let first = f
            .service
            .save_directory_binding(&f.ctx, d1.id, &[x, x], TargetType::App)
            .await
            .unwrap();
        assert_eq!(first.created, 1);

        let again = f
            .service
            .save_directory_binding(&f.ctx, d2.id, &[x], TargetType::App)
            .await
            .unwrap();
        assert_eq!(again.unchanged, 1);

        let binding = f.store.find_by_target(x).await.unwrap().unwrap();
        assert_eq!(binding.directory_id, d1.id);
        assert_eq!(
            f.store.target_directory(TargetType::App, x).await,
            Some(Some(d1.id))
        );
    }

    #[tokio::test]
    async fn test_bind_reassigns_under_reassign_policy() {
        let f = fixture(RebindPolicy::Reassign);
        let d1 = create(&f, "d1", None).await;
        let d2 = create(&f, "d2", None).await;
        let x = app(&f).await;

        f.service
            .save_directory_binding(&f.ctx, d1.id, &[x], TargetType::App)
            .await
            .unwrap();
        let outcome = f
            .service
            .save_directory_binding(&f.ctx, d2.id, &[x], TargetType::App)
            .await
            .unwrap();
        assert_eq!(outcome.reassigned, 1);
        assert_eq!(f.store.binding_rows().await, 1);
        assert_eq!(
            f.store.target_directory(TargetType::App, x).await,
            Some(Some(d2.id))
        );
    }

    #[tokio::test]
    async fn test_refile_moves_target_to_new_directory() {
        let f = fixture(RebindPolicy::KeepExisting);
        let d1 = create(&f, "d1", None).await;
        let d2 = create(&f, "d2", None).await;
        let x = app(&f).await;

        f.service
            .save_directory_binding(&f.ctx, d1.id, &[x], TargetType::App)
            .await
            .unwrap();
        f.service
            .refile_targets(&f.ctx, d2.id, &[x], TargetType::App)
            .await
            .unwrap();

        assert_eq!(f.store.binding_rows().await, 1);
        let binding = f.store.find_by_target(x).await.unwrap().unwrap();
        assert_eq!(binding.directory_id, d2.id);

        let tree = f
            .service
            .get_directory_tree(&f.ctx, DirectoryType::App)
            .await
            .unwrap();
        let counts: Vec<u64> = tree.iter().map(|n| n.binding_count).collect();
        assert_eq!(counts, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_refile_is_all_or_nothing() {
        let f = fixture(RebindPolicy::KeepExisting);
        let d1 = create(&f, "d1", None).await;
        let d2 = create(&f, "d2", None).await;
        let x = app(&f).await;

        f.service
            .save_directory_binding(&f.ctx, d1.id, &[x], TargetType::App)
            .await
            .unwrap();

        let err = f
            .service
            .refile_targets(&f.ctx, d2.id, &[x, Uuid::new_v4()], TargetType::App)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        // The known target stays filed where it was.
        let binding = f.store.find_by_target(x).await.unwrap().unwrap();
        assert_eq!(binding.directory_id, d1.id);
        assert_eq!(
            f.store.target_directory(TargetType::App, x).await,
            Some(Some(d1.id))
        );
    }

    #[tokio::test]
    async fn test_list_directory_bindings() {
        let f = fixture(RebindPolicy::KeepExisting);
        let d1 = create(&f, "d1", None).await;
        let d2 = create(&f, "d2", None).await;
        let x = app(&f).await;
        let y = app(&f).await;

        f.service
            .save_directory_binding(&f.ctx, d1.id, &[x, y], TargetType::App)
            .await
            .unwrap();

        let page = f
            .service
            .list_directory_bindings(&f.ctx, &d1, PageRequest::new(1, 1))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].target_id, x);
        assert!(page.has_more);

        let empty = f
            .service
            .list_directory_bindings(&f.ctx, &d2, PageRequest::default())
            .await
            .unwrap();
        assert!(empty.data.is_empty());
        assert!(!empty.has_more);
    }

    #[tokio::test]
    async fn test_unbind_of_unbound_target_succeeds() {
        let f = fixture(RebindPolicy::KeepExisting);
        let x = app(&f).await;

        let removed = f
            .service
            .delete_directory_binding(&f.ctx, &[x], TargetType::App)
            .await
            .unwrap();
        assert_eq!(removed, 0);

        let err = f
            .service
            .delete_directory_binding(&f.ctx, &[Uuid::new_v4()], TargetType::App)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_binding_batch_rules() {
        let f = fixture(RebindPolicy::KeepExisting);
        let d1 = create(&f, "d1", None).await;

        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let err = f
            .service
            .save_directory_binding(&f.ctx, d1.id, &ids, TargetType::App)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let x = app(&f).await;
        let err = f
            .service
            .save_directory_binding(&f.ctx, d1.id, &[x], TargetType::Tool)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = f
            .service
            .save_directory_binding(&f.ctx, Uuid::new_v4(), &[x], TargetType::App)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
