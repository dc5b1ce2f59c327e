//! Directory binding repository implementation.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use starry_core::config::RebindPolicy;
use starry_core::error::AppError;
use starry_core::pagination::PageRequest;
use starry_core::result::AppResult;
use starry_entity::binding::{
    BindOutcome, BindTargets, DirectoryBinding, TargetType, UnbindTargets,
};

use crate::store::{BindingStore, db_error};

/// Repository for directory bindings and the mirrored target pointers.
#[derive(Debug, Clone)]
pub struct BindingRepository {
    pool: PgPool,
}

impl BindingRepository {
    /// Create a new binding repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Fail with the kind-specific not-found error unless the target exists
/// inside the tenant.
async fn ensure_target(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    target_type: TargetType,
    target_id: Uuid,
) -> AppResult<()> {
    let exists: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND tenant_id = $2)",
        target_type.table_name()
    ))
    .bind(target_id)
    .bind(tenant_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error("Failed to check target"))?;

    if exists {
        Ok(())
    } else {
        Err(AppError::not_found(format!("{} not found", target_type.label())))
    }
}

/// Write the mirrored directory pointer on a target row.
async fn set_target_pointer(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    target_type: TargetType,
    target_id: Uuid,
    directory_id: Option<Uuid>,
) -> AppResult<()> {
    sqlx::query(&format!(
        "UPDATE {} SET directory_id = $2 WHERE id = $1 AND tenant_id = $3",
        target_type.table_name()
    ))
    .bind(target_id)
    .bind(directory_id)
    .bind(tenant_id)
    .execute(&mut *conn)
    .await
    .map_err(db_error("Failed to update target directory pointer"))?;
    Ok(())
}

#[async_trait]
impl BindingStore for BindingRepository {
    async fn bind(&self, req: &BindTargets) -> AppResult<BindOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Directory deletion takes FOR UPDATE on the row, so a batch can
        // never file targets into a directory that is being removed.
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM directories WHERE id = $1 AND tenant_id = $2 FOR SHARE",
        )
        .bind(req.directory_id)
        .bind(req.tenant_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock directory"))?
        .ok_or_else(|| AppError::not_found(format!("Directory {} not found", req.directory_id)))?;

        let mut outcome = BindOutcome::default();

        for &target_id in &req.target_ids {
            ensure_target(&mut *tx, req.tenant_id, req.target_type, target_id).await?;

            let current: Option<Uuid> = sqlx::query_scalar(
                "SELECT directory_id FROM directory_bindings WHERE target_id = $1 FOR UPDATE",
            )
            .bind(target_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to find binding"))?;

            match current {
                Some(directory_id) if directory_id == req.directory_id => {
                    outcome.unchanged += 1;
                }
                Some(_) if req.policy == RebindPolicy::KeepExisting => {
                    outcome.unchanged += 1;
                }
                Some(_) => {
                    sqlx::query(
                        "UPDATE directory_bindings SET directory_id = $2, created_by = $3, \
                         created_at = NOW() WHERE target_id = $1",
                    )
                    .bind(target_id)
                    .bind(req.directory_id)
                    .bind(req.created_by)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error("Failed to reassign binding"))?;

                    set_target_pointer(
                        &mut *tx,
                        req.tenant_id,
                        req.target_type,
                        target_id,
                        Some(req.directory_id),
                    )
                    .await?;
                    outcome.reassigned += 1;
                }
                None => {
                    let inserted = sqlx::query(
                        "INSERT INTO directory_bindings \
                         (id, directory_id, target_id, target_type, tenant_id, created_by) \
                         VALUES ($1, $2, $3, $4, $5, $6) \
                         ON CONFLICT (target_id) DO NOTHING",
                    )
                    .bind(Uuid::new_v4())
                    .bind(req.directory_id)
                    .bind(target_id)
                    .bind(req.target_type)
                    .bind(req.tenant_id)
                    .bind(req.created_by)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error("Failed to create binding"))?;

                    if inserted.rows_affected() == 0 {
                        // A concurrent request bound the target first.
                        outcome.unchanged += 1;
                    } else {
                        set_target_pointer(
                            &mut *tx,
                            req.tenant_id,
                            req.target_type,
                            target_id,
                            Some(req.directory_id),
                        )
                        .await?;
                        outcome.created += 1;
                    }
                }
            }
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit bindings"))?;

        debug!(
            directory_id = %req.directory_id,
            created = outcome.created,
            reassigned = outcome.reassigned,
            unchanged = outcome.unchanged,
            "Binding batch stored"
        );
        Ok(outcome)
    }

    async fn unbind(&self, req: &UnbindTargets) -> AppResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let mut removed = 0u64;

        for &target_id in &req.target_ids {
            ensure_target(&mut *tx, req.tenant_id, req.target_type, target_id).await?;

            let deleted = sqlx::query(
                "DELETE FROM directory_bindings WHERE target_id = $1 AND tenant_id = $2",
            )
            .bind(target_id)
            .bind(req.tenant_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete binding"))?;

            set_target_pointer(&mut *tx, req.tenant_id, req.target_type, target_id, None).await?;
            removed += deleted.rows_affected();
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit binding removal"))?;

        Ok(removed)
    }

    async fn find_by_target(&self, target_id: Uuid) -> AppResult<Option<DirectoryBinding>> {
        sqlx::query_as::<_, DirectoryBinding>(
            "SELECT * FROM directory_bindings WHERE target_id = $1",
        )
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find binding"))
    }

    async fn list_by_directory(
        &self,
        tenant_id: Uuid,
        directory_id: Uuid,
        target_type: TargetType,
        page: PageRequest,
    ) -> AppResult<(Vec<DirectoryBinding>, u64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM directory_bindings \
             WHERE tenant_id = $1 AND directory_id = $2 AND target_type = $3",
        )
        .bind(tenant_id)
        .bind(directory_id)
        .bind(target_type)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count directory bindings"))?;

        let bindings = sqlx::query_as::<_, DirectoryBinding>(
            "SELECT * FROM directory_bindings \
             WHERE tenant_id = $1 AND directory_id = $2 AND target_type = $3 \
             ORDER BY created_at ASC, id ASC LIMIT $4 OFFSET $5",
        )
        .bind(tenant_id)
        .bind(directory_id)
        .bind(target_type)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list directory bindings"))?;

        Ok((bindings, total as u64))
    }
}
