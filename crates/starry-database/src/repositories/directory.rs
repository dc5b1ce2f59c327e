//! Directory repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use starry_core::error::{AppError, ErrorKind};
use starry_core::result::AppResult;
use starry_entity::binding::TargetType;
use starry_entity::directory::{CreateDirectory, Directory, DirectoryType};

use crate::store::{DirectoryStore, db_error};

/// Unique index enforcing distinct sibling names.
const SIBLING_NAME_KEY: &str = "directories_sibling_name_key";

/// Upper bound on ancestor and subtree walks.
const MAX_TREE_DEPTH: i32 = 1024;

/// Repository for directory CRUD and tree queries.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Create a new directory repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve the level a child of `parent_id` gets, checking that the
    /// parent lives in the same tenant and has the same type.
    async fn child_level(
        conn: &mut sqlx::PgConnection,
        tenant_id: Uuid,
        dir_type: DirectoryType,
        parent_id: Option<Uuid>,
    ) -> AppResult<i32> {
        let Some(parent_id) = parent_id else {
            return Ok(0);
        };

        let parent: Option<(DirectoryType, i32)> = sqlx::query_as(
            "SELECT type, level FROM directories WHERE id = $1 AND tenant_id = $2 FOR SHARE",
        )
        .bind(parent_id)
        .bind(tenant_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("Failed to find parent directory"))?;

        let (parent_type, parent_level) = parent.ok_or_else(|| {
            AppError::validation(format!("Parent directory {parent_id} not found"))
        })?;

        if parent_type != dir_type {
            return Err(AppError::validation(format!(
                "Parent directory {parent_id} is a '{parent_type}' directory, not '{dir_type}'"
            )));
        }

        Ok(parent_level + 1)
    }

    /// Ids of the ancestors of `id`, nearest first, `id` excluded.
    async fn ancestors(conn: &mut sqlx::PgConnection, id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "WITH RECURSIVE ancestors AS ( \
                SELECT parent_id AS id, 1 AS distance FROM directories WHERE id = $1 \
                UNION ALL \
                SELECT d.parent_id, a.distance + 1 FROM directories d \
                INNER JOIN ancestors a ON d.id = a.id \
                WHERE a.distance < $2 \
             ) SELECT id FROM ancestors WHERE id IS NOT NULL ORDER BY distance ASC",
        )
        .bind(id)
        .bind(MAX_TREE_DEPTH)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error("Failed to find ancestors"))
    }
}

/// Advisory lock key shared by every move inside one tenant and type.
fn move_lock_key(tenant_id: Uuid, dir_type: DirectoryType) -> String {
    format!("directories:move:{tenant_id}:{dir_type}")
}

/// Map a failed write, turning sibling-name collisions into conflicts.
fn write_error(e: sqlx::Error, name: &str, context: &'static str) -> AppError {
    let duplicate = matches!(
        &e,
        sqlx::Error::Database(db_err) if db_err.constraint() == Some(SIBLING_NAME_KEY)
    );
    if duplicate {
        AppError::with_source(
            ErrorKind::Conflict,
            format!("Directory name '{name}' already exists"),
            e,
        )
    } else {
        AppError::with_source(ErrorKind::Database, context, e)
    }
}

#[async_trait]
impl DirectoryStore for DirectoryRepository {
    async fn find_by_id_and_tenant(
        &self,
        id: Uuid,
        tenant_id: Uuid,
    ) -> AppResult<Option<Directory>> {
        sqlx::query_as::<_, Directory>("SELECT * FROM directories WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find directory"))
    }

    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<Directory>> {
        sqlx::query_as::<_, Directory>(
            "SELECT * FROM directories WHERE parent_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list child directories"))
    }

    async fn list_by_type(
        &self,
        tenant_id: Uuid,
        dir_type: DirectoryType,
    ) -> AppResult<Vec<Directory>> {
        sqlx::query_as::<_, Directory>(
            "SELECT * FROM directories WHERE tenant_id = $1 AND type = $2 \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(tenant_id)
        .bind(dir_type)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list directories"))
    }

    async fn create(&self, data: &CreateDirectory) -> AppResult<Directory> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let level =
            Self::child_level(&mut *tx, data.tenant_id, data.dir_type, data.parent_id).await?;

        let directory = sqlx::query_as::<_, Directory>(
            "INSERT INTO directories (id, tenant_id, name, type, parent_id, level, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.tenant_id)
        .bind(&data.name)
        .bind(data.dir_type)
        .bind(data.parent_id)
        .bind(level)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, &data.name, "Failed to create directory"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit directory creation"))?;

        Ok(directory)
    }

    async fn rename(&self, directory: &Directory, new_name: &str) -> AppResult<Directory> {
        sqlx::query_as::<_, Directory>(
            "UPDATE directories SET name = $3, updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2 RETURNING *",
        )
        .bind(directory.id)
        .bind(directory.tenant_id)
        .bind(new_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, new_name, "Failed to rename directory"))?
        .ok_or_else(|| AppError::not_found(format!("Directory {} not found", directory.id)))
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

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Moves of one tenant and type run one at a time, so the ancestor
        // check below always sees every committed move.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(move_lock_key(directory.tenant_id, directory.dir_type))
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to take directory move lock"))?;

        let current_level: i32 = sqlx::query_scalar(
            "SELECT level FROM directories WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(directory.id)
        .bind(directory.tenant_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock directory"))?
        .ok_or_else(|| AppError::not_found(format!("Directory {} not found", directory.id)))?;

        let new_level = Self::child_level(
            &mut *tx,
            directory.tenant_id,
            directory.dir_type,
            new_parent_id,
        )
        .await?;

        if let Some(parent_id) = new_parent_id {
            if Self::ancestors(&mut *tx, parent_id).await?.contains(&directory.id) {
                return Err(AppError::validation(
                    "Directory can not be moved into its own sub directory.",
                ));
            }
        }

        let moved = sqlx::query_as::<_, Directory>(
            "UPDATE directories SET parent_id = $2, level = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(directory.id)
        .bind(new_parent_id)
        .bind(new_level)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, &directory.name, "Failed to move directory"))?;

        let delta = new_level - current_level;
        if delta != 0 {
            let shifted = sqlx::query(
                "WITH RECURSIVE subtree AS ( \
                    SELECT id, 1 AS depth FROM directories WHERE parent_id = $1 \
                    UNION ALL \
                    SELECT d.id, s.depth + 1 FROM directories d \
                    INNER JOIN subtree s ON d.parent_id = s.id \
                    WHERE s.depth < $3 \
                 ) UPDATE directories SET level = level + $2 \
                 WHERE id IN (SELECT id FROM subtree)",
            )
            .bind(directory.id)
            .bind(delta)
            .bind(MAX_TREE_DEPTH)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to update descendant levels"))?;

            debug!(
                directory_id = %directory.id,
                delta,
                descendants = shifted.rows_affected(),
                "Descendant levels shifted"
            );
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit directory move"))?;

        Ok(moved)
    }

    async fn delete(&self, directory: &Directory) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Child inserts take FOR SHARE on the parent, so this lock makes the
        // children check below race free.
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM directories WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(directory.id)
        .bind(directory.tenant_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock directory"))?
        .ok_or_else(|| AppError::not_found(format!("Directory {} not found", directory.id)))?;

        let has_children: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM directories WHERE parent_id = $1)")
                .bind(directory.id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("Failed to check child directories"))?;

        if has_children {
            return Err(AppError::conflict(format!(
                "Directory {} can not be deleted, there is sub directory.",
                directory.id
            )));
        }

        for target_type in TargetType::ALL {
            sqlx::query(&format!(
                "UPDATE {} SET directory_id = NULL WHERE directory_id = $1 AND tenant_id = $2",
                target_type.table_name()
            ))
            .bind(directory.id)
            .bind(directory.tenant_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear target directory pointers"))?;
        }

        let unbound = sqlx::query("DELETE FROM directory_bindings WHERE directory_id = $1")
            .bind(directory.id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete directory bindings"))?;

        sqlx::query("DELETE FROM directories WHERE id = $1")
            .bind(directory.id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete directory"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit directory deletion"))?;

        debug!(
            directory_id = %directory.id,
            bindings_removed = unbound.rows_affected(),
            "Directory row deleted"
        );
        Ok(())
    }

    async fn count_bindings(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, u64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT directory_id, COUNT(*) FROM directory_bindings \
             WHERE directory_id = ANY($1) GROUP BY directory_id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to count bindings"))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count as u64))
            .collect())
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
