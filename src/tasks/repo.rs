use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::db::SessionScope;

/// Task record. `owner_id` is set from the authenticated identity at
/// creation and never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub owner_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(
        &self,
        owner_id: i64,
        title: &str,
        description: Option<&str>,
    ) -> anyhow::Result<Task>;
    /// Unscoped fetch; the ownership gate runs over the returned row.
    async fn get(&self, id: i64) -> anyhow::Result<Option<Task>>;
    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Task>>;
    async fn update(
        &self,
        id: i64,
        title: &str,
        description: Option<&str>,
        completed: bool,
    ) -> anyhow::Result<Option<Task>>;
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TASK_COLUMNS: &str = "id, owner_id, title, description, completed";

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(
        &self,
        owner_id: i64,
        title: &str,
        description: Option<&str>,
    ) -> anyhow::Result<Task> {
        let mut scope = SessionScope::begin(&self.pool).await?;
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (owner_id, title, description) VALUES ($1, $2, $3) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .fetch_one(scope.conn())
        .await?;
        scope.commit().await?;
        Ok(task)
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1 \
             ORDER BY id LIMIT $2 OFFSET $3"
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        description: Option<&str>,
        completed: bool,
    ) -> anyhow::Result<Option<Task>> {
        let mut scope = SessionScope::begin(&self.pool).await?;
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET title = $2, description = $3, completed = $4 \
             WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(completed)
        .fetch_optional(scope.conn())
        .await?;
        scope.commit().await?;
        Ok(task)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut scope = SessionScope::begin(&self.pool).await?;
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(scope.conn())
            .await?;
        scope.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
