use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is yet to be done.
    Pending,
    /// Task is done.
    Completed,
}

impl TaskStatus {
    /// The other status. Toggling twice returns the original value.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

/// Input structure for creating or updating a task.
///
/// Name and description are both required and non-empty; a missing or empty
/// value is a validation failure (400), matching the API contract. Status is
/// optional and defaults to `pending` on creation.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, message = "Name and description are required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Name and description are required"))]
    pub description: String,

    pub status: Option<TaskStatus>,
}

/// A task as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    /// Identifier of the owning user. Every store operation filters on this.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const TASK_COLUMNS: &str = "id, name, description, status, user_id, created_at, updated_at";

impl Task {
    /// All tasks for the owner, in insertion order.
    pub async fn list(pool: &PgPool, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Inserts a new task owned by `owner_id`. Status defaults to `pending`.
    pub async fn create(pool: &PgPool, owner_id: i32, input: TaskInput) -> Result<Task, AppError> {
        input.validate()?;
        let status = input.status.unwrap_or(TaskStatus::Pending);

        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, name, description, status, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.description)
        .bind(status)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Atomic find-and-replace filtered by both id and owner.
    ///
    /// `None` covers both "no such task" and "task owned by someone else";
    /// callers must not distinguish the two. An omitted status leaves the
    /// stored value untouched, it never resets to the creation default.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner_id: i32,
        input: TaskInput,
    ) -> Result<Option<Task>, AppError> {
        input.validate()?;

        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET name = $1, description = $2, status = COALESCE($3, status), updated_at = now()
             WHERE id = $4 AND user_id = $5
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.status)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes the task if it exists and is owned by `owner_id`.
    /// Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid, owner_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flips the task's status between `pending` and `completed`.
    ///
    /// Owner-scoped read, flip in memory, owner-scoped write. Two clients
    /// toggling the same task concurrently race; last write wins.
    pub async fn toggle(pool: &PgPool, id: Uuid, owner_id: i32) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        let task = match task {
            Some(task) => task,
            None => return Ok(None),
        };

        let updated = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET status = $1, updated_at = now()
             WHERE id = $2 AND user_id = $3
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.status.toggled())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(updated)
    }
}
