use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskInput},
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Retrieves the authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects owned by the caller.
/// - `401 Unauthorized`: If the request lacks a valid bearer token.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = Task::list(&pool, auth.user_id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `name`: required, non-empty.
/// - `description`: required, non-empty.
/// - `status` (optional): `"pending"` or `"completed"`, defaults to `"pending"`.
///
/// ## Responses:
/// - `201 Created`: The created `Task`.
/// - `400 Bad Request`: If name or description is missing or empty.
/// - `401 Unauthorized`: If the request lacks a valid bearer token.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = Task::create(&pool, auth.user_id, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Updates a task owned by the authenticated user.
///
/// The update is a single statement filtered by both id and owner, so there is
/// no window between an existence check and an ownership check. A task that
/// exists but belongs to another user yields the same 404 as one that does not
/// exist at all. Omitting `status` from the body leaves the stored status
/// unchanged.
///
/// ## Responses:
/// - `200 OK`: The updated `Task`.
/// - `400 Bad Request`: If name or description is missing or empty.
/// - `401 Unauthorized`: If the request lacks a valid bearer token.
/// - `404 Not Found`: If the task is absent or not owned by the caller.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = Task::update(
        &pool,
        task_id.into_inner(),
        auth.user_id,
        task_data.into_inner(),
    )
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes a task owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: Confirmation message.
/// - `401 Unauthorized`: If the request lacks a valid bearer token.
/// - `404 Not Found`: If the task is absent or not owned by the caller.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let deleted = Task::delete(&pool, task_id.into_inner(), auth.user_id).await?;

    if !deleted {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}

/// Toggles a task between `pending` and `completed`.
///
/// ## Responses:
/// - `200 OK`: The task with its status flipped.
/// - `401 Unauthorized`: If the request lacks a valid bearer token.
/// - `404 Not Found`: If the task is absent or not owned by the caller.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[patch("/{id}/toggle")]
pub async fn toggle_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = Task::toggle(&pool, task_id.into_inner(), auth.user_id).await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}
