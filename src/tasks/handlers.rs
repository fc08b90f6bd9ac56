use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{extractors::CurrentUser, guard::require_owner},
    error::AppError,
    state::AppState,
    tasks::dto::{Pagination, TaskOut, TaskPayload},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

#[instrument(skip(state, user, payload), fields(user_id = user.0.id))]
pub async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<TaskPayload>,
) -> Result<(StatusCode, Json<TaskOut>), AppError> {
    payload.validate()?;
    let task = state
        .tasks
        .create(user.0.id, &payload.title, payload.description.as_deref())
        .await
        .map_err(AppError::Internal)?;
    info!(task_id = task.id, "task created");
    Ok((StatusCode::CREATED, Json(TaskOut::from(task))))
}

/// List the caller's own tasks; the query itself is ownership-scoped.
#[instrument(skip(state, user, p), fields(user_id = user.0.id))]
pub async fn list_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<TaskOut>>, AppError> {
    let tasks = state
        .tasks
        .list_by_owner(user.0.id, p.limit, p.offset)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(tasks.into_iter().map(TaskOut::from).collect()))
}

#[instrument(skip(state, user), fields(user_id = user.0.id))]
pub async fn get_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<TaskOut>, AppError> {
    let task = state
        .tasks
        .get(id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("task"))?;
    require_owner(&user.0, task.owner_id, "task")?;
    Ok(Json(TaskOut::from(task)))
}

#[instrument(skip(state, user, payload), fields(user_id = user.0.id))]
pub async fn update_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<TaskOut>, AppError> {
    payload.validate()?;
    let existing = state
        .tasks
        .get(id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("task"))?;
    require_owner(&user.0, existing.owner_id, "task")?;

    let completed = payload.completed.unwrap_or(existing.completed);
    let task = state
        .tasks
        .update(id, &payload.title, payload.description.as_deref(), completed)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("task"))?;
    info!(task_id = task.id, "task updated");
    Ok(Json(TaskOut::from(task)))
}

#[instrument(skip(state, user), fields(user_id = user.0.id))]
pub async fn delete_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let task = state
        .tasks
        .get(id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("task"))?;
    require_owner(&user.0, task.owner_id, "task")?;

    state.tasks.delete(id).await.map_err(AppError::Internal)?;
    info!(task_id = id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}
