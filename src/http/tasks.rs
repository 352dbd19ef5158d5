//! Task routes.

use super::{
    AppState,
    dto::{CreateTaskBody, TaskView, TransitionBody},
    error::ApiError,
};
use crate::task::{
    domain::TaskId,
    services::{CreateTaskRequest, TaskLifecycleError, TransitionTaskRequest},
};
use crate::user::domain::UserId;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use uuid::Uuid;

/// `GET /api/tasks`
pub(super) async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let tasks = state.tasks.list_tasks().await?;
    Ok(Json(tasks.iter().map(TaskView::from).collect()))
}

/// `GET /api/tasks/{id}`
pub(super) async fn get_task(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TaskView>, ApiError> {
    let Path(id) = path?;
    let task_id = TaskId::from_uuid(id);
    let task = state
        .tasks
        .find_task(task_id)
        .await?
        .ok_or(TaskLifecycleError::TaskNotFound(task_id))?;
    Ok(Json(TaskView::from(&task)))
}

/// `GET /api/tasks/user/{userId}`
pub(super) async fn tasks_for_user(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let Path(id) = path?;
    let tasks = state.tasks.tasks_for_user(UserId::from_uuid(id)).await?;
    Ok(Json(tasks.iter().map(TaskView::from).collect()))
}

/// `POST /api/tasks`
pub(super) async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = body?;
    let request = CreateTaskRequest::new(
        payload.title,
        payload.task_type,
        UserId::from_uuid(payload.assigned_user_id),
    );
    let task = state.tasks.create_task(request).await?;
    let location = format!("/api/tasks/{}", task.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TaskView::from(&task)),
    ))
}

/// `PUT /api/tasks/{id}/status`
pub(super) async fn transition_task(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<TransitionBody>, JsonRejection>,
) -> Result<Json<TaskView>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = body?;

    let mut request = TransitionTaskRequest::new(
        TaskId::from_uuid(id),
        payload.new_status,
        UserId::from_uuid(payload.assigned_user_id),
    )
    .with_custom_fields(payload.custom_fields.unwrap_or_default());
    if let Some(note) = payload.note {
        request = request.with_note(note);
    }

    let task = state.tasks.transition_task(request).await?;
    Ok(Json(TaskView::from(&task)))
}

/// `PUT /api/tasks/{id}/close`
pub(super) async fn close_task(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TaskView>, ApiError> {
    let Path(id) = path?;
    let task = state.tasks.close_task(TaskId::from_uuid(id)).await?;
    Ok(Json(TaskView::from(&task)))
}
