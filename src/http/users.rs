//! User routes.

use super::{
    AppState,
    dto::{CreateUserBody, UserView},
    error::ApiError,
};
use crate::user::{
    domain::UserId,
    services::{RegisterUserRequest, UserDirectoryError},
};
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

/// `GET /api/users`
pub(super) async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = state.users.list_users().await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}

/// `GET /api/users/{id}`
pub(super) async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UserView>, ApiError> {
    let Path(id) = path?;
    let user_id = UserId::from_uuid(id);
    let user = state
        .users
        .find_user(user_id)
        .await?
        .ok_or(UserDirectoryError::UserNotFound(user_id))?;
    Ok(Json(UserView::from(&user)))
}

/// `POST /api/users`
pub(super) async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = body?;
    let user = state
        .users
        .register_user(RegisterUserRequest::new(payload.name, payload.email))
        .await?;
    let location = format!("/api/users/{}", user.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(UserView::from(&user)),
    ))
}

/// `DELETE /api/users/{id}`
pub(super) async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    state.users.delete_user(UserId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
