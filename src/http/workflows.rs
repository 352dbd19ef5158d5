//! Read-only view of the workflow rule table.

use super::dto::WorkflowView;
use crate::task::domain::TaskType;
use axum::Json;

/// `GET /api/workflows`
pub(super) async fn list_workflows() -> Json<Vec<WorkflowView>> {
    Json(TaskType::ALL.into_iter().map(WorkflowView::from).collect())
}
