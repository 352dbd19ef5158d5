//! Behaviour tests for task workflow validation.

#[path = "task_workflow_steps/mod.rs"]
mod task_workflow_steps_defs;

use rstest_bdd_macros::scenario;
use task_workflow_steps_defs::world::{TaskWorkflowWorld, world};

#[scenario(
    path = "tests/features/task_workflow.feature",
    name = "Development task moves through its workflow and closes"
)]
#[tokio::test(flavor = "multi_thread")]
async fn development_task_full_lifecycle(world: TaskWorkflowWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_workflow.feature",
    name = "Procurement offers need both price quotes"
)]
#[tokio::test(flavor = "multi_thread")]
async fn procurement_offers_need_both_quotes(world: TaskWorkflowWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_workflow.feature",
    name = "Tasks cannot be closed before their terminal status"
)]
#[tokio::test(flavor = "multi_thread")]
async fn early_close_is_rejected(world: TaskWorkflowWorld) {
    let _ = world;
}
