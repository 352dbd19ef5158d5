//! When steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use rstest_bdd_macros::when;
use taskflow::task::services::TransitionTaskRequest;

#[when(r#"the field "{name}" is set to "{value}""#)]
fn field_is_set(world: &mut TaskWorkflowWorld, name: String, value: String) {
    world.pending_fields.push((name, value));
}

#[when("the task is moved to status {status:u32}")]
fn task_is_moved(world: &mut TaskWorkflowWorld, status: u32) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?
        .id();
    let assignee = world
        .user
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing registered user in scenario world"))?
        .id();

    let fields = std::mem::take(&mut world.pending_fields);
    let request = TransitionTaskRequest::new(task_id, status, assignee).with_custom_fields(fields);
    let result = run_async(world.tasks.transition_task(request));
    world.record(result);
    Ok(())
}

#[when("a close is requested")]
fn close_is_requested(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?
        .id();
    let result = run_async(world.tasks.close_task(task_id));
    world.record(result);
    Ok(())
}
