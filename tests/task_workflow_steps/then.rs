//! Then steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use rstest_bdd_macros::then;
use taskflow::error::ErrorCode;
use taskflow::task::{domain::TaskDomainError, services::TaskLifecycleError};

#[then("the task is at status {status:u32}")]
fn task_is_at_status(world: &TaskWorkflowWorld, status: u32) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?
        .id();
    let stored = run_async(world.tasks.find_task(task_id))?
        .ok_or_else(|| eyre::eyre!("task {task_id} disappeared from storage"))?;

    if stored.status().value() != status {
        return Err(eyre::eyre!(
            "expected status {status}, found {}",
            stored.status()
        ));
    }
    Ok(())
}

#[then("the task is marked closed")]
fn task_is_marked_closed(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?;
    if !task.is_closed() || task.closed_at().is_none() {
        return Err(eyre::eyre!("expected a closed task, got {task:?}"));
    }
    Ok(())
}

#[then("the change is rejected as an illegal transition")]
fn rejected_as_illegal(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing operation result"))?;

    match result {
        Err(err) if err.code() == ErrorCode::IllegalTransition => Ok(()),
        other => Err(eyre::eyre!("expected an illegal transition, got {other:?}")),
    }
}

#[then(r#"the change is rejected for missing evidence "{field}""#)]
fn rejected_for_missing_evidence(
    world: &TaskWorkflowWorld,
    field: String,
) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing operation result"))?;

    let Err(TaskLifecycleError::Domain(TaskDomainError::MissingEvidence { missing, .. })) = result
    else {
        return Err(eyre::eyre!("expected missing evidence, got {result:?}"));
    };
    let names: Vec<&str> = missing.fields().iter().map(|name| name.as_str()).collect();
    if names != [field.as_str()] {
        return Err(eyre::eyre!("expected only {field} to be missing, got {names:?}"));
    }
    Ok(())
}
