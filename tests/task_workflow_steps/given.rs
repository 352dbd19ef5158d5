//! Given steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskflow::{task::services::CreateTaskRequest, user::services::RegisterUserRequest};

#[given(r#"a registered user "{name}" with email "{email}""#)]
fn registered_user(
    world: &mut TaskWorkflowWorld,
    name: String,
    email: String,
) -> Result<(), eyre::Report> {
    let user = run_async(
        world
            .users
            .register_user(RegisterUserRequest::new(name, email)),
    )
    .wrap_err("register scenario user")?;
    world.user = Some(user);
    Ok(())
}

#[given(r#"a "{task_type}" task titled "{title}""#)]
fn task_titled(
    world: &mut TaskWorkflowWorld,
    task_type: String,
    title: String,
) -> Result<(), eyre::Report> {
    let assignee = world
        .user
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing registered user in scenario world"))?
        .id();
    let task = run_async(
        world
            .tasks
            .create_task(CreateTaskRequest::new(title, task_type, assignee)),
    )
    .wrap_err("create scenario task")?;
    world.task = Some(task);
    Ok(())
}
