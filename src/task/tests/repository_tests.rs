//! Tests for the in-memory task repository contract.

use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{StatusTransition, Task, TaskStatus, TaskTitle, TaskType},
    ports::{TaskRepository, TaskRepositoryError},
};
use crate::user::{
    adapters::memory::InMemoryUserRepository,
    domain::{EmailAddress, User, UserId, UserName},
    ports::{UserRepository, UserRepositoryError},
};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::time::Duration;

#[fixture]
fn repository() -> InMemoryTaskRepository {
    InMemoryTaskRepository::new()
}

fn new_task(title: &str, assignee: UserId) -> eyre::Result<Task> {
    Ok(Task::new(
        TaskTitle::new(title)?,
        TaskType::Development,
        assignee,
        &DefaultClock,
    ))
}

async fn registered_user(users: &InMemoryUserRepository, name: &str) -> eyre::Result<User> {
    let email = format!("{}@example.com", name.to_lowercase());
    let user = User::new(UserName::new(name)?, EmailAddress::new(email)?);
    users.store(&user).await?;
    Ok(user)
}

fn advance(task: &mut Task) -> eyre::Result<()> {
    let transition = StatusTransition::new(TaskStatus::new(2)?, task.assignee())
        .with_field("Specification", "spec")?;
    task.apply_transition(transition, &DefaultClock)?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn storing_the_same_task_twice_is_rejected(
    repository: InMemoryTaskRepository,
) -> eyre::Result<()> {
    let task = new_task("Duplicate", UserId::new())?;
    repository.store(&task).await?;

    let result = repository.store(&task).await;
    ensure!(matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_copy_cannot_overwrite_newer_task(
    repository: InMemoryTaskRepository,
) -> eyre::Result<()> {
    let task = new_task("Contended", UserId::new())?;
    repository.store(&task).await?;

    let mut first = task.clone();
    let mut stale = task;
    advance(&mut first)?;
    repository.update(&first).await?;

    advance(&mut stale)?;
    let result = repository.update(&stale).await;
    ensure!(
        matches!(
            result,
            Err(TaskRepositoryError::VersionConflict { expected: 1, found: 2, .. })
        ),
        "unexpected result: {result:?}"
    );

    let stored = repository.find_by_id(first.id()).await?;
    ensure!(stored == Some(first));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn updating_an_unknown_task_reports_not_found(
    repository: InMemoryTaskRepository,
) -> eyre::Result<()> {
    let mut task = new_task("Never stored", UserId::new())?;
    advance(&mut task)?;

    let result = repository.update(&task).await;
    ensure!(matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == task.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listings_follow_creation_order(repository: InMemoryTaskRepository) -> eyre::Result<()> {
    let alice = UserId::new();
    let bob = UserId::new();
    let first = new_task("First", alice)?;
    tokio::time::sleep(Duration::from_millis(2)).await;
    let second = new_task("Second", bob)?;
    tokio::time::sleep(Duration::from_millis(2)).await;
    let third = new_task("Third", alice)?;
    for task in [&third, &first, &second] {
        repository.store(task).await?;
    }

    let all: Vec<_> = repository
        .list_all()
        .await?
        .into_iter()
        .map(|task| task.id())
        .collect();
    ensure!(all == [first.id(), second.id(), third.id()]);

    let for_alice: Vec<_> = repository
        .find_by_assignee(alice)
        .await?
        .into_iter()
        .map(|task| task.id())
        .collect();
    ensure!(for_alice == [first.id(), third.id()]);
    ensure!(repository.find_by_assignee(UserId::new()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_entries_keep_users_referenced(
    repository: InMemoryTaskRepository,
) -> eyre::Result<()> {
    let original = UserId::new();
    let successor = UserId::new();
    let mut task = new_task("Handover", original)?;
    repository.store(&task).await?;

    let handover = StatusTransition::new(TaskStatus::CREATED, successor);
    task.apply_transition(handover, &DefaultClock)?;
    repository.update(&task).await?;

    ensure!(repository.references_user(original).await?);
    ensure!(repository.references_user(successor).await?);
    ensure!(!repository.references_user(UserId::new()).await?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn linked_storage_rejects_unknown_assignees() -> eyre::Result<()> {
    let repository = InMemoryTaskRepository::linked_to(InMemoryUserRepository::new());
    let stranger = UserId::new();
    let task = new_task("Orphan", stranger)?;

    let result = repository.store(&task).await;
    ensure!(
        matches!(result, Err(TaskRepositoryError::UnknownUser(id)) if id == stranger),
        "unexpected result: {result:?}"
    );
    ensure!(repository.find_by_id(task.id()).await?.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn linked_storage_keeps_assignees_from_being_deleted() -> eyre::Result<()> {
    let users = InMemoryUserRepository::new();
    let repository = InMemoryTaskRepository::linked_to(users.clone());
    let original = registered_user(&users, "Orna").await?;
    let successor = registered_user(&users, "Sivan").await?;
    let bystander = registered_user(&users, "Bella").await?;

    let mut task = new_task("Pinned", original.id())?;
    repository.store(&task).await?;
    task.apply_transition(
        StatusTransition::new(TaskStatus::CREATED, successor.id()),
        &DefaultClock,
    )?;
    repository.update(&task).await?;

    for pinned in [original.id(), successor.id()] {
        let result = users.delete(pinned).await;
        ensure!(
            matches!(result, Err(UserRepositoryError::StillReferenced(id)) if id == pinned),
            "unexpected result: {result:?}"
        );
        ensure!(users.find_by_id(pinned).await?.is_some());
    }
    users.delete(bystander.id()).await?;
    ensure!(users.find_by_id(bystander.id()).await?.is_none());
    Ok(())
}
