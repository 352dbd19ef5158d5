//! Service orchestration tests for task creation, transitions, and closure.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ErrorCode;
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskDomainError, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
    services::{CreateTaskRequest, TaskLifecycleError, TaskLifecycleService, TransitionTaskRequest},
};
use crate::user::{
    adapters::memory::InMemoryUserRepository,
    domain::{EmailAddress, User, UserId, UserName},
    ports::UserRepository,
};
use async_trait::async_trait;
use eyre::{bail, ensure};
use mockable::DefaultClock;
use mockall::mock;
use rstest::rstest;

type TestService =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryUserRepository, DefaultClock>;

struct Harness {
    service: TestService,
    tasks: Arc<InMemoryTaskRepository>,
    users: Arc<InMemoryUserRepository>,
    assignee: UserId,
}

async fn register(users: &InMemoryUserRepository, name: &str, email: &str) -> eyre::Result<UserId> {
    let user = User::new(UserName::new(name)?, EmailAddress::new(email)?);
    users.store(&user).await?;
    Ok(user.id())
}

async fn harness() -> eyre::Result<Harness> {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let assignee = register(&users, "Dana Buyer", "dana@example.com").await?;
    let service = TaskLifecycleService::new(
        Arc::clone(&tasks),
        Arc::clone(&users),
        Arc::new(DefaultClock),
    );
    Ok(Harness {
        service,
        tasks,
        users,
        assignee,
    })
}

async fn create(harness: &Harness, task_type: &str) -> eyre::Result<Task> {
    let request = CreateTaskRequest::new("Service test task", task_type, harness.assignee);
    Ok(harness.service.create_task(request).await?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_is_retrievable() -> eyre::Result<()> {
    let harness = harness().await?;
    let created = create(&harness, "Procurement").await?;

    ensure!(created.status() == TaskStatus::CREATED);
    ensure!(harness.service.find_task(created.id()).await? == Some(created.clone()));
    ensure!(harness.service.list_tasks().await? == vec![created.clone()]);
    ensure!(harness.service.tasks_for_user(harness.assignee).await? == vec![created]);
    ensure!(harness.service.tasks_for_user(UserId::new()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_invalid_requests_without_storing() -> eyre::Result<()> {
    let harness = harness().await?;
    let stranger = UserId::new();

    let unknown_user = harness
        .service
        .create_task(CreateTaskRequest::new("Valid title", "Development", stranger))
        .await;
    ensure!(matches!(unknown_user, Err(TaskLifecycleError::UnknownUser(id)) if id == stranger));

    let bad_type = harness
        .service
        .create_task(CreateTaskRequest::new("Valid title", "Research", harness.assignee))
        .await;
    ensure!(matches!(bad_type, Err(TaskLifecycleError::InvalidTaskType(_))));

    let blank_title = harness
        .service
        .create_task(CreateTaskRequest::new("   ", "Development", harness.assignee))
        .await;
    ensure!(matches!(
        blank_title,
        Err(TaskLifecycleError::Domain(TaskDomainError::EmptyTitle))
    ));

    for result in [unknown_user, bad_type, blank_title] {
        ensure!(result.map_err(|err| err.code()) == Err(ErrorCode::InvalidArgument));
    }
    ensure!(harness.tasks.list_all().await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_is_reported_first() -> eyre::Result<()> {
    let harness = harness().await?;
    let missing = TaskId::new();

    let result = harness
        .service
        .transition_task(TransitionTaskRequest::new(missing, 0, UserId::new()))
        .await;
    ensure!(matches!(result, Err(TaskLifecycleError::TaskNotFound(id)) if id == missing));
    ensure!(result.map_err(|err| err.code()) == Err(ErrorCode::NotFound));

    let close = harness.service.close_task(missing).await;
    ensure!(matches!(close, Err(TaskLifecycleError::TaskNotFound(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_task_is_reported_before_unknown_assignee() -> eyre::Result<()> {
    let harness = harness().await?;
    let task = create(&harness, "Procurement").await?;
    let steps = [
        TransitionTaskRequest::new(task.id(), 2, harness.assignee)
            .with_custom_fields([("PriceQuote1", "10"), ("PriceQuote2", "12")]),
        TransitionTaskRequest::new(task.id(), 3, harness.assignee)
            .with_custom_fields([("Receipt", "R-9")]),
    ];
    for step in steps {
        harness.service.transition_task(step).await?;
    }
    harness.service.close_task(task.id()).await?;

    let result = harness
        .service
        .transition_task(TransitionTaskRequest::new(task.id(), 1, UserId::new()))
        .await;
    ensure!(
        matches!(
            result,
            Err(TaskLifecycleError::Domain(TaskDomainError::TaskClosed(_)))
        ),
        "unexpected result: {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_assignee_is_reported_before_evidence() -> eyre::Result<()> {
    let harness = harness().await?;
    let task = create(&harness, "Development").await?;
    let stranger = UserId::new();

    let result = harness
        .service
        .transition_task(TransitionTaskRequest::new(task.id(), 2, stranger))
        .await;
    ensure!(matches!(result, Err(TaskLifecycleError::UnknownUser(id)) if id == stranger));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_transition_is_not_persisted() -> eyre::Result<()> {
    let harness = harness().await?;
    let task = create(&harness, "Procurement").await?;

    let result = harness
        .service
        .transition_task(
            TransitionTaskRequest::new(task.id(), 2, harness.assignee)
                .with_custom_fields([("PriceQuote1", "10")])
                .with_note("only one quote so far"),
        )
        .await;
    ensure!(result.map_err(|err| err.code()) == Err(ErrorCode::ValidationFailed));
    ensure!(harness.tasks.find_by_id(task.id()).await? == Some(task));
    Ok(())
}

#[rstest]
#[case("", ErrorCode::InvalidArgument)]
#[case("  ", ErrorCode::InvalidArgument)]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_field_names_are_rejected(
    #[case] name: &str,
    #[case] expected: ErrorCode,
) -> eyre::Result<()> {
    let harness = harness().await?;
    let task = create(&harness, "Development").await?;

    let result = harness
        .service
        .transition_task(
            TransitionTaskRequest::new(task.id(), 2, harness.assignee)
                .with_custom_fields([(name, "value")]),
        )
        .await;
    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(TaskDomainError::InvalidFieldName(_)))
    ));
    ensure!(result.map_err(|err| err.code()) == Err(expected));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn development_task_runs_the_full_workflow() -> eyre::Result<()> {
    let harness = harness().await?;
    let reviewer = register(&harness.users, "Rae Reviewer", "rae@example.com").await?;
    let task = create(&harness, "development").await?;

    let skipped = harness
        .service
        .transition_task(
            TransitionTaskRequest::new(task.id(), 3, harness.assignee)
                .with_custom_fields([("BranchName", "feature/x")]),
        )
        .await;
    ensure!(skipped.map_err(|err| err.code()) == Err(ErrorCode::IllegalTransition));

    for (status, field, value) in [
        (2, "Specification", "docs/spec.md"),
        (3, "BranchName", "feature/x"),
        (4, "VersionNumber", "1.4.0"),
    ] {
        harness
            .service
            .transition_task(
                TransitionTaskRequest::new(task.id(), status, reviewer)
                    .with_custom_fields([(field, value)]),
            )
            .await?;
    }

    let closed = harness.service.close_task(task.id()).await?;
    ensure!(closed.is_closed());
    ensure!(closed.assignee() == reviewer);
    ensure!(closed.history().len() == 4);
    ensure!(closed.version() == 5);

    let again = harness.service.close_task(task.id()).await;
    ensure!(matches!(
        again,
        Err(TaskLifecycleError::Domain(TaskDomainError::AlreadyClosed(_)))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_transitions_on_one_task_are_serialized() -> eyre::Result<()> {
    const WRITERS: u64 = 8;

    let harness = harness().await?;
    let task = create(&harness, "Procurement").await?;

    let mut handles = Vec::new();
    for writer in 0..WRITERS {
        let service = harness.service.clone();
        let request = TransitionTaskRequest::new(task.id(), 2, harness.assignee)
            .with_custom_fields([
                ("PriceQuote1", format!("{writer}00")),
                ("PriceQuote2", format!("{writer}50")),
            ]);
        handles.push(tokio::spawn(async move {
            service.transition_task(request).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let stored = harness
        .tasks
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task vanished"))?;
    ensure!(stored.version() == 1 + WRITERS);
    ensure!(stored.history().len() == 1 + usize::try_from(WRITERS)?);
    Ok(())
}

/// Task repository whose reads stall longer than any test deadline.
#[derive(Debug, Default)]
struct StallingTaskRepository {
    inner: InMemoryTaskRepository,
}

#[async_trait]
impl TaskRepository for StallingTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.inner.store(task).await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.inner.update(task).await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        self.inner.find_by_id(id).await
    }

    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.list_all().await
    }

    async fn find_by_assignee(&self, assignee: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.find_by_assignee(assignee).await
    }

    async fn references_user(&self, user: UserId) -> TaskRepositoryResult<bool> {
        self.inner.references_user(user).await
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_storage_times_out() -> eyre::Result<()> {
    let deadline = Duration::from_millis(20);
    let service = TaskLifecycleService::new(
        Arc::new(StallingTaskRepository::default()),
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(DefaultClock),
    )
    .with_storage_timeout(deadline);

    let result = service.find_task(TaskId::new()).await;
    ensure!(
        matches!(result, Err(TaskLifecycleError::StorageTimeout(limit)) if limit == deadline),
        "unexpected result: {result:?}"
    );
    ensure!(result.map_err(|err| err.code()) == Err(ErrorCode::Unavailable));
    Ok(())
}

mock! {
    Tasks {}

    #[async_trait]
    impl TaskRepository for Tasks {
        async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;
        async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;
        async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;
        async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>>;
        async fn find_by_assignee(&self, assignee: UserId) -> TaskRepositoryResult<Vec<Task>>;
        async fn references_user(&self, user: UserId) -> TaskRepositoryResult<bool>;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn persistence_failures_surface_as_internal_errors() -> eyre::Result<()> {
    let mut tasks = MockTasks::new();
    tasks.expect_find_by_id().times(1).returning(|_| {
        Err(TaskRepositoryError::persistence(std::io::Error::other(
            "connection reset",
        )))
    });
    tasks.expect_update().never();

    let users = Arc::new(InMemoryUserRepository::new());
    let assignee = register(&users, "Ola Ops", "ola@example.com").await?;
    let service = TaskLifecycleService::new(Arc::new(tasks), users, Arc::new(DefaultClock));

    let result = service
        .transition_task(TransitionTaskRequest::new(TaskId::new(), 2, assignee))
        .await;
    let Err(err) = result else {
        bail!("transition should fail when storage fails");
    };
    ensure!(matches!(
        err,
        TaskLifecycleError::Repository(TaskRepositoryError::Persistence(_))
    ));
    ensure!(err.code() == ErrorCode::Internal);
    ensure!(!err.code().is_client_error());
    Ok(())
}

#[rstest]
fn version_conflicts_map_to_conflict() {
    let err = TaskLifecycleError::from(TaskRepositoryError::VersionConflict {
        task_id: TaskId::new(),
        expected: 2,
        found: 3,
    });
    assert_eq!(err.code(), ErrorCode::Conflict);
}
