//! `PostgreSQL` repository implementation for task workflow storage.

use super::{
    conversions::{TaskRows, row_to_task, to_rows, version_from_column, version_to_column},
    models::{CustomFieldRow, StatusHistoryRow, TaskRow},
    schema::{task_custom_fields, task_status_history, tasks},
};
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::upsert::excluded;
use std::collections::HashMap;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
///
/// Each write runs in a single transaction covering the task row, its custom
/// fields, and any history entries not yet stored.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let assignee = task.assignee();
        let rows = to_rows(task)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::insert_into(tasks::table)
                    .values(&rows.task)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        other => map_write_error(other, assignee),
                    })?;
                write_children(tx, &rows, assignee)
            })
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let assignee = task.assignee();
        let expected = task.version().saturating_sub(1);
        let expected_column = version_to_column(expected)?;
        let rows = to_rows(task)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let row = &rows.task;
                let updated_count = diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(row.id))
                        .filter(tasks::version.eq(expected_column)),
                )
                .set((
                    tasks::title.eq(&row.title),
                    tasks::current_status.eq(row.current_status),
                    tasks::is_closed.eq(row.is_closed),
                    tasks::assigned_user_id.eq(row.assigned_user_id),
                    tasks::updated_at.eq(row.updated_at),
                    tasks::closed_at.eq(row.closed_at),
                    tasks::version.eq(row.version),
                ))
                .execute(tx)
                .map_err(|err| map_write_error(err, assignee))?;

                if updated_count == 0 {
                    let stored_version = tasks::table
                        .filter(tasks::id.eq(row.id))
                        .select(tasks::version)
                        .first::<i64>(tx)
                        .optional()?;
                    return Err(match stored_version {
                        None => TaskRepositoryError::NotFound(task_id),
                        Some(found) => TaskRepositoryError::VersionConflict {
                            task_id,
                            expected,
                            found: version_from_column(found)?,
                        },
                    });
                }

                write_children(tx, &rows, assignee)
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            let found = assemble(connection, row.into_iter().collect())?;
            Ok(found.into_iter().next())
        })
        .await
    }

    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            assemble(connection, rows)
        })
        .await
    }

    async fn find_by_assignee(&self, assignee: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::assigned_user_id.eq(assignee.into_inner()))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            assemble(connection, rows)
        })
        .await
    }

    async fn references_user(&self, user: UserId) -> TaskRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let user_id = user.into_inner();
            let assigned = diesel::select(diesel::dsl::exists(
                tasks::table.filter(tasks::assigned_user_id.eq(user_id)),
            ))
            .get_result::<bool>(connection)?;
            if assigned {
                return Ok(true);
            }
            let recorded = diesel::select(diesel::dsl::exists(
                task_status_history::table
                    .filter(task_status_history::assigned_user_id.eq(user_id)),
            ))
            .get_result::<bool>(connection)?;
            Ok(recorded)
        })
        .await
    }
}

/// Upserts custom fields and appends history rows not yet stored.
fn write_children(
    connection: &mut PgConnection,
    rows: &TaskRows,
    assignee: UserId,
) -> TaskRepositoryResult<()> {
    if !rows.fields.is_empty() {
        diesel::insert_into(task_custom_fields::table)
            .values(&rows.fields)
            .on_conflict((task_custom_fields::task_id, task_custom_fields::field_name))
            .do_update()
            .set(task_custom_fields::field_value.eq(excluded(task_custom_fields::field_value)))
            .execute(connection)
            .map_err(|err| map_write_error(err, assignee))?;
    }

    if !rows.history.is_empty() {
        diesel::insert_into(task_status_history::table)
            .values(&rows.history)
            .on_conflict_do_nothing()
            .execute(connection)
            .map_err(|err| map_write_error(err, assignee))?;
    }

    Ok(())
}

fn map_write_error(err: DieselError, assignee: UserId) -> TaskRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            TaskRepositoryError::UnknownUser(assignee)
        }
        other => TaskRepositoryError::persistence(other),
    }
}

/// Loads child rows for `rows` and reconstructs the aggregates in row order.
fn assemble(connection: &mut PgConnection, rows: Vec<TaskRow>) -> TaskRepositoryResult<Vec<Task>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let mut fields_by_task: HashMap<Uuid, Vec<CustomFieldRow>> = HashMap::new();
    for field in task_custom_fields::table
        .filter(task_custom_fields::task_id.eq_any(ids.clone()))
        .order((task_custom_fields::task_id.asc(), task_custom_fields::position.asc()))
        .select(CustomFieldRow::as_select())
        .load::<CustomFieldRow>(connection)?
    {
        fields_by_task.entry(field.task_id).or_default().push(field);
    }

    let mut history_by_task: HashMap<Uuid, Vec<StatusHistoryRow>> = HashMap::new();
    for entry in task_status_history::table
        .filter(task_status_history::task_id.eq_any(ids))
        .order((task_status_history::task_id.asc(), task_status_history::sequence.asc()))
        .select(StatusHistoryRow::as_select())
        .load::<StatusHistoryRow>(connection)?
    {
        history_by_task.entry(entry.task_id).or_default().push(entry);
    }

    rows.into_iter()
        .map(|row| {
            let fields = fields_by_task.remove(&row.id).unwrap_or_default();
            let history = history_by_task.remove(&row.id).unwrap_or_default();
            row_to_task(row, fields, history)
        })
        .collect()
}
