//! Conversions between task aggregates and Diesel rows.

use super::models::{CustomFieldRow, NewTaskRow, StatusHistoryRow, TaskRow};
use crate::task::{
    domain::{
        CustomField, FieldName, PersistedTaskData, StatusHistoryEntry, Task, TaskId, TaskStatus,
        TaskTitle, TaskType,
    },
    ports::{TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::domain::UserId;

/// Rows written for one task aggregate.
#[derive(Debug, Clone)]
pub(super) struct TaskRows {
    pub task: NewTaskRow,
    pub fields: Vec<CustomFieldRow>,
    pub history: Vec<StatusHistoryRow>,
}

pub(super) fn to_rows(task: &Task) -> TaskRepositoryResult<TaskRows> {
    let task_id = task.id().into_inner();

    let fields = task
        .custom_fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            Ok(CustomFieldRow {
                task_id,
                field_name: field.name().as_str().to_owned(),
                field_value: field.value().to_owned(),
                field_type: field.field_type().to_owned(),
                position: ordinal(index)?,
                created_at: field.created_at(),
            })
        })
        .collect::<TaskRepositoryResult<Vec<_>>>()?;

    let history = task
        .history()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            Ok(StatusHistoryRow {
                task_id,
                sequence: ordinal(index)?,
                from_status: entry.from_status().map(status_to_column).transpose()?,
                to_status: status_to_column(entry.to_status())?,
                assigned_user_id: entry.assignee().into_inner(),
                changed_at: entry.changed_at(),
                note: entry.note().to_owned(),
            })
        })
        .collect::<TaskRepositoryResult<Vec<_>>>()?;

    let row = NewTaskRow {
        id: task_id,
        title: task.title().as_str().to_owned(),
        task_type: task.task_type().as_str().to_owned(),
        current_status: status_to_column(task.status())?,
        is_closed: task.is_closed(),
        assigned_user_id: task.assignee().into_inner(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        closed_at: task.closed_at(),
        version: version_to_column(task.version())?,
    };

    Ok(TaskRows {
        task: row,
        fields,
        history,
    })
}

pub(super) fn row_to_task(
    row: TaskRow,
    field_rows: Vec<CustomFieldRow>,
    history_rows: Vec<StatusHistoryRow>,
) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title: persisted_title,
        task_type: persisted_type,
        current_status,
        is_closed,
        assigned_user_id,
        created_at,
        updated_at,
        closed_at,
        version,
    } = row;

    if is_closed != closed_at.is_some() {
        return Err(TaskRepositoryError::invalid_persisted_data(
            std::io::Error::other(format!(
                "task {id} has is_closed={is_closed} but closed_at={closed_at:?}"
            )),
        ));
    }

    let task_id = TaskId::from_uuid(id);
    let title = TaskTitle::new(persisted_title).map_err(TaskRepositoryError::invalid_persisted_data)?;
    let task_type = TaskType::try_from(persisted_type.as_str())
        .map_err(TaskRepositoryError::invalid_persisted_data)?;

    let custom_fields = field_rows
        .into_iter()
        .map(|field| {
            let name =
                FieldName::new(field.field_name).map_err(TaskRepositoryError::invalid_persisted_data)?;
            Ok(CustomField::from_persisted(
                task_id,
                name,
                field.field_value,
                field.field_type,
                field.created_at,
            ))
        })
        .collect::<TaskRepositoryResult<Vec<_>>>()?;

    let history = history_rows
        .into_iter()
        .map(|entry| {
            Ok(StatusHistoryEntry::new(
                task_id,
                entry.from_status.map(status_from_column).transpose()?,
                status_from_column(entry.to_status)?,
                UserId::from_uuid(entry.assigned_user_id),
                entry.changed_at,
                entry.note,
            ))
        })
        .collect::<TaskRepositoryResult<Vec<_>>>()?;

    let data = PersistedTaskData {
        id: task_id,
        title,
        task_type,
        status: status_from_column(current_status)?,
        assignee: UserId::from_uuid(assigned_user_id),
        custom_fields,
        history,
        created_at,
        updated_at,
        closed_at,
        version: version_from_column(version)?,
    };
    Ok(Task::from_persisted(data))
}

pub(super) fn status_to_column(status: TaskStatus) -> TaskRepositoryResult<i32> {
    i32::try_from(status.value()).map_err(TaskRepositoryError::persistence)
}

pub(super) fn status_from_column(value: i32) -> TaskRepositoryResult<TaskStatus> {
    let raw = u32::try_from(value).map_err(TaskRepositoryError::invalid_persisted_data)?;
    TaskStatus::new(raw).map_err(TaskRepositoryError::invalid_persisted_data)
}

pub(super) fn version_to_column(version: u64) -> TaskRepositoryResult<i64> {
    i64::try_from(version).map_err(TaskRepositoryError::persistence)
}

pub(super) fn version_from_column(value: i64) -> TaskRepositoryResult<u64> {
    u64::try_from(value).map_err(TaskRepositoryError::invalid_persisted_data)
}

fn ordinal(index: usize) -> TaskRepositoryResult<i32> {
    let position = index.saturating_add(1);
    i32::try_from(position).map_err(TaskRepositoryError::persistence)
}
