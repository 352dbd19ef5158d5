//! Diesel schema for task workflow persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 100]
        title -> Varchar,
        /// Task type name.
        #[max_length = 50]
        task_type -> Varchar,
        /// Current workflow status.
        current_status -> Int4,
        /// Whether the task has been closed.
        is_closed -> Bool,
        /// Currently assigned user.
        assigned_user_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
        /// Closing timestamp.
        closed_at -> Nullable<Timestamptz>,
        /// Optimistic concurrency version.
        version -> Int8,
    }
}

diesel::table! {
    /// Custom field values owned by tasks.
    task_custom_fields (task_id, field_name) {
        /// Owning task.
        task_id -> Uuid,
        /// Field name, unique per task.
        #[max_length = 100]
        field_name -> Varchar,
        /// Field value.
        field_value -> Text,
        /// Value type tag.
        #[max_length = 50]
        field_type -> Varchar,
        /// Insertion order within the task.
        position -> Int4,
        /// First write timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only status history.
    task_status_history (task_id, sequence) {
        /// Owning task.
        task_id -> Uuid,
        /// Position within the task's history, starting at 1.
        sequence -> Int4,
        /// Status before the change; null for the creation entry.
        from_status -> Nullable<Int4>,
        /// Status after the change.
        to_status -> Int4,
        /// Assignee recorded by the change.
        assigned_user_id -> Uuid,
        /// Change timestamp.
        changed_at -> Timestamptz,
        /// Free-text note.
        #[max_length = 500]
        note -> Varchar,
    }
}

diesel::joinable!(task_custom_fields -> tasks (task_id));
diesel::joinable!(task_status_history -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(tasks, task_custom_fields, task_status_history);
