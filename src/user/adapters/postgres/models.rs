//! Diesel row models for user persistence.

use super::schema::users;
use diesel::prelude::*;

/// Row model for users, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
}
