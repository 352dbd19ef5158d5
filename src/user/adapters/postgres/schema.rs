//! Diesel schema for user persistence.

diesel::table! {
    /// Users tasks can be assigned to.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 100]
        name -> Varchar,
        /// Unique, lowercased email address.
        #[max_length = 100]
        email -> Varchar,
    }
}
