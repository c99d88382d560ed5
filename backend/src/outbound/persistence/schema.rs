//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`
//! exactly. Regenerate with `diesel print-schema` after changing them.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        /// Lower-cased; unique.
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Support tickets. `assignee_id` is a live reference into `users`.
    tickets (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        status -> Varchar,
        creator_id -> Uuid,
        assignee_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only assignment history; rows cascade with their ticket.
    ticket_assignments (id) {
        id -> Int8,
        ticket_id -> Uuid,
        assignee_id -> Uuid,
        assignee_name -> Varchar,
        assignee_email -> Varchar,
        assigned_by -> Uuid,
        assigned_at -> Timestamptz,
    }
}

diesel::joinable!(ticket_assignments -> tickets (ticket_id));

diesel::allow_tables_to_appear_in_same_query!(users, tickets, ticket_assignments);
