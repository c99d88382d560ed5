//! PostgreSQL-backed `TicketRepository` implementation using Diesel ORM.
//!
//! Ticket writes that carry an assignment run in one transaction so the
//! ticket row and its history entry are stored together or not at all.
//! Deleting a ticket removes its history through `ON DELETE CASCADE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{TicketRepository, TicketRepositoryError};
use crate::domain::{
    AssignmentRecord, EmailAddress, Ticket, TicketChanges, TicketDescription, TicketDraft,
    TicketId, TicketStatus, TicketTitle, UserId, UserName, UserSummary,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AssignmentRow, NewAssignmentRow, NewTicketRow, TicketRow, TicketUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{ticket_assignments, tickets};

/// Diesel-backed implementation of the `TicketRepository` port.
#[derive(Clone)]
pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TicketRepositoryError {
    map_basic_pool_error(error, TicketRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TicketRepositoryError {
    map_basic_diesel_error(
        error,
        TicketRepositoryError::query,
        TicketRepositoryError::connection,
    )
}

fn corrupt_row(kind: &'static str, id: impl std::fmt::Display, field: &'static str) -> TicketRepositoryError {
    warn!(%id, kind, field, "stored row failed validation");
    TicketRepositoryError::query(format!("stored {kind} {id} has an invalid {field}"))
}

fn row_to_ticket(row: TicketRow) -> Result<Ticket, TicketRepositoryError> {
    let TicketRow {
        id,
        title,
        description,
        status,
        creator_id,
        assignee_id,
        created_at,
        updated_at,
    } = row;
    Ok(Ticket::from(TicketDraft {
        id: TicketId::from_uuid(id),
        title: TicketTitle::new(title).map_err(|_| corrupt_row("ticket", id, "title"))?,
        description: TicketDescription::new(description)
            .map_err(|_| corrupt_row("ticket", id, "description"))?,
        status: TicketStatus::new(status).map_err(|_| corrupt_row("ticket", id, "status"))?,
        creator: UserId::from_uuid(creator_id),
        assignee: assignee_id.map(UserId::from_uuid),
        created_at,
        updated_at,
    }))
}

fn row_to_assignment(row: AssignmentRow) -> Result<AssignmentRecord, TicketRepositoryError> {
    let ticket_id = row.ticket_id;
    Ok(AssignmentRecord {
        ticket_id: TicketId::from_uuid(ticket_id),
        assignee: UserSummary {
            id: UserId::from_uuid(row.assignee_id),
            name: UserName::new(row.assignee_name)
                .map_err(|_| corrupt_row("assignment for ticket", ticket_id, "assignee name"))?,
            email: EmailAddress::new(row.assignee_email)
                .map_err(|_| corrupt_row("assignment for ticket", ticket_id, "assignee email"))?,
        },
        assigned_by: UserId::from_uuid(row.assigned_by),
        assigned_at: row.assigned_at,
    })
}

fn new_assignment_row(record: &AssignmentRecord) -> NewAssignmentRow<'_> {
    NewAssignmentRow {
        ticket_id: *record.ticket_id.as_uuid(),
        assignee_id: *record.assignee.id.as_uuid(),
        assignee_name: record.assignee.name.as_ref(),
        assignee_email: record.assignee.email.as_ref(),
        assigned_by: *record.assigned_by.as_uuid(),
        assigned_at: record.assigned_at,
    }
}

#[async_trait]
impl TicketRepository for DieselTicketRepository {
    async fn insert(
        &self,
        ticket: &Ticket,
        assignment: Option<AssignmentRecord>,
    ) -> Result<(), TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewTicketRow {
            id: *ticket.id().as_uuid(),
            title: ticket.title().as_ref(),
            description: ticket.description().as_ref(),
            status: ticket.status().as_ref(),
            creator_id: *ticket.creator().as_uuid(),
            assignee_id: ticket.assignee().map(|id| *id.as_uuid()),
            created_at: ticket.created_at(),
            updated_at: ticket.updated_at(),
        };
        let history = assignment.as_ref().map(new_assignment_row);

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(tickets::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                if let Some(history) = history {
                    diesel::insert_into(ticket_assignments::table)
                        .values(&history)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TicketRow> = tickets::table
            .find(id.as_uuid())
            .select(TicketRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_ticket).transpose()
    }

    async fn list(&self, creator: Option<UserId>) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = tickets::table
            .select(TicketRow::as_select())
            .order((tickets::created_at.desc(), tickets::id.desc()))
            .into_boxed();
        if let Some(creator) = creator {
            query = query.filter(tickets::creator_id.eq(*creator.as_uuid()));
        }

        let rows: Vec<TicketRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_ticket).collect()
    }

    async fn update(
        &self,
        id: &TicketId,
        changes: &TicketChanges,
        updated_at: DateTime<Utc>,
        assignment: Option<AssignmentRecord>,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let key = *id.as_uuid();
        let changeset = TicketUpdate {
            title: changes.title.as_ref().map(AsRef::as_ref),
            description: changes.description.as_ref().map(AsRef::as_ref),
            status: changes.status.as_ref().map(AsRef::as_ref),
            assignee_id: changes.assignee.map(|assignee| *assignee.as_uuid()),
            updated_at,
        };
        let history = assignment.as_ref().map(new_assignment_row);

        let row = conn
            .transaction(|conn| {
                async move {
                    let updated: Option<TicketRow> = diesel::update(tickets::table.find(key))
                        .set(&changeset)
                        .returning(TicketRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()?;
                    if let (Some(_), Some(history)) = (&updated, history) {
                        diesel::insert_into(ticket_assignments::table)
                            .values(&history)
                            .execute(conn)
                            .await?;
                    }
                    Ok(updated)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row.map(row_to_ticket).transpose()
    }

    async fn delete(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TicketRow> = diesel::delete(tickets::table.find(id.as_uuid()))
            .returning(TicketRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_ticket).transpose()
    }

    async fn assignments(
        &self,
        id: &TicketId,
    ) -> Result<Vec<AssignmentRecord>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AssignmentRow> = ticket_assignments::table
            .filter(ticket_assignments::ticket_id.eq(id.as_uuid()))
            .order((
                ticket_assignments::assigned_at.asc(),
                ticket_assignments::id.asc(),
            ))
            .select(AssignmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_assignment).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6)
            .single()
            .expect("timestamp")
    }

    #[fixture]
    fn ticket_row() -> TicketRow {
        TicketRow {
            id: Uuid::nil(),
            title: "Printer on fire".to_owned(),
            description: "Third floor".to_owned(),
            status: "open".to_owned(),
            creator_id: Uuid::max(),
            assignee_id: None,
            created_at: at(),
            updated_at: at(),
        }
    }

    #[rstest]
    fn converts_ticket_rows(ticket_row: TicketRow) {
        let ticket = row_to_ticket(ticket_row).expect("valid row");
        assert_eq!(ticket.title().as_ref(), "Printer on fire");
        assert_eq!(ticket.creator(), &UserId::from_uuid(Uuid::max()));
        assert!(ticket.assignee().is_none());
    }

    #[rstest]
    fn blank_stored_status_is_a_query_error(mut ticket_row: TicketRow) {
        ticket_row.status = "   ".to_owned();
        let error = row_to_ticket(ticket_row).expect_err("corrupt row");
        assert!(matches!(error, TicketRepositoryError::Query { .. }));
        assert!(error.to_string().contains("status"));
    }

    #[rstest]
    fn assignment_rows_round_trip_through_insert_shape() {
        let record = AssignmentRecord {
            ticket_id: TicketId::from_uuid(Uuid::nil()),
            assignee: UserSummary {
                id: UserId::from_uuid(Uuid::max()),
                name: UserName::new("Grace Hopper").expect("name"),
                email: EmailAddress::new("grace@example.com").expect("email"),
            },
            assigned_by: UserId::from_uuid(Uuid::nil()),
            assigned_at: at(),
        };
        let insert = new_assignment_row(&record);
        let row = AssignmentRow {
            id: 1,
            ticket_id: insert.ticket_id,
            assignee_id: insert.assignee_id,
            assignee_name: insert.assignee_name.to_owned(),
            assignee_email: insert.assignee_email.to_owned(),
            assigned_by: insert.assigned_by,
            assigned_at: insert.assigned_at,
        };

        assert_eq!(row_to_assignment(row).expect("valid row"), record);
    }
}
