//! `TicketRepository` backed by a map plus an append-only history list.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{TicketRepository, TicketRepositoryError};
use crate::domain::{AssignmentRecord, Ticket, TicketChanges, TicketId, UserId};

#[derive(Debug, Default)]
struct Store {
    tickets: HashMap<TicketId, Ticket>,
    assignments: Vec<AssignmentRecord>,
}

/// Process-local ticket store.
#[derive(Debug, Default)]
pub struct MemoryTicketRepository {
    store: RwLock<Store>,
}

impl MemoryTicketRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketRepository for MemoryTicketRepository {
    async fn insert(
        &self,
        ticket: &Ticket,
        assignment: Option<AssignmentRecord>,
    ) -> Result<(), TicketRepositoryError> {
        let mut store = self.store.write().await;
        if store.tickets.contains_key(&ticket.id()) {
            return Err(TicketRepositoryError::query(format!(
                "ticket {} already exists",
                ticket.id()
            )));
        }
        store.tickets.insert(ticket.id(), ticket.clone());
        store.assignments.extend(assignment);
        Ok(())
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError> {
        Ok(self.store.read().await.tickets.get(id).cloned())
    }

    async fn list(&self, creator: Option<UserId>) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let store = self.store.read().await;
        let mut tickets: Vec<Ticket> = store
            .tickets
            .values()
            .filter(|ticket| creator.is_none_or(|creator| *ticket.creator() == creator))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(tickets)
    }

    async fn update(
        &self,
        id: &TicketId,
        changes: &TicketChanges,
        updated_at: DateTime<Utc>,
        assignment: Option<AssignmentRecord>,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut store = self.store.write().await;
        let Some(current) = store.tickets.get_mut(id) else {
            return Ok(None);
        };
        let updated = current.with_changes(changes, updated_at);
        *current = updated.clone();
        store.assignments.extend(assignment);
        Ok(Some(updated))
    }

    async fn delete(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut store = self.store.write().await;
        let removed = store.tickets.remove(id);
        if removed.is_some() {
            store.assignments.retain(|record| record.ticket_id != *id);
        }
        Ok(removed)
    }

    async fn assignments(
        &self,
        id: &TicketId,
    ) -> Result<Vec<AssignmentRecord>, TicketRepositoryError> {
        let store = self.store.read().await;
        // Insertion order is assignment order.
        Ok(store
            .assignments
            .iter()
            .filter(|record| record.ticket_id == *id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        EmailAddress, TicketDescription, TicketDraft, TicketStatus, TicketTitle, UserName,
        UserSummary,
    };
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
            .single()
            .expect("timestamp")
    }

    fn ticket(creator: UserId, offset_minutes: i64) -> Ticket {
        let at = base_time() + Duration::minutes(offset_minutes);
        Ticket::from(TicketDraft {
            id: TicketId::random(),
            title: TicketTitle::new("Printer on fire").expect("title"),
            description: TicketDescription::new("Third floor").expect("description"),
            status: TicketStatus::open(),
            creator,
            assignee: None,
            created_at: at,
            updated_at: at,
        })
    }

    fn record(ticket: &Ticket, assignee: UserId) -> AssignmentRecord {
        AssignmentRecord {
            ticket_id: ticket.id(),
            assignee: UserSummary {
                id: assignee,
                name: UserName::new("Grace Hopper").expect("name"),
                email: EmailAddress::new("grace@example.com").expect("email"),
            },
            assigned_by: *ticket.creator(),
            assigned_at: ticket.created_at(),
        }
    }

    #[fixture]
    fn repo() -> MemoryTicketRepository {
        MemoryTicketRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn list_is_newest_first_and_filters_by_creator(repo: MemoryTicketRepository) {
        let alice = UserId::random();
        let bob = UserId::random();
        let older = ticket(alice, 0);
        let newer = ticket(alice, 5);
        let foreign = ticket(bob, 10);
        for t in [&older, &newer, &foreign] {
            repo.insert(t, None).await.expect("insert");
        }

        let mine = repo.list(Some(alice)).await.expect("list");
        let all = repo.list(None).await.expect("list");

        assert_eq!(mine, vec![newer.clone(), older.clone()]);
        assert_eq!(all, vec![foreign, newer, older]);
    }

    #[rstest]
    #[tokio::test]
    async fn equal_timestamps_order_by_id_descending(repo: MemoryTicketRepository) {
        let creator = UserId::random();
        let first = ticket(creator, 0);
        let second = ticket(creator, 0);
        repo.insert(&first, None).await.expect("insert");
        repo.insert(&second, None).await.expect("insert");

        let ids: Vec<TicketId> = repo
            .list(None)
            .await
            .expect("list")
            .iter()
            .map(Ticket::id)
            .collect();

        let mut expected = vec![first.id(), second.id()];
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(ids, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn update_merges_and_appends_history(repo: MemoryTicketRepository) {
        let original = ticket(UserId::random(), 0);
        repo.insert(&original, None).await.expect("insert");
        let assignee = UserId::random();
        let changes = TicketChanges {
            status: Some(TicketStatus::new("closed").expect("status")),
            assignee: Some(assignee),
            ..TicketChanges::default()
        };
        let later = base_time() + Duration::hours(1);

        let updated = repo
            .update(
                &original.id(),
                &changes,
                later,
                Some(record(&original, assignee)),
            )
            .await
            .expect("update")
            .expect("present");

        assert_eq!(updated.status().as_ref(), "closed");
        assert_eq!(updated.title(), original.title());
        assert_eq!(updated.assignee(), Some(&assignee));
        assert_eq!(updated.updated_at(), later);
        assert_eq!(updated.created_at(), original.created_at());
        assert_eq!(
            repo.assignments(&original.id()).await.expect("history").len(),
            1
        );
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_missing_ticket_is_none(repo: MemoryTicketRepository) {
        let result = repo
            .update(
                &TicketId::random(),
                &TicketChanges::default(),
                base_time(),
                None,
            )
            .await
            .expect("update");
        assert!(result.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn delete_removes_history(repo: MemoryTicketRepository) {
        let original = ticket(UserId::random(), 0);
        let assignee = UserId::random();
        repo.insert(&original, Some(record(&original, assignee)))
            .await
            .expect("insert");

        let removed = repo.delete(&original.id()).await.expect("delete");

        assert_eq!(removed, Some(original.clone()));
        assert!(repo.find_by_id(&original.id()).await.expect("find").is_none());
        assert!(
            repo.assignments(&original.id())
                .await
                .expect("history")
                .is_empty()
        );
    }
}
