//! In-memory repositories used when no database is configured.
//!
//! State lives behind a `tokio::sync::RwLock` and is lost on restart. Each
//! mutation holds the write lock for its whole duration, which gives the same
//! per-call atomicity the PostgreSQL adapters get from transactions.

mod ticket_repository;
mod user_repository;

pub use ticket_repository::MemoryTicketRepository;
pub use user_repository::MemoryUserRepository;
