//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories implement the domain's driven ports over `diesel-async`
//! connections checked out of a `bb8` pool. Row structs and table
//! definitions stay private to this module; every database error is mapped
//! onto the owning port's error type.
//!
//! ```ignore
//! use helpdesk::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! run_migrations("postgres://localhost/helpdesk").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/helpdesk")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_ticket_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_ticket_repository::DieselTicketRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
