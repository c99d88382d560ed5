//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: in-process repositories for development and tests
//! - **security**: argon2id password hashing and HS256 bearer tokens
//! - **mail**: HTTP mail relay and a log-only fallback
//! - **realtime**: broadcast hub feeding WebSocket subscribers
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod mail;
pub mod memory;
pub mod persistence;
pub mod realtime;
pub mod security;
