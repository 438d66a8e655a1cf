//! # deskhub-database
//!
//! Persistence for Deskhub items: PostgreSQL connection management,
//! migrations, and the [`ItemRepository`] trait with a PostgreSQL and an
//! in-memory implementation.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{ItemRepository, MemoryItemRepository, PgItemRepository};
