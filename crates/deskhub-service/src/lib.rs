//! # deskhub-service
//!
//! Business logic for Deskhub items. [`ItemService`] validates input,
//! enforces the one-level folder rule, persists through an
//! [`ItemRepository`](deskhub_database::ItemRepository), and publishes an
//! [`ItemEvent`](deskhub_core::events::ItemEvent) after every change.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod item;

pub use item::{ItemService, rules};
