//! # deskhub-core
//!
//! Core crate for Deskhub. Contains configuration schemas, typed
//! identifiers, domain events, the event-publishing trait, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Deskhub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
