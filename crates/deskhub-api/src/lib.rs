//! # deskhub-api
//!
//! HTTP API layer for Deskhub built on Axum.
//!
//! Serves the item and folder endpoints the desktop client depends on, the
//! `/ws` sync channel upgrade, CORS and request logging middleware,
//! request extractors with validation, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
