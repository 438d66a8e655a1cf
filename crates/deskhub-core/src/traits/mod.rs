//! Core traits defined in `deskhub-core` and implemented by other crates.

pub mod publisher;

pub use publisher::{EventPublisher, NoopPublisher};
