//! Custom Axum extractors.

pub mod json;

pub use json::{OptionalJson, ValidatedJson};
