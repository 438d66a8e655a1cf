//! HTTP request handlers.

pub mod folder;
pub mod health;
pub mod item;
pub mod ws;
