//! Core type definitions used across the Deskhub workspace.

pub mod id;

pub use id::*;
