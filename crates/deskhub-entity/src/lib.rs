//! # deskhub-entity
//!
//! Spatial item model for Deskhub. An [`Item`](item::Item) is a file or a
//! folder that lives either on the desktop canvas at a position or inside
//! exactly one folder. Folders never contain folders.

pub mod item;

pub use item::{Dimensions, Item, ItemKind, ItemPatch, NewItem, Placement, Position};
