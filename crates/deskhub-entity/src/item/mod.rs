//! Item domain entities.

pub mod kind;
pub mod model;
pub mod patch;
pub mod rules;
pub mod spatial;

pub use kind::ItemKind;
pub use model::{Item, NewItem, Placement};
pub use patch::ItemPatch;
pub use spatial::{Dimensions, Position};
