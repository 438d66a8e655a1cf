//! Item operations.

pub mod service;

pub use deskhub_entity::item::rules;
pub use service::ItemService;
