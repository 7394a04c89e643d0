//! Domain Layer
//!
//! Core entities shared by every other layer.
//! This layer has NO external dependencies (except serde/chrono for serialization).

mod item;

pub use item::{CollectionName, Item, ItemId};
