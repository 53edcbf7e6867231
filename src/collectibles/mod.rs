//! Typed in-memory collectibles: item records and the keyed multiset that holds them.
//!
//! Command modules load a raw array from the user store, wrap it in an
//! [`Inventory`], mutate it and write [`Inventory::raw`] back under the same
//! field. Nothing in here touches storage.

pub mod errors;
pub mod inventory;
pub mod item;

pub use errors::InventoryError;
pub use inventory::{Inventory, TossAmount};
pub use item::{compare_names, validate_records, ItemRecord, ValidationReport};
