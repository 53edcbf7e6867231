//! # idlebox - data utilities for idle-game chat bot commands
//!
//! idlebox holds the pieces shared by the gardening, pet, gear and shop
//! commands of a chat bot. The host bot owns message delivery and persistence;
//! idlebox owns the in-memory data and the rules applied to it.
//!
//! ## Features
//!
//! - **Collectibles**: a keyed multiset of item records that stays sanitized,
//!   name-sorted and uuid-unique after every change.
//! - **Weighted rolls**: chance-proportional picks for drops, mutations and stocking.
//! - **User store boundary**: the `get_cache`/`set_item` contract plus balance
//!   and inventory helpers for older command modules.
//! - **Shops**: explicit shop state with restock lifecycle, buy and sell.
//! - **Pending interactions**: reply-driven conversations as a typed state machine.
//!
//! ## Quick Start
//!
//! ```rust
//! use idlebox::collectibles::ItemRecord;
//! use idlebox::store::{self, MemoryStore, INVENTORY_FIELD};
//!
//! let users = MemoryStore::new();
//! let mut inv = store::load_inventory(&users, "user-1", INVENTORY_FIELD, Some(50)).unwrap();
//! inv.add_one(ItemRecord::new("carrot_seed", "Carrot Seed"));
//! store::save_inventory(&users, "user-1", INVENTORY_FIELD, &inv).unwrap();
//! assert_eq!(inv.get_amount("carrot_seed"), 1);
//! ```
//!
//! ## Module Organization
//!
//! - [`chance`] - Weighted random selection
//! - [`collectibles`] - Item records and the inventory container
//! - [`store`] - User-data cache boundary and compatibility helpers
//! - [`shop`] - Shop state, transactions and the shop dialogue
//! - [`interaction`] - Pending replies keyed by message id
//! - [`config`] - Configuration loading and validation
//! - [`logutil`] - Log-safe rendering of user strings

pub mod chance;
pub mod collectibles;
pub mod config;
pub mod interaction;
pub mod logutil;
pub mod shop;
pub mod store;
