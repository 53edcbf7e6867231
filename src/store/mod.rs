//! User-data cache boundary and the balance/inventory helpers command modules use.
//!
//! The real cache belongs to the host bot. This module only fixes its shape
//! ([`UserStore`]), ships an in-memory implementation for tests and small hosts
//! ([`MemoryStore`]), and provides the compatibility helpers older command
//! modules called for balances and inventory fields.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::{debug, trace};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::collectibles::{Inventory, InventoryError};

/// Field holding a user's coin balance.
pub const BALANCE_FIELD: &str = "money";
/// Field holding a user's main item array.
pub const INVENTORY_FIELD: &str = "inventory";

/// All stored fields for one user id.
pub type UserRecord = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: i64, available: i64 },

    #[error("user store lock poisoned")]
    Poisoned,

    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

/// Key-value cache of user records supplied by the host.
pub trait UserStore {
    /// Current record for `user_id`; unknown users yield an empty record.
    fn get_cache(&self, user_id: &str) -> Result<UserRecord, StoreError>;

    /// Shallow-merge `partial` into the stored record for `user_id`.
    fn set_item(&self, user_id: &str, partial: UserRecord) -> Result<(), StoreError>;
}

/// Process-local [`UserStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserStore for MemoryStore {
    fn get_cache(&self, user_id: &str) -> Result<UserRecord, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::Poisoned)?;
        Ok(users.get(user_id).cloned().unwrap_or_default())
    }

    fn set_item(&self, user_id: &str, partial: UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::Poisoned)?;
        let record = users.entry(user_id.to_string()).or_default();
        trace!("store: set {} field(s) for {}", partial.len(), user_id);
        record.extend(partial);
        Ok(())
    }
}

fn single_field(field: &str, value: Value) -> UserRecord {
    let mut partial = Map::new();
    partial.insert(field.to_string(), value);
    partial
}

/// Coin balance for `user_id`; missing or non-numeric values read as 0.
pub fn get_balance(store: &impl UserStore, user_id: &str) -> Result<i64, StoreError> {
    let record = store.get_cache(user_id)?;
    let balance = match record.get(BALANCE_FIELD) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    };
    Ok(balance)
}

pub fn set_balance(store: &impl UserStore, user_id: &str, amount: i64) -> Result<(), StoreError> {
    store.set_item(user_id, single_field(BALANCE_FIELD, Value::from(amount)))
}

/// Add `delta` (may be negative) and return the new balance.
pub fn add_balance(store: &impl UserStore, user_id: &str, delta: i64) -> Result<i64, StoreError> {
    let balance = get_balance(store, user_id)?.saturating_add(delta);
    set_balance(store, user_id, balance)?;
    Ok(balance)
}

/// Deduct `amount`, refusing without changes when the balance is too low.
pub fn take_balance(store: &impl UserStore, user_id: &str, amount: i64) -> Result<i64, StoreError> {
    let available = get_balance(store, user_id)?;
    if available < amount {
        debug!(
            "store: {} cannot pay {} (balance {})",
            user_id, amount, available
        );
        return Err(StoreError::InsufficientFunds {
            needed: amount,
            available,
        });
    }
    let balance = available - amount;
    set_balance(store, user_id, balance)?;
    Ok(balance)
}

/// Wrap the array stored under `field`; a missing or null field gives an empty inventory.
pub fn load_inventory(
    store: &impl UserStore,
    user_id: &str,
    field: &str,
    limit: Option<usize>,
) -> Result<Inventory, StoreError> {
    let record = store.get_cache(user_id)?;
    match record.get(field) {
        None | Some(Value::Null) => Ok(Inventory::empty(limit)),
        Some(snapshot) => Ok(Inventory::from_json(snapshot, limit)?),
    }
}

/// Write the inventory's raw contents back under `field`.
pub fn save_inventory(
    store: &impl UserStore,
    user_id: &str,
    field: &str,
    inventory: &Inventory,
) -> Result<(), StoreError> {
    store.set_item(user_id, single_field(field, inventory.to_json()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectibles::ItemRecord;
    use serde_json::json;

    #[test]
    fn set_item_merges_fields() {
        let store = MemoryStore::new();
        store
            .set_item("u1", single_field("name", json!("Ada")))
            .unwrap();
        store.set_item("u1", single_field("money", json!(5))).unwrap();
        let record = store.get_cache("u1").unwrap();
        assert_eq!(record.get("name"), Some(&json!("Ada")));
        assert_eq!(record.get("money"), Some(&json!(5)));
        assert!(store.get_cache("nobody").unwrap().is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn balance_reads_floats_and_garbage() {
        let store = MemoryStore::new();
        assert_eq!(get_balance(&store, "u1").unwrap(), 0);
        store.set_item("u1", single_field("money", json!(12.9))).unwrap();
        assert_eq!(get_balance(&store, "u1").unwrap(), 12);
        store.set_item("u1", single_field("money", json!("lots"))).unwrap();
        assert_eq!(get_balance(&store, "u1").unwrap(), 0);
    }

    #[test]
    fn take_balance_refuses_overdraft() {
        let store = MemoryStore::new();
        set_balance(&store, "u1", 10).unwrap();
        let err = take_balance(&store, "u1", 11).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientFunds {
                needed: 11,
                available: 10
            }
        ));
        assert_eq!(get_balance(&store, "u1").unwrap(), 10);
        assert_eq!(take_balance(&store, "u1", 4).unwrap(), 6);
        assert_eq!(add_balance(&store, "u1", -1).unwrap(), 5);
    }

    #[test]
    fn inventory_round_trips_through_store() {
        let store = MemoryStore::new();
        let mut inv = load_inventory(&store, "u1", INVENTORY_FIELD, Some(10)).unwrap();
        assert!(inv.is_empty());
        inv.add_one(ItemRecord::new("seed", "Seed"));
        save_inventory(&store, "u1", INVENTORY_FIELD, &inv).unwrap();

        let reloaded = load_inventory(&store, "u1", INVENTORY_FIELD, Some(10)).unwrap();
        assert_eq!(reloaded.raw(), inv.raw());
    }

    #[test]
    fn non_array_field_is_an_error() {
        let store = MemoryStore::new();
        store
            .set_item("u1", single_field(INVENTORY_FIELD, json!({"oops": 1})))
            .unwrap();
        let err = load_inventory(&store, "u1", INVENTORY_FIELD, None).unwrap_err();
        assert!(matches!(err, StoreError::Inventory(InventoryError::NotAnArray { .. })));
    }
}
