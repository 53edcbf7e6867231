//! Keyed multiset of [`ItemRecord`]s.
//!
//! Records are addressed either by `key` (item type, may match many records) or
//! by `uuid` (exactly one record). After construction and after every mutating
//! call the contents are re-sanitized, sorted by name and deduplicated by uuid.
//! The pass is a full rebuild each time; inventories are bounded by gameplay
//! limits to a few hundred records.

use std::collections::HashSet;
use std::hash::Hash;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use super::errors::InventoryError;
use super::item::{name_sort_key, validate_records, ItemRecord, ValidationReport};

/// How many matching records [`Inventory::toss`] removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TossAmount {
    All,
    Count(usize),
}

impl From<usize> for TossAmount {
    fn from(n: usize) -> Self {
        TossAmount::Count(n)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Inventory {
    items: Vec<ItemRecord>,
    #[serde(skip)]
    limit: Option<usize>,
}

impl Inventory {
    /// Build from owned records. Invalid records are dropped, never rejected.
    pub fn new(records: impl IntoIterator<Item = ItemRecord>, limit: Option<usize>) -> Self {
        let mut inv = Self {
            items: records.into_iter().collect(),
            limit,
        };
        inv.normalize();
        inv
    }

    pub fn empty(limit: Option<usize>) -> Self {
        Self::new(Vec::new(), limit)
    }

    /// Build from raw snapshot elements (plain JSON objects).
    pub fn from_raw(records: &[Value], limit: Option<usize>) -> Self {
        let items = records.iter().filter_map(ItemRecord::sanitize_value);
        Self::new(items, limit)
    }

    /// Build from a raw snapshot. Fails only when the snapshot is not an array.
    pub fn from_json(snapshot: &Value, limit: Option<usize>) -> Result<Self, InventoryError> {
        match snapshot {
            Value::Array(records) => Ok(Self::from_raw(records, limit)),
            other => Err(InventoryError::NotAnArray {
                found: json_kind(other),
            }),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    fn normalize(&mut self) {
        let before = self.items.len();
        let mut items: Vec<ItemRecord> = std::mem::take(&mut self.items)
            .into_iter()
            .filter_map(ItemRecord::sanitize)
            .collect();
        items.sort_by_cached_key(|item| name_sort_key(&item.name));
        let mut seen = HashSet::with_capacity(items.len());
        items.retain(|item| seen.insert(item.uuid.clone()));
        if items.len() != before {
            debug!(
                "collectibles: normalize dropped {} record(s)",
                before - items.len()
            );
        }
        self.items = items;
    }

    // ------------------------------------------------------------------
    // Lookups by key
    // ------------------------------------------------------------------

    pub fn get_one(&self, key: &str) -> Option<&ItemRecord> {
        if key.is_empty() {
            return None;
        }
        self.items.iter().find(|item| item.key == key)
    }

    pub fn get(&self, key: &str) -> Vec<&ItemRecord> {
        if key.is_empty() {
            return Vec::new();
        }
        self.items.iter().filter(|item| item.key == key).collect()
    }

    /// Live view of the ordered contents.
    pub fn get_all(&self) -> &[ItemRecord] {
        &self.items
    }

    /// Mutable view of the contents. Edits that break ordering or defaults are
    /// repaired by the next mutating call; [`Inventory::validate`] reports them meanwhile.
    pub fn get_all_mut(&mut self) -> &mut [ItemRecord] {
        &mut self.items
    }

    pub fn has(&self, key: &str) -> bool {
        self.get_one(key).is_some()
    }

    pub fn get_amount(&self, key: &str) -> usize {
        if key.is_empty() {
            return 0;
        }
        self.items.iter().filter(|item| item.key == key).count()
    }

    pub fn has_amount(&self, key: &str, amount: usize) -> bool {
        self.get_amount(key) >= amount
    }

    // ------------------------------------------------------------------
    // Lookups by uuid
    // ------------------------------------------------------------------

    pub fn get_one_by_id(&self, uuid: &str) -> Option<&ItemRecord> {
        if uuid.is_empty() {
            return None;
        }
        self.items.iter().find(|item| item.uuid == uuid)
    }

    pub fn get_by_id(&self, uuid: &str) -> Vec<&ItemRecord> {
        self.get_one_by_id(uuid).into_iter().collect()
    }

    pub fn has_by_id(&self, uuid: &str) -> bool {
        self.get_one_by_id(uuid).is_some()
    }

    /// Edit one record in place, then re-normalize. Returns false if no record has `uuid`.
    pub fn update_by_id(&mut self, uuid: &str, edit: impl FnOnce(&mut ItemRecord)) -> bool {
        if uuid.is_empty() {
            return false;
        }
        match self.items.iter_mut().find(|item| item.uuid == uuid) {
            Some(item) => {
                edit(item);
                self.normalize();
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Adding
    // ------------------------------------------------------------------

    /// Append without a capacity check; returns the new size.
    pub fn add_one(&mut self, item: ItemRecord) -> usize {
        self.items.push(item);
        self.normalize();
        self.items.len()
    }

    /// Append unless that would exceed the limit.
    pub fn add_safe(&mut self, item: ItemRecord) -> bool {
        self.add_safe_many(vec![item])
    }

    pub fn add_safe_many(&mut self, items: Vec<ItemRecord>) -> bool {
        if !self.fits(items.len()) {
            debug!(
                "collectibles: refusing {} record(s), size {} limit {:?}",
                items.len(),
                self.items.len(),
                self.limit
            );
            return false;
        }
        self.items.extend(items);
        self.normalize();
        true
    }

    /// Whether `extra` more records fit under the limit.
    pub fn fits(&self, extra: usize) -> bool {
        match self.limit {
            Some(limit) => self.items.len() + extra <= limit,
            None => true,
        }
    }

    /// Append every record of `other`. Neither side changes if the combined
    /// size would exceed this inventory's limit.
    pub fn merge(&mut self, other: &Inventory) -> Result<&mut Self, InventoryError> {
        let attempted = self.items.len() + other.items.len();
        if let Some(limit) = self.limit {
            if attempted > limit {
                return Err(InventoryError::CapacityExceeded { limit, attempted });
            }
        }
        self.items.extend(other.items.iter().cloned());
        self.normalize();
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Removing
    // ------------------------------------------------------------------

    pub fn delete_one(&mut self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        self.delete_one_by(|item| item.key == key)
    }

    /// Remove the first record matching `pred`.
    pub fn delete_one_by(&mut self, pred: impl Fn(&ItemRecord) -> bool) -> bool {
        match self.items.iter().position(pred) {
            Some(idx) => {
                self.items.remove(idx);
                self.normalize();
                true
            }
            None => false,
        }
    }

    /// Remove every record matching `pred`; returns how many went.
    pub fn delete_by(&mut self, pred: impl Fn(&ItemRecord) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !pred(item));
        let removed = before - self.items.len();
        if removed > 0 {
            self.normalize();
        }
        removed
    }

    /// Remove every record whose serialized `field` equals `value`.
    pub fn delete_by_field(&mut self, field: &str, value: &Value) -> usize {
        self.delete_by(|item| item.field_matches(field, value))
    }

    pub fn delete_one_by_field(&mut self, field: &str, value: &Value) -> bool {
        self.delete_one_by(|item| item.field_matches(field, value))
    }

    pub fn delete_one_by_id(&mut self, uuid: &str) -> bool {
        if uuid.is_empty() {
            return false;
        }
        self.delete_one_by(|item| item.uuid == uuid)
    }

    pub fn delete_by_id(&mut self, uuid: &str) -> usize {
        if uuid.is_empty() {
            return 0;
        }
        self.delete_by(|item| item.uuid == uuid)
    }

    /// Remove the record carrying the same uuid as `item` (a clone works as well
    /// as the original). No-op if absent.
    pub fn delete_ref(&mut self, item: &ItemRecord) -> bool {
        self.delete_one_by_id(&item.uuid)
    }

    /// Remove up to `amount` records with `key`, or all of them; returns how many went.
    pub fn toss(&mut self, key: &str, amount: impl Into<TossAmount>) -> usize {
        if key.is_empty() {
            return 0;
        }
        let budget = match amount.into() {
            TossAmount::All => usize::MAX,
            TossAmount::Count(n) => n,
        };
        let mut removed = 0;
        self.items.retain(|item| {
            if removed < budget && item.key == key {
                removed += 1;
                false
            } else {
                true
            }
        });
        if removed > 0 {
            self.normalize();
        }
        removed
    }

    // ------------------------------------------------------------------
    // Views and export
    // ------------------------------------------------------------------

    /// One record per distinct key, first occurrence first.
    pub fn to_unique(&self) -> Vec<&ItemRecord> {
        self.to_unique_by(|item| item.key.clone())
    }

    pub fn to_unique_by<K, F>(&self, key_fn: F) -> Vec<&ItemRecord>
    where
        K: Eq + Hash,
        F: Fn(&ItemRecord) -> K,
    {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .filter(|item| seen.insert(key_fn(item)))
            .collect()
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unique_size(&self) -> usize {
        self.to_unique().len()
    }

    /// Copy of the contents for handing back to the user store.
    pub fn raw(&self) -> Vec<ItemRecord> {
        self.items.clone()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.items).unwrap_or_else(|_| Value::Array(Vec::new()))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItemRecord> {
        self.items.iter()
    }

    pub fn validate(&self) -> ValidationReport {
        validate_records(&self.items)
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a ItemRecord;
    type IntoIter = std::slice::Iter<'a, ItemRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
