//! Item shop state and transactions.
//!
//! This module provides:
//! - Shop stocking from a caller-supplied catalog using weighted rolls
//! - An explicit [`ShopState`] with an init/refresh lifecycle, owned by the host
//! - Buy/sell operations against an [`Inventory`] and the user's balance
//! - The reply-driven shop conversation in [`dialogue`]
//!
//! Catalogs (templates, prices, stocking chances) always come from the caller.

pub mod dialogue;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chance::{pick_random_with_prob_using, Weighted};
use crate::collectibles::{Inventory, ItemRecord};
use crate::logutil::escape_log;
use crate::store::{self, StoreError, UserStore};

/// Configuration for shop stocking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Number of distinct catalog entries stocked per restock
    pub slots: usize,
    /// Units available per stocked entry
    pub stock_per_slot: u32,
    /// Minimum seconds between automatic restocks
    pub restock_interval_secs: i64,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            slots: 6,
            stock_per_slot: 5,
            restock_interval_secs: 3600,
        }
    }
}

/// A stockable template with its buy price and stocking weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item: ItemRecord,
    pub price: i64,
    pub chance: f64,
}

impl CatalogEntry {
    pub fn new(item: ItemRecord, price: i64, chance: f64) -> Self {
        Self {
            item,
            price,
            chance,
        }
    }

    pub fn key(&self) -> &str {
        &self.item.key
    }
}

/// One stocked entry with its remaining quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopListing {
    pub item: ItemRecord,
    pub price: i64,
    pub remaining: u32,
}

impl ShopListing {
    pub fn key(&self) -> &str {
        &self.item.key
    }

    pub fn in_stock(&self) -> bool {
        self.remaining > 0
    }
}

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("item {0} is not stocked")]
    NotStocked(String),

    #[error("only {available} left in stock")]
    OutOfStock { available: u32 },

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("insufficient funds: price {price}, balance {balance}")]
    InsufficientFunds { price: i64, balance: i64 },

    #[error("inventory is full")]
    InventoryFull,

    #[error("item {0} is not in the inventory")]
    NotOwned(String),

    #[error("item {0} cannot be sold")]
    CannotSell(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub items: Vec<ItemRecord>,
    pub total_price: i64,
    pub balance_after: i64,
}

/// Current stock of one shop plus the time it was last rolled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopState {
    pub stock: Vec<ShopListing>,
    pub last_restock: Option<DateTime<Utc>>,
}

impl ShopState {
    /// Create a shop and roll its first stock.
    pub fn init<R: Rng + ?Sized>(
        catalog: &[CatalogEntry],
        config: &ShopConfig,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Self {
        let mut state = Self::default();
        state.force_restock(catalog, config, rng, now);
        state
    }

    pub fn needs_restock(&self, config: &ShopConfig, now: DateTime<Utc>) -> bool {
        match self.last_restock {
            None => true,
            Some(last) => match Duration::try_seconds(config.restock_interval_secs) {
                Some(interval) => now.signed_duration_since(last) >= interval,
                None => false,
            },
        }
    }

    /// Restock if the interval has elapsed. Returns true when the stock was rolled.
    pub fn refresh<R: Rng + ?Sized>(
        &mut self,
        catalog: &[CatalogEntry],
        config: &ShopConfig,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.needs_restock(config, now) {
            return false;
        }
        self.force_restock(catalog, config, rng, now);
        true
    }

    /// Replace the stock with `config.slots` distinct weighted picks from `catalog`.
    /// Entries without a key can never land in an inventory and are skipped.
    pub fn force_restock<R: Rng + ?Sized>(
        &mut self,
        catalog: &[CatalogEntry],
        config: &ShopConfig,
        rng: &mut R,
        now: DateTime<Utc>,
    ) {
        let mut pool: Vec<Weighted<usize>> = catalog
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.key().is_empty())
            .map(|(idx, entry)| Weighted::new(idx, entry.chance))
            .collect();
        let mut stock = Vec::with_capacity(config.slots.min(catalog.len()));

        while stock.len() < config.slots {
            let Some(picked) = pick_random_with_prob_using(&pool, rng) else {
                break;
            };
            pool.retain(|w| w.value != picked);
            let entry = &catalog[picked];
            // Several catalog rows may share a key; only the first stocked one counts.
            if stock.iter().any(|l: &ShopListing| l.key() == entry.key()) {
                continue;
            }
            stock.push(ShopListing {
                item: entry.item.clone(),
                price: entry.price,
                remaining: config.stock_per_slot,
            });
        }

        info!(
            "shop: restocked {} listing(s) from catalog of {}",
            stock.len(),
            catalog.len()
        );
        self.stock = stock;
        self.last_restock = Some(now);
    }

    pub fn listing(&self, key: &str) -> Option<&ShopListing> {
        self.stock.iter().find(|l| l.key() == key)
    }

    /// Buy `quantity` of `key` for `user_id`.
    ///
    /// Records land in `inventory` with fresh uuids; the caller writes the
    /// inventory back with [`store::save_inventory`]. Money is only taken once
    /// the inventory has accepted the records.
    pub fn buy(
        &mut self,
        key: &str,
        quantity: u32,
        user_store: &impl UserStore,
        user_id: &str,
        inventory: &mut Inventory,
    ) -> Result<Purchase, ShopError> {
        if quantity == 0 {
            return Err(ShopError::InvalidQuantity);
        }
        if key.is_empty() {
            return Err(ShopError::NotStocked(String::new()));
        }
        let (template, price, remaining) = {
            let listing = self
                .listing(key)
                .ok_or_else(|| ShopError::NotStocked(key.to_string()))?;
            (listing.item.clone(), listing.price, listing.remaining)
        };
        if remaining < quantity {
            return Err(ShopError::OutOfStock {
                available: remaining,
            });
        }

        let total_price = price.saturating_mul(i64::from(quantity));
        let balance = store::get_balance(user_store, user_id)?;
        if balance < total_price {
            return Err(ShopError::InsufficientFunds {
                price: total_price,
                balance,
            });
        }

        let items: Vec<ItemRecord> = (0..quantity).map(|_| template.fresh_copy()).collect();
        if !inventory.add_safe_many(items.clone()) {
            return Err(ShopError::InventoryFull);
        }
        let balance_after = match store::take_balance(user_store, user_id, total_price) {
            Ok(b) => b,
            Err(e) => {
                for item in &items {
                    inventory.delete_ref(item);
                }
                return Err(e.into());
            }
        };

        if let Some(listing) = self.stock.iter_mut().find(|l| l.key() == key) {
            listing.remaining -= quantity;
        }
        info!(
            "shop: {} bought {}x {} for {}",
            user_id,
            quantity,
            escape_log(&template.name),
            total_price
        );
        Ok(Purchase {
            items,
            total_price,
            balance_after,
        })
    }

    /// Sell the record `uuid` back for its `sellPrice`. Returns the amount credited.
    ///
    /// Selling never touches shop stock.
    pub fn sell(
        uuid: &str,
        user_store: &impl UserStore,
        user_id: &str,
        inventory: &mut Inventory,
    ) -> Result<i64, ShopError> {
        let item = inventory
            .get_one_by_id(uuid)
            .cloned()
            .ok_or_else(|| ShopError::NotOwned(uuid.to_string()))?;
        if item.cannot_toss {
            debug!("shop: {} tried to sell locked item {}", user_id, uuid);
            return Err(ShopError::CannotSell(item.name));
        }
        let credit = item.sell_price.max(0.0).round() as i64;
        inventory.delete_ref(&item);
        if let Err(e) = store::add_balance(user_store, user_id, credit) {
            inventory.add_one(item);
            return Err(e.into());
        }
        info!(
            "shop: {} sold {} for {}",
            user_id,
            escape_log(&item.name),
            credit
        );
        Ok(credit)
    }
}
