//! End-to-end shop conversation: pending replies, dialogue transitions,
//! purchases against the user store and inventory write-back.

use chrono::{Duration, Utc};
use idlebox::config::Config;
use idlebox::interaction::InteractionRegistry;
use idlebox::shop::dialogue::{continue_dialogue, ShopAction, ShopDialogue};
use idlebox::shop::{ShopError, ShopState};
use idlebox::store::{self, MemoryStore, UserStore, INVENTORY_FIELD};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

mod common;
use common::garden_catalog;

/// Minimal host: runs the action a dialogue step asks for.
fn run_action(
    action: &ShopAction,
    shop: &mut ShopState,
    users: &MemoryStore,
    user_id: &str,
    limit: Option<usize>,
) -> Result<(), ShopError> {
    let mut inv = store::load_inventory(users, user_id, INVENTORY_FIELD, limit)?;
    match action {
        ShopAction::Buy { key, quantity } => {
            shop.buy(key, *quantity, users, user_id, &mut inv)?;
        }
        ShopAction::Sell { uuid } => {
            ShopState::sell(uuid, users, user_id, &mut inv)?;
        }
        ShopAction::ShowStock | ShopAction::ShowInventory => return Ok(()),
    }
    store::save_inventory(users, user_id, INVENTORY_FIELD, &inv)?;
    Ok(())
}

#[test]
fn browse_buy_and_sell_through_replies() {
    let config = Config::default();
    let limit = config.inventory.default_limit;
    let mut rng = StdRng::seed_from_u64(42);
    let now = Utc::now();
    let catalog = garden_catalog();
    let mut shop = ShopState::init(&catalog, &config.shop, &mut rng, now);
    assert_eq!(shop.stock.len(), 3, "zero-chance entry must never be stocked");

    let users = MemoryStore::new();
    store::set_balance(&users, "alice", 100).unwrap();

    let mut pending = InteractionRegistry::with_ttl_secs(config.interaction.ttl_secs);
    pending.register("m1", "alice", ShopDialogue::Menu, Value::Null, now);

    let step = continue_dialogue(&mut pending, "m1", "alice", "browse", "m2", now).unwrap();
    assert_eq!(step.action, Some(ShopAction::ShowStock));

    let step = continue_dialogue(&mut pending, "m2", "alice", "buy carrot_seed 3", "m3", now).unwrap();
    assert!(step.action.is_none());

    // Someone else answering the confirmation is ignored.
    assert!(continue_dialogue(&mut pending, "m3", "bob", "yes", "m4", now).is_none());

    let step = continue_dialogue(&mut pending, "m3", "alice", "yes", "m4", now).unwrap();
    let action = step.action.expect("purchase action");
    run_action(&action, &mut shop, &users, "alice", limit).unwrap();

    assert_eq!(store::get_balance(&users, "alice").unwrap(), 70);
    let mut inv = store::load_inventory(&users, "alice", INVENTORY_FIELD, limit).unwrap();
    assert_eq!(inv.get_amount("carrot_seed"), 3);
    assert_eq!(shop.listing("carrot_seed").unwrap().remaining, 2);

    // Sell one back at its sell price.
    let uuid = inv.get_one("carrot_seed").unwrap().uuid.clone();
    assert!(inv.update_by_id(&uuid, |item| item.sell_price = 4.0));
    store::save_inventory(&users, "alice", INVENTORY_FIELD, &inv).unwrap();

    let step = continue_dialogue(&mut pending, "m4", "alice", &format!("sell {}", uuid), "m5", now).unwrap();
    assert_eq!(step.next, ShopDialogue::ConfirmSell { uuid: uuid.clone() });
    let step = continue_dialogue(&mut pending, "m5", "alice", "y", "m6", now).unwrap();
    run_action(&step.action.unwrap(), &mut shop, &users, "alice", limit).unwrap();

    assert_eq!(store::get_balance(&users, "alice").unwrap(), 74);
    let inv = store::load_inventory(&users, "alice", INVENTORY_FIELD, limit).unwrap();
    assert_eq!(inv.get_amount("carrot_seed"), 2);
    assert!(!inv.has_by_id(&uuid));

    let step = continue_dialogue(&mut pending, "m6", "alice", "exit", "m7", now).unwrap();
    assert_eq!(step.next, ShopDialogue::Closed);
    assert!(pending.is_empty());
}

#[test]
fn expired_conversation_cannot_buy() {
    let now = Utc::now();
    let mut pending = InteractionRegistry::with_ttl_secs(30);
    pending.register(
        "m1",
        "alice",
        ShopDialogue::ConfirmBuy {
            key: "melon_seed".into(),
            quantity: 1,
        },
        Value::Null,
        now,
    );
    let late = now + Duration::seconds(31);
    assert!(continue_dialogue(&mut pending, "m1", "alice", "yes", "m2", late).is_none());
    assert!(pending.is_empty());
}

#[test]
fn purchase_fails_cleanly_when_inventory_is_full() {
    let mut rng = StdRng::seed_from_u64(5);
    let config = Config::default();
    let mut shop = ShopState::init(&garden_catalog(), &config.shop, &mut rng, Utc::now());
    let users = MemoryStore::new();
    store::set_balance(&users, "bob", 1_000).unwrap();
    users
        .set_item(
            "bob",
            json!({ "inventory": [ {"key": "rock", "name": "Rock"} ] })
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap();

    let err = run_action(
        &ShopAction::Buy {
            key: "potato_seed".into(),
            quantity: 1,
        },
        &mut shop,
        &users,
        "bob",
        Some(1),
    )
    .unwrap_err();
    assert!(matches!(err, ShopError::InventoryFull));
    assert_eq!(store::get_balance(&users, "bob").unwrap(), 1_000);
    let inv = store::load_inventory(&users, "bob", INVENTORY_FIELD, Some(1)).unwrap();
    assert_eq!(inv.size(), 1);
    assert!(inv.has("rock"));
}

#[test]
fn restock_lifecycle_follows_interval() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut config = Config::default();
    config.shop.restock_interval_secs = 600;
    config.shop.stock_per_slot = 1;
    let start = Utc::now();
    let catalog = garden_catalog();
    let mut shop = ShopState::init(&catalog, &config.shop, &mut rng, start);

    let users = MemoryStore::new();
    store::set_balance(&users, "carol", 500).unwrap();
    let mut inv = store::load_inventory(&users, "carol", INVENTORY_FIELD, None).unwrap();
    shop.buy("melon_seed", 1, &users, "carol", &mut inv).unwrap();
    assert!(!shop.listing("melon_seed").unwrap().in_stock());

    assert!(!shop.needs_restock(&config.shop, start + Duration::seconds(599)));
    assert!(!shop.refresh(&catalog, &config.shop, &mut rng, start + Duration::seconds(599)));
    assert!(shop.refresh(&catalog, &config.shop, &mut rng, start + Duration::seconds(600)));
    assert!(shop.listing("melon_seed").unwrap().in_stock());
}
