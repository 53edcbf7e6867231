//! Shared fixtures for integration tests.

use idlebox::collectibles::ItemRecord;
use idlebox::shop::CatalogEntry;

/// A generic record with a fixed uuid so tests can address it.
#[allow(dead_code)]
pub fn item(key: &str, name: &str, uuid: &str) -> ItemRecord {
    ItemRecord::new(key, name).with_uuid(uuid)
}

/// Small garden-shop catalog: two common seeds, one rare, one never stocked.
#[allow(dead_code)]
pub fn garden_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(ItemRecord::new("carrot_seed", "Carrot Seed"), 10, 4.0),
        CatalogEntry::new(ItemRecord::new("potato_seed", "Potato Seed"), 15, 4.0),
        CatalogEntry::new(ItemRecord::new("melon_seed", "Melon Seed"), 60, 1.0),
        CatalogEntry::new(ItemRecord::new("starfruit_seed", "Starfruit Seed"), 900, 0.0),
    ]
}
