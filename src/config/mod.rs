//! # Configuration
//!
//! TOML configuration for hosts embedding idlebox and for the `idlebox` binary.
//!
//! ```toml
//! [inventory]
//! default_limit = 100
//!
//! [shop]
//! slots = 6
//! stock_per_slot = 5
//! restock_interval_secs = 3600
//!
//! [interaction]
//! ttl_secs = 120
//!
//! [logging]
//! level = "info"
//! file = "idlebox.log"
//! ```
//!
//! Every section is optional; missing sections take their defaults.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::shop::ShopConfig;

/// Longest reply window: one day.
pub const MAX_INTERACTION_TTL_SECS: i64 = 86_400;
/// Longest restock interval: one year.
pub const MAX_RESTOCK_INTERVAL_SECS: i64 = 365 * 86_400;
pub const MAX_SHOP_SLOTS: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Capacity applied to inventories loaded by the host; `None` means unbounded.
    #[serde(default)]
    pub default_limit: Option<usize>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            default_limit: Some(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Seconds a pending reply stays claimable.
    pub ttl_secs: i64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self { ttl_secs: 120 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parsed `level`; unknown values fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub shop: ShopConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.inventory.default_limit == Some(0) {
            return Err(anyhow!("inventory.default_limit must be greater than 0"));
        }
        if self.shop.slots == 0 {
            return Err(anyhow!("shop.slots must be greater than 0"));
        }
        if self.shop.slots > MAX_SHOP_SLOTS {
            return Err(anyhow!("shop.slots cannot exceed {}", MAX_SHOP_SLOTS));
        }
        if self.shop.restock_interval_secs < 0 {
            return Err(anyhow!("shop.restock_interval_secs cannot be negative"));
        }
        if self.shop.restock_interval_secs > MAX_RESTOCK_INTERVAL_SECS {
            return Err(anyhow!(
                "shop.restock_interval_secs cannot exceed {}",
                MAX_RESTOCK_INTERVAL_SECS
            ));
        }
        if self.interaction.ttl_secs <= 0 {
            return Err(anyhow!("interaction.ttl_secs must be greater than 0"));
        }
        if self.interaction.ttl_secs > MAX_INTERACTION_TTL_SECS {
            return Err(anyhow!(
                "interaction.ttl_secs cannot exceed {}",
                MAX_INTERACTION_TTL_SECS
            ));
        }
        Ok(())
    }
}
