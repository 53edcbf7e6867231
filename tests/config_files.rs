//! Config file round-trips through disk.

use idlebox::config::Config;
use tempfile::tempdir;

#[tokio::test]
async fn default_config_round_trips() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    let path = path.to_str().unwrap();

    Config::create_default(path).await.unwrap();
    let loaded = Config::load(path).await.unwrap();
    assert_eq!(loaded, Config::default());
}

#[tokio::test]
async fn partial_file_uses_defaults() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[interaction]\nttl_secs = 45\n\n[shop]\nslots = 3\n").unwrap();

    let loaded = Config::load(path.to_str().unwrap()).await.unwrap();
    assert_eq!(loaded.interaction.ttl_secs, 45);
    assert_eq!(loaded.shop.slots, 3);
    assert_eq!(loaded.shop.stock_per_slot, 5);
    assert_eq!(loaded.inventory.default_limit, Some(100));
}

#[tokio::test]
async fn invalid_values_are_rejected() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[interaction]\nttl_secs = 0\n").unwrap();
    let err = Config::load(path.to_str().unwrap()).await.unwrap_err();
    assert!(err.to_string().contains("ttl_secs"));
}

#[tokio::test]
async fn missing_file_reports_path() {
    let err = Config::load("/definitely/not/here.toml").await.unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.toml"));
}
