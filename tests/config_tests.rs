//! Config Tests - defaults, environment overlay, file round-trip

use mintkiosk::{ChainId, KioskConfig, Marketplace};
use once_cell::sync::Lazy;
use std::sync::Mutex;
use tempfile::TempDir;

// Env mutations are process-wide; serialize the tests that touch them.
static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner())
}

fn clear_env() {
    for key in ["MINTKIOSK_CHAIN", "MINTKIOSK_CONTRACT", "MINTKIOSK_CAP", "MINTKIOSK_COLLECTION"] {
        std::env::remove_var(key);
    }
}

/// Test: defaults match the deployed collection
#[test]
fn defaults_match_collection() {
    let config = KioskConfig::default();
    assert_eq!(config.expected_chain, ChainId::RINKEBY);
    assert_eq!(config.supply_cap, 50);
    assert_eq!(config.marketplaces.len(), 2);
}

/// Test: environment variables overlay the defaults, invalid values are ignored
#[test]
fn env_overlays_defaults() {
    let _guard = lock_env();
    clear_env();
    std::env::set_var("MINTKIOSK_CHAIN", "0x1");
    std::env::set_var("MINTKIOSK_CAP", "10");
    std::env::set_var("MINTKIOSK_CONTRACT", "not-an-address");

    let config = KioskConfig::default().apply_env();
    clear_env();

    assert_eq!(config.expected_chain, ChainId::MAINNET);
    assert_eq!(config.supply_cap, 10);
    // invalid contract ignored, default kept
    assert_eq!(config.contract_address, KioskConfig::default().contract_address);
}

/// Test: config survives a save/load round-trip
#[test]
fn file_round_trip() {
    let _guard = lock_env();
    clear_env();
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("kiosk.json");

    let config = KioskConfig::default()
        .with_expected_chain(ChainId(5))
        .with_supply_cap(7)
        .with_collection_name("Test Collection");
    config.save(&path).expect("save");

    let loaded = KioskConfig::load(&path).expect("load");
    assert_eq!(loaded, config);
}

/// Test: marketplace asset links embed contract and token id
#[test]
fn asset_links_embed_contract_and_token() {
    let market = Marketplace::new("OpenSea", "https://testnets.opensea.io/assets/");
    let contract = KioskConfig::default().contract_address;

    let url = market.asset_url(contract, 7);
    assert!(url.ends_with("/7"));
    assert!(url.contains(&contract.to_string()));
    assert!(!url.contains("//0x"), "trailing slash trimmed before joining");
}
