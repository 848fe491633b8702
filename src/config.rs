//! Kiosk configuration - passed in by the host, overridable from the environment.

use crate::chain::{Address, ChainId};
use alloy_primitives::address;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// A marketplace where minted tokens show up, with the base URL its asset
/// pages hang off. The deep link for a token is `{asset_base}/{contract}/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marketplace {
    pub label: String,
    pub asset_base: String,
}

impl Marketplace {
    pub fn new(label: impl Into<String>, asset_base: impl Into<String>) -> Self {
        Self { label: label.into(), asset_base: asset_base.into() }
    }

    pub fn asset_url(&self, contract: Address, token_id: u64) -> String {
        format!("{}/{}/{}", self.asset_base.trim_end_matches('/'), contract, token_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KioskConfig {
    /// Chain the contract is deployed on; anything else halts with a notice.
    pub expected_chain: ChainId,
    pub contract_address: Address,
    pub supply_cap: u64,
    /// Collection chrome shown by the kiosk views.
    pub collection_name: String,
    pub tagline: String,
    pub marketplaces: Vec<Marketplace>,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            expected_chain: ChainId::RINKEBY,
            contract_address: address!("0d7587365eb6c293f088418b16d3839901bd751f"),
            supply_cap: 50,
            collection_name: "Square NFT Collection".into(),
            tagline: "Each unique. Each beautiful. Discover your NFT today.".into(),
            marketplaces: vec![
                Marketplace::new("OpenSea", "https://testnets.opensea.io/assets"),
                Marketplace::new("Rarible", "https://rinkeby.rarible.com/token"),
            ],
        }
    }
}

impl KioskConfig {
    pub fn with_expected_chain(mut self, chain: ChainId) -> Self {
        self.expected_chain = chain;
        self
    }
    pub fn with_contract_address(mut self, contract: Address) -> Self {
        self.contract_address = contract;
        self
    }
    pub fn with_supply_cap(mut self, cap: u64) -> Self {
        self.supply_cap = cap;
        self
    }
    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }
    pub fn with_marketplaces(mut self, marketplaces: Vec<Marketplace>) -> Self {
        self.marketplaces = marketplaces;
        self
    }

    /// Overlay `MINTKIOSK_*` environment variables on this config.
    ///
    /// Recognized: `MINTKIOSK_CHAIN` (hex or decimal chain id),
    /// `MINTKIOSK_CONTRACT`, `MINTKIOSK_CAP`, `MINTKIOSK_COLLECTION`.
    /// Unparsable values are ignored with a log line rather than failing
    /// startup.
    pub fn apply_env(mut self) -> Self {
        if let Ok(raw) = env::var("MINTKIOSK_CHAIN") {
            match ChainId::parse(&raw) {
                Some(chain) => self.expected_chain = chain,
                None => tracing::warn!(value = %raw, "ignoring invalid MINTKIOSK_CHAIN"),
            }
        }
        if let Ok(raw) = env::var("MINTKIOSK_CONTRACT") {
            match raw.parse::<Address>() {
                Ok(addr) => self.contract_address = addr,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid MINTKIOSK_CONTRACT"),
            }
        }
        if let Ok(raw) = env::var("MINTKIOSK_CAP") {
            match raw.trim().parse::<u64>() {
                Ok(cap) => self.supply_cap = cap,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid MINTKIOSK_CAP"),
            }
        }
        if let Ok(name) = env::var("MINTKIOSK_COLLECTION") {
            if !name.trim().is_empty() {
                self.collection_name = name;
            }
        }
        self
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        std::fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
