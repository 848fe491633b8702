//! Chain-facing types and capability traits.
//!
//! The kiosk never talks to a wallet or a contract directly; it goes through
//! the [`WalletProvider`] and [`MintContract`] traits so the host environment
//! can inject whatever backend it has - a browser bridge, a node RPC client,
//! or the in-process [`SimChain`] used for development and tests.

mod contract;
mod provider;
pub mod sim;

pub use contract::{MintContract, MintRequest};
pub use provider::WalletProvider;
pub use sim::SimChain;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use alloy_primitives::Address;

/// 32-byte transaction hash.
pub type TxHash = alloy_primitives::B256;

/// Token identifier as carried by the contract's mint event.
pub type TokenId = u64;

/// Chain identifier with `eth_chainId` hex-string semantics.
///
/// Providers report the chain as a hex string (`"0x1"`, `"0x4"`); internally
/// we keep the numeric value and render the hex form on display so mismatch
/// notices read the way wallet UIs print them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const MAINNET: ChainId = ChainId(1);
    pub const RINKEBY: ChainId = ChainId(4);

    /// Parse `"0x4"` (or plain decimal) into a chain id.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16).ok().map(ChainId)
        } else {
            value.parse::<u64>().ok().map(ChainId)
        }
    }

    /// Human name for the well-known chains, used in mismatch notices.
    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            1 => Some("Ethereum mainnet"),
            3 => Some("Ropsten"),
            4 => Some("Rinkeby"),
            5 => Some("Goerli"),
            11155111 => Some("Sepolia"),
            _ => None,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChainId::parse(s).ok_or_else(|| format!("invalid chain id: {}", s))
    }
}

impl Serialize for ChainId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ChainId::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid chain id: {}", raw)))
    }
}

/// One firing of the contract's `NewItemMinted(address, uint256)` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintedEvent {
    pub minter: Address,
    pub token_id: TokenId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_parses_hex_and_decimal() {
        assert_eq!(ChainId::parse("0x4"), Some(ChainId(4)));
        assert_eq!(ChainId::parse("0X1"), Some(ChainId(1)));
        assert_eq!(ChainId::parse("4"), Some(ChainId(4)));
        assert_eq!(ChainId::parse("bogus"), None);
    }

    #[test]
    fn chain_id_displays_as_hex() {
        assert_eq!(ChainId(4).to_string(), "0x4");
        assert_eq!(ChainId(11155111).to_string(), "0xaa36a7");
    }

    #[test]
    fn chain_id_serde_round_trip() {
        let encoded = serde_json::to_string(&ChainId(4)).unwrap();
        assert_eq!(encoded, "\"0x4\"");
        let decoded: ChainId = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, ChainId(4));
    }
}
