//! MintContract - the injected contract capability.

use crate::chain::{Address, MintedEvent, TxHash};
use crate::error::KioskResult;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// A mint transaction between submission and confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub tx_hash: TxHash,
    pub confirmed: bool,
}

impl MintRequest {
    pub fn pending(tx_hash: TxHash) -> Self {
        Self { tx_hash, confirmed: false }
    }
}

/// The fixed external mint-contract ABI, seen from the kiosk side.
///
/// The contract's `mint()` entry point takes no arguments; `from` here models
/// the signer binding (the account whose wallet pays gas and receives the
/// token). Submission and confirmation are split the way transaction handles
/// behave: submit returns a hash, waiting resolves once the transaction is
/// included - or fails with the revert reason.
#[async_trait]
pub trait MintContract: Send + Sync {
    /// Address the contract is deployed at, used to build marketplace links.
    fn address(&self) -> Address;

    /// Invoke the state-changing mint entry point. Returns the tx hash.
    async fn submit_mint(&self, from: Address) -> KioskResult<TxHash>;

    /// Block until the transaction is confirmed on-chain. No timeout.
    async fn wait_confirmed(&self, tx_hash: TxHash) -> KioskResult<()>;

    /// Read-only call: how many tokens have been minted so far.
    async fn total_minted(&self) -> KioskResult<u64>;

    /// Subscribe to the contract's mint-completion event stream.
    /// Each confirmed mint is delivered exactly once per subscriber.
    fn subscribe_minted(&self) -> broadcast::Receiver<MintedEvent>;
}
