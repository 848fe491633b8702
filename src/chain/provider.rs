//! WalletProvider - the injected wallet capability.

use crate::chain::{Address, ChainId};
use crate::error::KioskResult;
use async_trait::async_trait;

/// The surface the kiosk needs from a wallet provider.
///
/// Mirrors the injected-wallet request API: a chain identity read, a
/// no-prompt query for already-authorized accounts, and the prompting
/// authorization request. Implementations decide what "prompt" means;
/// the kiosk only cares that [`request_accounts`](Self::request_accounts)
/// may come back with `UserRejected`.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Chain the provider is currently on (`eth_chainId`).
    async fn chain_id(&self) -> KioskResult<ChainId>;

    /// Accounts already authorized for this origin (`eth_accounts`).
    /// Never prompts; an empty list means no prior authorization.
    async fn accounts(&self) -> KioskResult<Vec<Address>>;

    /// Ask the user to authorize account access (`eth_requestAccounts`).
    async fn request_accounts(&self) -> KioskResult<Vec<Address>>;
}
