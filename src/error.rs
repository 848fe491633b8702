//! Error taxonomy for the kiosk.
//!
//! Every failure a user action can hit maps onto one of these variants; the
//! session layer decides which are surfaced as notices and which stay in the
//! logs. Nothing retries automatically - recovery is always a new action.

use crate::chain::ChainId;
use thiserror::Error;

pub type KioskResult<T> = Result<T, KioskError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KioskError {
    /// No wallet provider was injected into this kiosk.
    #[error("no wallet provider detected")]
    ProviderAbsent,

    /// Provider is on a different chain than the kiosk expects.
    #[error("connected to chain {actual}, expected {expected}")]
    WrongNetwork { actual: ChainId, expected: ChainId },

    /// The user declined an account or transaction prompt.
    #[error("request rejected by user")]
    UserRejected,

    /// The mint call reverted on-chain; carries the literal revert reason.
    #[error("{0}")]
    ContractRevert(String),

    /// Transport or backend failure talking to the provider.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Mint was invoked without an adopted session account.
    #[error("no session account connected")]
    NotConnected,
}

impl KioskError {
    pub fn rpc(message: impl Into<String>) -> Self {
        KioskError::Rpc(message.into())
    }
}
