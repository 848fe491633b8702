//! SimChain - in-process wallet provider + mint contract.
//!
//! Local stand-in for an injected wallet and the deployed contract, the same
//! role a regtest backend plays for a real node: the CLI drives it during
//! development and the test suite scripts it into every failure mode the
//! kiosk has to survive (absent authorization, declined prompts, wrong chain,
//! cap exhaustion).
//!
//! Behavior mirrors the real thing where it matters:
//! - prompts either grant the configured wallet accounts or fail rejected
//! - submission hands back a deterministic tx hash; the cap check settles at
//!   confirmation, where an exhausted supply reverts with the contract's
//!   literal reason string
//! - each confirmed mint bumps the counter and fires the minted event once

use crate::chain::{
    Address, ChainId, MintContract, MintedEvent, TokenId, TxHash, WalletProvider,
};
use crate::error::{KioskError, KioskResult};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;

/// Revert reason the contract emits once the supply cap is reached.
pub const CAP_REVERT_REASON: &str = "Max NFTs minted";

#[derive(Debug, Clone)]
pub struct SimChainConfig {
    pub chain_id: ChainId,
    pub contract: Address,
    pub supply_cap: u64,
    pub initial_minted: u64,
    /// Accounts the simulated wallet holds.
    pub wallet_accounts: Vec<Address>,
    /// Whether those accounts count as already authorized (no prompt needed).
    pub preauthorized: bool,
    /// Whether the user approves authorization prompts.
    pub approve_prompts: bool,
    pub confirm_delay: Duration,
}

impl Default for SimChainConfig {
    fn default() -> Self {
        Self {
            chain_id: ChainId::RINKEBY,
            contract: Address::repeat_byte(0x51),
            supply_cap: 50,
            initial_minted: 0,
            wallet_accounts: vec![dev_account(1)],
            preauthorized: false,
            approve_prompts: true,
            confirm_delay: Duration::from_millis(400),
        }
    }
}

impl SimChainConfig {
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = chain_id;
        self
    }
    pub fn with_contract(mut self, contract: Address) -> Self {
        self.contract = contract;
        self
    }
    pub fn with_supply_cap(mut self, cap: u64) -> Self {
        self.supply_cap = cap;
        self
    }
    pub fn with_initial_minted(mut self, minted: u64) -> Self {
        self.initial_minted = minted;
        self
    }
    pub fn with_wallet_accounts(mut self, accounts: Vec<Address>) -> Self {
        self.wallet_accounts = accounts;
        self
    }
    pub fn preauthorized(mut self) -> Self {
        self.preauthorized = true;
        self
    }
    pub fn rejecting_prompts(mut self) -> Self {
        self.approve_prompts = false;
        self
    }
    pub fn with_confirm_delay(mut self, delay: Duration) -> Self {
        self.confirm_delay = delay;
        self
    }
}

/// Deterministic throwaway account for demos and tests.
pub fn dev_account(index: u8) -> Address {
    Address::repeat_byte(index)
}

enum TxOutcome {
    Mint(TokenId),
    Revert(String),
}

struct PendingTx {
    minter: Address,
    outcome: TxOutcome,
}

struct SimState {
    minted: u64,
    /// Tokens handed out to submitted-but-unconfirmed transactions too,
    /// so the cap settles per submission order.
    reserved: u64,
    authorized: Vec<Address>,
    wallet_accounts: Vec<Address>,
    approve_prompts: bool,
    pending: HashMap<TxHash, PendingTx>,
    nonce: u64,
    // call counters, exposed for assertions
    accounts_queries: usize,
    prompts: usize,
    submissions: usize,
}

pub struct SimChain {
    chain_id: ChainId,
    contract: Address,
    supply_cap: u64,
    confirm_delay: Duration,
    state: Mutex<SimState>,
    events: broadcast::Sender<MintedEvent>,
}

impl SimChain {
    pub fn new(config: SimChainConfig) -> Self {
        let (events, _) = broadcast::channel(64);
        let authorized = if config.preauthorized {
            config.wallet_accounts.clone()
        } else {
            Vec::new()
        };
        Self {
            chain_id: config.chain_id,
            contract: config.contract,
            supply_cap: config.supply_cap,
            confirm_delay: config.confirm_delay,
            state: Mutex::new(SimState {
                minted: config.initial_minted,
                reserved: config.initial_minted,
                authorized,
                wallet_accounts: config.wallet_accounts,
                approve_prompts: config.approve_prompts,
                pending: HashMap::new(),
                nonce: 0,
                accounts_queries: 0,
                prompts: 0,
                submissions: 0,
            }),
            events,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn tx_hash(&self, from: Address, nonce: u64) -> TxHash {
        let mut hasher = Sha256::new();
        hasher.update(self.contract.as_slice());
        hasher.update(from.as_slice());
        hasher.update(nonce.to_be_bytes());
        TxHash::from_slice(hasher.finalize().as_slice())
    }

    // knobs and counters for the test suite

    pub fn set_wallet_accounts(&self, accounts: Vec<Address>) {
        self.lock().wallet_accounts = accounts;
    }

    pub fn set_approve_prompts(&self, approve: bool) {
        self.lock().approve_prompts = approve;
    }

    pub fn accounts_queries(&self) -> usize {
        self.lock().accounts_queries
    }

    pub fn prompt_count(&self) -> usize {
        self.lock().prompts
    }

    pub fn submission_count(&self) -> usize {
        self.lock().submissions
    }
}

#[async_trait]
impl WalletProvider for SimChain {
    async fn chain_id(&self) -> KioskResult<ChainId> {
        Ok(self.chain_id)
    }

    async fn accounts(&self) -> KioskResult<Vec<Address>> {
        let mut state = self.lock();
        state.accounts_queries += 1;
        Ok(state.authorized.clone())
    }

    async fn request_accounts(&self) -> KioskResult<Vec<Address>> {
        let mut state = self.lock();
        state.prompts += 1;
        if !state.approve_prompts {
            return Err(KioskError::UserRejected);
        }
        state.authorized = state.wallet_accounts.clone();
        Ok(state.authorized.clone())
    }
}

#[async_trait]
impl MintContract for SimChain {
    fn address(&self) -> Address {
        self.contract
    }

    async fn submit_mint(&self, from: Address) -> KioskResult<TxHash> {
        let mut state = self.lock();
        state.submissions += 1;
        state.nonce += 1;
        let hash = self.tx_hash(from, state.nonce);
        let outcome = if state.reserved >= self.supply_cap {
            TxOutcome::Revert(CAP_REVERT_REASON.to_string())
        } else {
            let token_id = state.reserved;
            state.reserved += 1;
            TxOutcome::Mint(token_id)
        };
        state.pending.insert(hash, PendingTx { minter: from, outcome });
        Ok(hash)
    }

    async fn wait_confirmed(&self, tx_hash: TxHash) -> KioskResult<()> {
        let settled = self.lock().pending.remove(&tx_hash);
        let Some(tx) = settled else {
            // Unknown or already-settled hash; nothing left to wait for.
            return Ok(());
        };

        tokio::time::sleep(self.confirm_delay).await;

        match tx.outcome {
            TxOutcome::Revert(reason) => Err(KioskError::ContractRevert(reason)),
            TxOutcome::Mint(token_id) => {
                self.lock().minted += 1;
                let _ = self.events.send(MintedEvent { minter: tx.minter, token_id });
                Ok(())
            }
        }
    }

    async fn total_minted(&self) -> KioskResult<u64> {
        Ok(self.lock().minted)
    }

    fn subscribe_minted(&self) -> broadcast::Receiver<MintedEvent> {
        self.events.subscribe()
    }
}
