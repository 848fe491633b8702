//! MintSession - the wallet-session orchestrator.
//!
//! Owns the session state machine and drives the whole UI flow: detect the
//! injected provider, verify the chain, restore or request an account, submit
//! the mint, await confirmation, refresh the counter. Views render from
//! [`ViewModel`] snapshots; user-facing messages go through the injected
//! [`Notifier`].
//!
//! # State machine
//!
//! ```text
//! Disconnected ──connect ok──▶ Connected(Idle) ──mint──▶ Connected(Submitting)
//!       ▲                            ▲                           │
//!       └──connect failed────┐       │                      tx accepted
//!                            │  confirmation                     │
//!                     (restored)  or revert ◀── Connected(Minting)
//! ```
//!
//! Provider/network check failures surface a notice and leave the state
//! untouched. There is no disconnect transition; a session lasts until the
//! process exits.

mod watcher;

use crate::chain::{Address, MintContract, MintRequest, SimChain, TxHash, WalletProvider};
use crate::config::KioskConfig;
use crate::error::{KioskError, KioskResult};
use crate::notify::{Notice, Notifier};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// The injected chain capabilities: a wallet provider and the contract handle
/// bound to it. Absent entirely when no wallet is installed.
#[derive(Clone)]
pub struct ChainServices {
    pub provider: Arc<dyn WalletProvider>,
    pub contract: Arc<dyn MintContract>,
}

impl ChainServices {
    pub fn new(provider: Arc<dyn WalletProvider>, contract: Arc<dyn MintContract>) -> Self {
        Self { provider, contract }
    }

    /// Both capabilities served by one simulated chain.
    pub fn from_sim(sim: Arc<SimChain>) -> Self {
        Self { provider: sim.clone(), contract: sim }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Mint invoked, transaction not yet accepted by the provider.
    Submitting,
    /// Transaction accepted, awaiting on-chain confirmation.
    Minting(MintRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected { account: Address, phase: Phase },
}

impl SessionState {
    pub fn account(&self) -> Option<Address> {
        match self {
            SessionState::Connected { account, .. } => Some(*account),
            _ => None,
        }
    }
}

/// Immutable per-render snapshot of everything the views display.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub account: Option<Address>,
    pub connecting: bool,
    /// True while a submitted mint awaits confirmation (the spinner state).
    pub loading: bool,
    pub pending_tx: Option<TxHash>,
    pub minted: u64,
    pub cap: u64,
}

pub struct MintSession {
    chain: Option<ChainServices>,
    config: KioskConfig,
    notifier: Arc<dyn Notifier>,
    state: Mutex<SessionState>,
    minted: Mutex<u64>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl MintSession {
    pub fn new(
        chain: Option<ChainServices>,
        config: KioskConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            chain,
            config,
            notifier,
            state: Mutex::new(SessionState::Disconnected),
            minted: Mutex::new(0),
            watcher: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.lock_state().clone()
    }

    /// Snapshot the current view.
    pub fn view(&self) -> ViewModel {
        let state = self.lock_state();
        let (connecting, loading, pending_tx) = match &*state {
            SessionState::Connecting => (true, false, None),
            SessionState::Connected { phase: Phase::Minting(req), .. } => {
                (false, true, Some(req.tx_hash))
            }
            _ => (false, false, None),
        };
        ViewModel {
            account: state.account(),
            connecting,
            loading,
            pending_tx,
            minted: *self.lock_minted(),
            cap: self.config.supply_cap,
        }
    }

    /// Re-adopt an already-authorized account without prompting.
    ///
    /// Startup path: verifies the network first, then queries the provider's
    /// authorized accounts and adopts the first one, arming the mint watcher.
    /// Silent no-op when nothing was previously authorized.
    pub async fn restore_session(&self) -> KioskResult<ViewModel> {
        let chain = self.detect()?;
        self.check_network(chain).await?;

        let accounts = chain.provider.accounts().await.map_err(|err| {
            tracing::warn!(error = %err, "authorized-accounts query failed");
            err
        })?;

        match accounts.first().copied() {
            Some(account) => {
                tracing::info!(%account, "found authorized account");
                *self.lock_state() = SessionState::Connected { account, phase: Phase::Idle };
                self.arm_watcher(chain);
            }
            None => tracing::info!("no authorized account found"),
        }
        Ok(self.view())
    }

    /// Check the provider is on the expected chain. Surfaces a notice and
    /// halts on mismatch; switching networks is up to the user's wallet.
    pub async fn verify_network(&self) -> KioskResult<()> {
        let chain = self.detect()?;
        self.check_network(chain).await
    }

    /// Prompt the user for account access and adopt the first address
    /// returned. Repeat calls re-prompt; the most recent response wins.
    pub async fn connect(&self) -> KioskResult<ViewModel> {
        let chain = self.detect()?;

        let previous = {
            let mut state = self.lock_state();
            let previous = state.clone();
            *state = SessionState::Connecting;
            previous
        };

        match chain.provider.request_accounts().await {
            Ok(accounts) => match accounts.first().copied() {
                Some(account) => {
                    tracing::info!(%account, "wallet connected");
                    *self.lock_state() = SessionState::Connected { account, phase: Phase::Idle };
                    self.arm_watcher(chain);
                    Ok(self.view())
                }
                None => {
                    *self.lock_state() = previous;
                    let err = KioskError::rpc("authorization returned no accounts");
                    self.surface(&err);
                    Err(err)
                }
            },
            Err(err) => {
                *self.lock_state() = previous;
                self.surface(&err);
                Err(err)
            }
        }
    }

    /// Submit a mint and block until it confirms, then refresh the counter.
    ///
    /// At most one mint is in flight: invoking this while one is pending is a
    /// no-op returning the current view. Revert reasons are surfaced
    /// verbatim; the loading flag always clears.
    pub async fn mint(&self) -> KioskResult<ViewModel> {
        let chain = self.detect()?;

        let account = {
            let mut state = self.lock_state();
            match state.clone() {
                SessionState::Connected { account, phase: Phase::Idle } => {
                    *state = SessionState::Connected { account, phase: Phase::Submitting };
                    account
                }
                SessionState::Connected { .. } => {
                    tracing::debug!("mint already in flight, ignoring");
                    drop(state);
                    return Ok(self.view());
                }
                _ => {
                    drop(state);
                    let err = KioskError::NotConnected;
                    self.surface(&err);
                    return Err(err);
                }
            }
        };

        let tx_hash = match chain.contract.submit_mint(account).await {
            Ok(hash) => hash,
            Err(err) => {
                self.set_phase(Phase::Idle);
                self.surface(&err);
                return Err(err);
            }
        };

        self.set_phase(Phase::Minting(MintRequest::pending(tx_hash)));
        tracing::info!(tx = %tx_hash, "mint submitted, awaiting confirmation");

        let confirmed = chain.contract.wait_confirmed(tx_hash).await;
        self.set_phase(Phase::Idle);

        match confirmed {
            Ok(()) => {
                tracing::info!(tx = %tx_hash, "mint confirmed");
                if let Err(err) = self.refresh_count().await {
                    tracing::warn!(error = %err, "counter refresh after mint failed");
                }
                // Re-arm point kept from the page flow; a no-op once armed.
                self.arm_watcher(chain);
                Ok(self.view())
            }
            Err(err) => {
                self.surface(&err);
                Err(err)
            }
        }
    }

    /// Read the total-minted counter from the contract.
    pub async fn refresh_count(&self) -> KioskResult<u64> {
        let chain = self.chain.as_ref().ok_or(KioskError::ProviderAbsent)?;
        let total = chain.contract.total_minted().await?;
        *self.lock_minted() = total;
        Ok(total)
    }

    /// Stop the mint watcher. The session itself has no disconnect path.
    pub fn close(&self) {
        if let Some(handle) = self.lock_watcher().take() {
            handle.abort();
            tracing::debug!("mint watcher stopped");
        }
    }

    fn detect(&self) -> KioskResult<&ChainServices> {
        match self.chain.as_ref() {
            Some(chain) => Ok(chain),
            None => {
                let err = KioskError::ProviderAbsent;
                self.surface(&err);
                Err(err)
            }
        }
    }

    async fn check_network(&self, chain: &ChainServices) -> KioskResult<()> {
        let actual = chain.provider.chain_id().await.map_err(|err| {
            tracing::warn!(error = %err, "chain id query failed");
            err
        })?;
        if actual != self.config.expected_chain {
            let err = KioskError::WrongNetwork { actual, expected: self.config.expected_chain };
            self.surface(&err);
            return Err(err);
        }
        tracing::debug!(chain = %actual, "provider is on the expected chain");
        Ok(())
    }

    /// Register the mint-completion watcher for this session. Idempotent:
    /// once armed, later calls are no-ops, so repeated connects and mints
    /// never stack up duplicate listeners.
    fn arm_watcher(&self, chain: &ChainServices) {
        let mut guard = self.lock_watcher();
        if guard.is_some() {
            tracing::debug!("mint watcher already armed");
            return;
        }
        *guard = Some(watcher::spawn(
            chain.contract.clone(),
            self.config.marketplaces.clone(),
            self.notifier.clone(),
        ));
        tracing::info!("mint watcher armed");
    }

    /// Every failed user action surfaces exactly one notice, plus a log line.
    fn surface(&self, err: &KioskError) {
        tracing::error!(error = %err, "kiosk action failed");
        self.notifier.notify(Notice::error(self.user_message(err)));
    }

    fn user_message(&self, err: &KioskError) -> String {
        match err {
            KioskError::ProviderAbsent => {
                "Make sure you have a wallet extension installed!".into()
            }
            KioskError::WrongNetwork { expected, .. } => {
                let network = expected
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("chain {}", expected));
                format!("You are not connected to the {} network!", network)
            }
            KioskError::UserRejected => "Wallet request was declined.".into(),
            // Revert reasons come through verbatim, as the contract wrote them.
            KioskError::ContractRevert(reason) => reason.clone(),
            KioskError::Rpc(message) => format!("Network request failed: {}", message),
            KioskError::NotConnected => "Connect a wallet first.".into(),
        }
    }

    fn set_phase(&self, phase: Phase) {
        let mut state = self.lock_state();
        if let Some(account) = state.account() {
            *state = SessionState::Connected { account, phase };
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_minted(&self) -> MutexGuard<'_, u64> {
        self.minted.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_watcher(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.watcher.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Drop for MintSession {
    fn drop(&mut self) {
        self.close();
    }
}
