//! Sim Chain Tests - the simulated backend behaves like the real collaborators
//!
//! These tests verify:
//! 1. Authorization semantics (preauthorized list, prompt approval/rejection)
//! 2. Cap enforcement reverts with the contract's literal reason
//! 3. Tx hashes are deterministic per (contract, account, nonce)
//! 4. Exactly one minted event per confirmation, with sequential token ids

use mintkiosk::chain::sim::{dev_account, CAP_REVERT_REASON};
use mintkiosk::{ChainId, KioskError, MintContract, SimChain, SimChainConfig, WalletProvider};
use std::time::Duration;

fn fast() -> SimChainConfig {
    SimChainConfig::default().with_confirm_delay(Duration::ZERO)
}

/// Test: the provider reports the configured chain id
#[tokio::test]
async fn reports_configured_chain_id() {
    let sim = SimChain::new(fast().with_chain_id(ChainId::MAINNET));
    assert_eq!(sim.chain_id().await.unwrap(), ChainId::MAINNET);
}

/// Test: accounts are empty until a prompt grants them
#[tokio::test]
async fn accounts_empty_until_authorized() {
    let sim = SimChain::new(fast().with_wallet_accounts(vec![dev_account(1)]));

    assert!(sim.accounts().await.unwrap().is_empty());
    let granted = sim.request_accounts().await.unwrap();
    assert_eq!(granted, vec![dev_account(1)]);
    assert_eq!(sim.accounts().await.unwrap(), vec![dev_account(1)]);
}

/// Test: preauthorized wallets answer the no-prompt query directly
#[tokio::test]
async fn preauthorized_accounts_listed_without_prompt() {
    let sim = SimChain::new(fast().preauthorized().with_wallet_accounts(vec![dev_account(9)]));

    assert_eq!(sim.accounts().await.unwrap(), vec![dev_account(9)]);
    assert_eq!(sim.prompt_count(), 0);
}

/// Test: a declined prompt fails rejected and grants nothing
#[tokio::test]
async fn declined_prompt_grants_nothing() {
    let sim = SimChain::new(fast().rejecting_prompts());

    let err = sim.request_accounts().await.unwrap_err();
    assert_eq!(err, KioskError::UserRejected);
    assert!(sim.accounts().await.unwrap().is_empty());
}

/// Test: tx hashes are deterministic per (contract, account, nonce) and
/// distinct across submissions
#[tokio::test]
async fn tx_hashes_deterministic_and_distinct() {
    let sim_a = SimChain::new(fast());
    let sim_b = SimChain::new(fast());

    let a1 = sim_a.submit_mint(dev_account(1)).await.unwrap();
    let a2 = sim_a.submit_mint(dev_account(1)).await.unwrap();
    let b1 = sim_b.submit_mint(dev_account(1)).await.unwrap();

    assert_eq!(a1, b1, "same inputs, same hash");
    assert_ne!(a1, a2, "nonce advances per submission");
}

/// Test: confirming past the cap reverts with the literal reason and leaves
/// the counter untouched
#[tokio::test]
async fn cap_exhaustion_reverts_with_reason() {
    let sim = SimChain::new(fast().with_supply_cap(2).with_initial_minted(2));

    let tx = sim.submit_mint(dev_account(1)).await.unwrap();
    let err = sim.wait_confirmed(tx).await.unwrap_err();

    assert_eq!(err, KioskError::ContractRevert(CAP_REVERT_REASON.into()));
    assert_eq!(sim.total_minted().await.unwrap(), 2);
}

/// Test: each confirmation emits exactly one event, token ids sequential
#[tokio::test]
async fn one_event_per_confirmation() {
    let sim = SimChain::new(fast().with_initial_minted(5));
    let mut rx = sim.subscribe_minted();

    for _ in 0..2 {
        let tx = sim.submit_mint(dev_account(2)).await.unwrap();
        sim.wait_confirmed(tx).await.unwrap();
    }

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first.token_id, 5);
    assert_eq!(second.token_id, 6);
    assert_eq!(first.minter, dev_account(2));
    assert!(rx.try_recv().is_err(), "no extra events queued");
    assert_eq!(sim.total_minted().await.unwrap(), 7);
}

/// Test: waiting on a settled or unknown hash resolves immediately
#[tokio::test]
async fn wait_on_settled_hash_is_ok() {
    let sim = SimChain::new(fast());

    let tx = sim.submit_mint(dev_account(1)).await.unwrap();
    sim.wait_confirmed(tx).await.unwrap();
    sim.wait_confirmed(tx).await.unwrap();
    assert_eq!(sim.total_minted().await.unwrap(), 1, "second wait applies nothing");
}
