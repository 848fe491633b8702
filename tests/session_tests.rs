//! Session Tests - the full orchestrator flow against the simulated chain
//!
//! These tests verify:
//! 1. Provider absence and network mismatch halt with exactly one notice
//! 2. Session adoption rules (restore vs. connect, first-address wins)
//! 3. Mint flow: counter refresh, loading flag, revert surfacing
//! 4. The mint watcher is armed once per session and fires once per event
//! 5. The single-in-flight-mint invariant holds under concurrent calls

use mintkiosk::chain::sim::{dev_account, CAP_REVERT_REASON};
use mintkiosk::{
    ChainId, ChainServices, KioskConfig, KioskError, MemoryNotifier, MintContract, MintSession,
    NoticeKind, SessionState, SimChain, SimChainConfig,
};
use std::sync::Arc;
use std::time::Duration;

struct Kiosk {
    sim: Arc<SimChain>,
    notices: Arc<MemoryNotifier>,
    session: Arc<MintSession>,
}

/// Sim backend wired to the default kiosk config (matching chain, contract
/// and cap), with a short confirmation delay so tests stay fast.
fn sim_defaults() -> SimChainConfig {
    let config = KioskConfig::default();
    SimChainConfig::default()
        .with_contract(config.contract_address)
        .with_confirm_delay(Duration::from_millis(5))
}

fn kiosk(sim_config: SimChainConfig) -> Kiosk {
    let config = KioskConfig::default().with_supply_cap(sim_config.supply_cap);
    let sim = Arc::new(SimChain::new(sim_config));
    let notices = Arc::new(MemoryNotifier::new());
    let session = Arc::new(MintSession::new(
        Some(ChainServices::from_sim(sim.clone())),
        config,
        notices.clone(),
    ));
    Kiosk { sim, notices, session }
}

fn kiosk_without_provider() -> (Arc<MemoryNotifier>, MintSession) {
    let notices = Arc::new(MemoryNotifier::new());
    let session = MintSession::new(None, KioskConfig::default(), notices.clone());
    (notices, session)
}

async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within one second");
}

/// Test: connect with no provider present leaves the session untouched and
/// surfaces exactly one "install wallet" notice
#[tokio::test]
async fn connect_without_provider_single_notice_no_state_change() {
    let (notices, session) = kiosk_without_provider();

    let err = session.connect().await.unwrap_err();
    assert_eq!(err, KioskError::ProviderAbsent);

    let queued = notices.notices();
    assert_eq!(queued.len(), 1, "exactly one notice expected");
    assert!(queued[0].text.contains("wallet extension"));
    assert_eq!(session.view().account, None);
    assert_eq!(session.state(), SessionState::Disconnected);
}

/// Test: a chain mismatch surfaces a notice and never queries accounts
#[tokio::test]
async fn wrong_network_blocks_account_query() {
    let kiosk = kiosk(sim_defaults().with_chain_id(ChainId::MAINNET).preauthorized());

    let err = kiosk.session.restore_session().await.unwrap_err();
    assert!(matches!(err, KioskError::WrongNetwork { .. }));

    assert_eq!(kiosk.sim.accounts_queries(), 0, "eth_accounts must not be issued");
    let queued = kiosk.notices.notices();
    assert_eq!(queued.len(), 1);
    assert!(queued[0].text.contains("Rinkeby"));
    assert_eq!(kiosk.session.view().account, None);
}

/// Test: the session account is the first address of the most recent
/// authorization response, across repeated connects
#[tokio::test]
async fn connect_adopts_first_account_of_latest_response() {
    let kiosk = kiosk(sim_defaults().with_wallet_accounts(vec![dev_account(1), dev_account(2)]));

    let view = kiosk.session.connect().await.expect("first connect");
    assert_eq!(view.account, Some(dev_account(1)));

    kiosk.sim.set_wallet_accounts(vec![dev_account(7), dev_account(8)]);
    let view = kiosk.session.connect().await.expect("second connect");
    assert_eq!(view.account, Some(dev_account(7)));
}

/// Test: after a confirmed mint the counter matches the contract and the
/// loading flag is back to false
#[tokio::test]
async fn confirmed_mint_refreshes_counter_and_clears_loading() {
    let kiosk = kiosk(sim_defaults().with_initial_minted(3));
    kiosk.session.connect().await.expect("connect");

    let view = kiosk.session.mint().await.expect("mint");

    assert!(!view.loading);
    assert!(view.pending_tx.is_none());
    assert_eq!(view.minted, 4);
    assert_eq!(kiosk.sim.total_minted().await.unwrap(), 4);
}

/// Test: a cap revert surfaces the literal reason, clears loading, and
/// leaves the counter untouched
#[tokio::test]
async fn mint_revert_surfaces_reason_and_resets() {
    let kiosk = kiosk(sim_defaults().with_supply_cap(5).with_initial_minted(5));
    kiosk.session.connect().await.expect("connect");
    kiosk.session.refresh_count().await.expect("seed counter");
    let notices_before = kiosk.notices.len();

    let err = kiosk.session.mint().await.unwrap_err();
    assert_eq!(err, KioskError::ContractRevert(CAP_REVERT_REASON.into()));

    let queued = kiosk.notices.notices();
    assert_eq!(queued.len(), notices_before + 1);
    assert_eq!(queued.last().unwrap().text, CAP_REVERT_REASON);

    let view = kiosk.session.view();
    assert!(!view.loading);
    assert_eq!(view.minted, 5, "counter unchanged after revert");
    assert_eq!(kiosk.sim.total_minted().await.unwrap(), 5);
}

/// Test: the confirmation notice deep-links the minted token on every
/// configured marketplace
#[tokio::test]
async fn mint_confirmation_links_token_and_contract() {
    let kiosk = kiosk(sim_defaults().with_initial_minted(7));
    kiosk.session.connect().await.expect("connect");
    kiosk.session.mint().await.expect("mint");

    let notices = kiosk.notices.clone();
    wait_until(move || {
        notices.notices().iter().any(|n| n.kind == NoticeKind::Info)
    })
    .await;

    let queued = kiosk.notices.notices();
    let confirmation = queued
        .iter()
        .find(|n| n.kind == NoticeKind::Info)
        .expect("confirmation notice");
    let contract = kiosk.session.config().contract_address;
    assert!(confirmation.text.contains("Token #7"));
    assert!(confirmation.text.contains(&format!("{}/7", contract)));
}

/// Test: a declined authorization prompt surfaces a notice and restores the
/// prior state
#[tokio::test]
async fn rejected_connect_surfaces_notice() {
    let kiosk = kiosk(sim_defaults().rejecting_prompts());

    let err = kiosk.session.connect().await.unwrap_err();
    assert_eq!(err, KioskError::UserRejected);

    assert_eq!(kiosk.notices.len(), 1);
    assert_eq!(kiosk.session.state(), SessionState::Disconnected);
}

/// Test: restore adopts an already-authorized account without prompting
#[tokio::test]
async fn restore_adopts_preauthorized_account() {
    let kiosk = kiosk(sim_defaults().preauthorized().with_wallet_accounts(vec![dev_account(3)]));

    let view = kiosk.session.restore_session().await.expect("restore");

    assert_eq!(view.account, Some(dev_account(3)));
    assert_eq!(kiosk.sim.prompt_count(), 0, "restore must not prompt");
    assert!(kiosk.notices.is_empty());
}

/// Test: restore with nothing authorized is a silent no-op
#[tokio::test]
async fn restore_without_authorization_is_silent() {
    let kiosk = kiosk(sim_defaults());

    let view = kiosk.session.restore_session().await.expect("restore");

    assert_eq!(view.account, None);
    assert_eq!(kiosk.sim.prompt_count(), 0);
    assert!(kiosk.notices.is_empty());
}

/// Test: repeated connects and mints never stack duplicate listeners - two
/// confirmed mints produce exactly two confirmation notices
#[tokio::test]
async fn mint_watcher_fires_once_per_event() {
    let kiosk = kiosk(sim_defaults());
    kiosk.session.connect().await.expect("connect");
    kiosk.session.connect().await.expect("reconnect");

    kiosk.session.mint().await.expect("first mint");
    kiosk.session.mint().await.expect("second mint");

    let notices = kiosk.notices.clone();
    wait_until(move || {
        notices.notices().iter().filter(|n| n.kind == NoticeKind::Info).count() >= 2
    })
    .await;

    // Settle, then recount: duplicates would land here.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let confirmations = kiosk
        .notices
        .notices()
        .iter()
        .filter(|n| n.kind == NoticeKind::Info)
        .count();
    assert_eq!(confirmations, 2);
}

/// Test: a mint issued while one is in flight performs no second submission
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn in_flight_mint_blocks_second_submission() {
    let kiosk = kiosk(sim_defaults().with_confirm_delay(Duration::from_millis(150)));
    kiosk.session.connect().await.expect("connect");

    let first = {
        let session = kiosk.session.clone();
        tokio::spawn(async move { session.mint().await })
    };
    tokio::time::sleep(Duration::from_millis(40)).await;

    let view = kiosk.session.mint().await.expect("no-op mint");
    assert!(view.loading, "second call observes the in-flight mint");

    first.await.expect("join").expect("first mint");
    assert_eq!(kiosk.sim.submission_count(), 1);
}

/// Test: minting without a session account fails instead of panicking
#[tokio::test]
async fn mint_without_session_fails() {
    let kiosk = kiosk(sim_defaults());

    let err = kiosk.session.mint().await.unwrap_err();
    assert_eq!(err, KioskError::NotConnected);
    assert_eq!(kiosk.sim.submission_count(), 0);
    assert_eq!(kiosk.notices.len(), 1);
}
