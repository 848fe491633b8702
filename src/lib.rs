//! Mintkiosk: wallet-session orchestration for a capped NFT mint.
//!
//! # Architecture
//!
//! ```text
//! MintSession (orchestrator)
//!   │
//!   ├── ChainServices (injected capabilities)
//!   │     ├── WalletProvider  → chain_id / accounts / request_accounts
//!   │     └── MintContract    → submit_mint / wait_confirmed / total_minted / events
//!   │
//!   ├── Notifier (injected dialog sink)
//!   │     ├── TerminalNotifier (CLI / REPL)
//!   │     └── MemoryNotifier   (HTTP facade, tests)
//!   │
//!   └── mint watcher (one task per session, armed idempotently)
//!         └── minted event → confirmation notice with marketplace links
//! ```
//!
//! # Operations
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `restore_session` | verify network, adopt an already-authorized account (no prompt) |
//! | `verify_network` | compare the provider's chain id against the configured one |
//! | `connect` | prompt for account access, adopt the first address returned |
//! | `mint` | submit the mint, await confirmation, refresh the counter |
//! | `refresh_count` | read-only total-minted call |
//! | `view` | immutable snapshot for rendering |
//!
//! The wallet provider and the contract are boundary collaborators injected
//! as traits; [`SimChain`] serves both during development and in tests. User
//! dialogs go through the [`Notifier`] seam, so every front end (CLI, REPL,
//! HTTP) renders the same flow.
//!
//! # Usage
//!
//! ```ignore
//! use mintkiosk::{ChainServices, KioskConfig, MintSession, SimChain, SimChainConfig, TerminalNotifier};
//! use std::sync::Arc;
//!
//! let sim = Arc::new(SimChain::new(SimChainConfig::default()));
//! let session = MintSession::new(
//!     Some(ChainServices::from_sim(sim)),
//!     KioskConfig::default(),
//!     Arc::new(TerminalNotifier),
//! );
//!
//! session.restore_session().await?;
//! session.connect().await?;
//! session.mint().await?;
//! println!("{} / {} minted", session.view().minted, session.view().cap);
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod server;
pub mod session;

pub use chain::{
    Address, ChainId, MintContract, MintRequest, MintedEvent, SimChain, TokenId, TxHash,
    WalletProvider,
};
pub use chain::sim::SimChainConfig;
pub use config::{KioskConfig, Marketplace};
pub use error::{KioskError, KioskResult};
pub use notify::{MemoryNotifier, Notice, NoticeKind, Notifier, TerminalNotifier};
pub use server::create_router;
pub use session::{ChainServices, MintSession, Phase, SessionState, ViewModel};
