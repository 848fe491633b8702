//! Mint-completion watcher - one long-lived listener per session.

use crate::chain::{Address, MintContract, MintedEvent};
use crate::config::Marketplace;
use crate::notify::{Notice, Notifier};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub(crate) fn spawn(
    contract: Arc<dyn MintContract>,
    marketplaces: Vec<Marketplace>,
    notifier: Arc<dyn Notifier>,
) -> JoinHandle<()> {
    let contract_address = contract.address();
    let rx = contract.subscribe_minted();
    tokio::spawn(run(rx, contract_address, marketplaces, notifier))
}

async fn run(
    mut rx: broadcast::Receiver<MintedEvent>,
    contract: Address,
    marketplaces: Vec<Marketplace>,
    notifier: Arc<dyn Notifier>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                tracing::info!(minter = %event.minter, token_id = event.token_id, "mint event");
                notifier.notify(Notice::info(confirmation_text(contract, &event, &marketplaces)));
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "mint watcher lagged behind the event stream");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!("mint event stream closed");
                return;
            }
        }
    }
}

fn confirmation_text(
    contract: Address,
    event: &MintedEvent,
    marketplaces: &[Marketplace],
) -> String {
    let mut text = format!(
        "Token #{} minted and sent to your wallet. It can take a few minutes to show up.",
        event.token_id
    );
    for market in marketplaces {
        text.push_str(&format!(
            " {}: {}",
            market.label,
            market.asset_url(contract, event.token_id)
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KioskConfig;

    #[test]
    fn confirmation_text_links_every_marketplace() {
        let config = KioskConfig::default();
        let event = MintedEvent { minter: Address::repeat_byte(0xab), token_id: 7 };
        let text = confirmation_text(config.contract_address, &event, &config.marketplaces);

        assert!(text.contains("Token #7"));
        assert!(text.contains(&format!("{}/7", config.contract_address)));
        assert!(text.contains("OpenSea"));
        assert!(text.contains("Rarible"));
    }
}
