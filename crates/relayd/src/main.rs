//! Relay Daemon - support-ticket relay
//!
//! Receives user messages from the chat platform, persists each as a
//! ticket, forwards it to the operator, and routes ID-addressed replies
//! back to the originating user.

use std::sync::Arc;

use anyhow::Result;
use relay_common::store::TicketStore;
use relayd::config::Config;
use relayd::poller::{self, Relay};
use relayd::telegram::TelegramTransport;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Relay Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    config.validate()?;

    // Provision the ticket table before serving traffic; a missing or
    // unwritable database is fatal here, not at the first request
    let store = TicketStore::open(&config.store.db_path).await?;

    let transport = Arc::new(TelegramTransport::new(
        &config.telegram.api_url,
        &config.telegram.token,
        config.telegram.poll_timeout_secs,
        config.telegram.proxy.as_deref(),
    )?);

    let relay = Relay::new(store, transport.clone(), config.telegram.operator_id);

    info!("Relay Daemon ready");

    tokio::select! {
        result = poller::run(&relay, &transport, config.telegram.poll_timeout_secs) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down gracefully");
            Ok(())
        }
    }
}
