//! Headless observer client for the collaborative line editor.
//!
//! Connects to the relay, bootstraps the replica, and logs every state
//! change as it arrives. This is the attachment point for a rendering
//! layer: feed `UiEvent`s into the channel and subscribe to changes.

use tokio::sync::mpsc;
use tracing::{Level, error, info};

use line_sync::client::{Client, run};

const DEFAULT_RELAY_URL: &str = "ws://localhost:9000/ws";

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string());

    info!(%url, "starting line-sync client");

    let mut client = Client::new();

    // Log every observable state change; a real rendering layer would
    // subscribe the same way and redraw instead.
    let mut changes = client.subscribe();
    tokio::spawn(async move {
        while let Ok(change) = changes.recv().await {
            info!(?change, "state changed");
        }
    });

    // Held open for the life of the connection; a UI would send gestures
    // through this.
    let (_ui_tx, ui_rx) = mpsc::channel(32);

    if let Err(error) = run(&url, &mut client, ui_rx).await {
        error!(%error, "transport failed");
        std::process::exit(1);
    }

    info!(
        lines = client.replica().document().len(),
        chats = client.replica().chat().len(),
        "session ended"
    );
}
