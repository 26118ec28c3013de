//! WebSocket adapter between the client loop and the external relay.
//!
//! Connects, sends the bootstrap request, then pumps events until the
//! socket closes: inbound text frames and keep-alive ticks become
//! [`ClientEvent`]s, UI gestures arrive over an mpsc channel, and the frames
//! each event yields are written back to the socket.
//!
//! On closure the loop simply returns; no reconnection is attempted and the
//! replica state goes stale until a new connection bootstraps it.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{info, warn};

use crate::client::runtime::{Client, ClientEvent, UiEvent};
use crate::protocol::message::encode;
use crate::protocol::sync::KEEP_ALIVE_INTERVAL;

/// Failures at the transport boundary. The replica core itself never fails;
/// these cover only the socket and the outbound codec.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket connect failed: {0}")]
    Connect(#[source] tungstenite::Error),
    #[error("websocket send failed: {0}")]
    Send(#[source] tungstenite::Error),
    #[error("outbound frame encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Runs the client against the relay at `url` until the socket closes or
/// the UI channel is dropped.
pub async fn run(
    url: &str,
    client: &mut Client,
    mut ui_events: mpsc::Receiver<UiEvent>,
) -> Result<(), TransportError> {
    let (socket, _) = connect_async(url).await.map_err(TransportError::Connect)?;
    info!(url, "connected to relay");

    let (mut sink, mut stream) = socket.split();

    let hello = encode(&client.bootstrap_request()).map_err(TransportError::Encode)?;
    sink.send(Message::Text(hello))
        .await
        .map_err(TransportError::Send)?;

    let mut keep_alive = tokio::time::interval(KEEP_ALIVE_INTERVAL);
    // The first tick completes immediately; consume it so pings start one
    // interval after connect.
    keep_alive.tick().await;

    loop {
        let event = tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => ClientEvent::Frame(text),
                Some(Ok(Message::Close(_))) | None => {
                    info!("relay closed the connection, no reconnect attempted");
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(error)) => {
                    warn!(%error, "websocket read failed, stopping");
                    break;
                }
            },
            _ = keep_alive.tick() => ClientEvent::KeepAlive,
            gesture = ui_events.recv() => match gesture {
                Some(gesture) => ClientEvent::Ui(gesture),
                None => {
                    info!("ui channel closed, stopping");
                    break;
                }
            },
        };

        for frame in client.handle(event) {
            let text = encode(&frame).map_err(TransportError::Encode)?;
            sink.send(Message::Text(text))
                .await
                .map_err(TransportError::Send)?;
        }
    }

    Ok(())
}
