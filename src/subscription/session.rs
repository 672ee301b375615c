use crate::fleet::FleetStore;
use crate::subscription::protocol::{parse_client_message, ClientMessage, ServerMessage};
use crate::subscription::registry::{BroadcastReport, ConnectionRegistry, SubscriberId};
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Drives a single WebSocket connection
pub struct Session {
    id: SubscriberId,
    fleet: Arc<FleetStore>,
    registry: Arc<ConnectionRegistry>,
    channel_capacity: usize,
}

impl Session {
    pub fn new(
        fleet: Arc<FleetStore>,
        registry: Arc<ConnectionRegistry>,
        channel_capacity: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            fleet,
            registry,
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Handle WebSocket connection lifecycle.
    ///
    /// The socket is split: a writer task owns the sink and is the only
    /// thing that writes to it, draining this session's channel; the loop
    /// below reads inbound frames. The session ends when the client closes,
    /// the transport errors, or the registry drops the channel.
    pub async fn handle(self, socket: WebSocket) {
        info!(subscriber = %self.id, "WebSocket connection established");

        let (mut sink, mut stream) = socket.split();
        let (tx, mut rx) = mpsc::channel::<String>(self.channel_capacity);

        // Queue initial data before registering so it is always the first frame
        match ServerMessage::initial_data(self.fleet.current_view()).to_json() {
            Ok(json) => {
                if tx.send(json).await.is_err() {
                    error!(subscriber = %self.id, "Session channel closed before initial data");
                    return;
                }
            }
            Err(e) => error!(subscriber = %self.id, error = %e, "Failed to encode initial data"),
        }

        self.registry.register(self.id, tx);

        let id = self.id;
        let mut writer = tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    debug!(subscriber = %id, error = %e, "WebSocket send failed");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        loop {
            tokio::select! {
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Err(e) = self.handle_client_message(&text).await {
                                debug!(subscriber = %self.id, error = %e, "Ignoring malformed client message");
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(subscriber = %self.id, "WebSocket client disconnected");
                            break;
                        }
                        Some(Ok(_)) => {
                            // Binary and pong frames are ignored; pings are answered by the transport
                        }
                        Some(Err(e)) => {
                            warn!(subscriber = %self.id, error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                _ = &mut writer => {
                    debug!(subscriber = %self.id, "Writer stopped");
                    break;
                }
            }
        }

        self.registry.unregister(&self.id);
        writer.abort();

        info!(subscriber = %self.id, "WebSocket connection closed");
    }

    /// Handle one inbound text frame
    pub async fn handle_client_message(&self, text: &str) -> anyhow::Result<BroadcastReport> {
        apply_client_message(text, &self.fleet, &self.registry).await
    }
}

/// Apply an inbound client message to the shared state.
///
/// A `user_location` message regenerates the fleet and broadcasts
/// `location_updated` to every subscriber, the sender included. Anything
/// that does not parse is returned as an error and changes nothing.
pub async fn apply_client_message(
    text: &str,
    fleet: &FleetStore,
    registry: &ConnectionRegistry,
) -> anyhow::Result<BroadcastReport> {
    let msg = parse_client_message(text)?;

    match msg {
        ClientMessage::UserLocation { lat, lng } => {
            info!(lat = lat, lng = lng, "Client updated reference location");
            let view = fleet.regenerate(lat, lng);
            let json = ServerMessage::location_updated(view).to_json()?;
            Ok(registry.broadcast(&json).await)
        }
    }
}
