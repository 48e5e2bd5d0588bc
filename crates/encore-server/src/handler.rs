//! Per-connection handler: reads client events, routes them to rooms.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The connection is split in two: the read half stays here and drives the
//! event loop, while the write half moves into a writer task that pumps
//! room broadcasts out as JSON text frames. That way a slow socket never
//! blocks a room actor — events queue in the player's channel.
//!
//! A connection is anonymous until its first `join`. Events arriving
//! before that, and frames that fail to decode, are logged and dropped —
//! the same no-op policy rooms apply to unknown players.

use std::sync::Arc;

use encore_protocol::{ClientEvent, Codec, PlayerName, ServerEvent};
use encore_room::RoomHandle;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::server::ServerState;
use crate::ws::{ConnectionId, WsConnection, WsSink};
use crate::ServerError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WsConnection,
    state: Arc<ServerState>,
) -> Result<(), ServerError> {
    let conn_id = conn.id();
    let (sink, mut source) = conn.split();

    // One outbound channel per connection. Rooms hold the sender; the
    // writer task drains the receiver into the socket.
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    tokio::spawn(pump_events(events_rx, sink, conn_id));

    // Filled in by the first join; later joins may move the connection
    // to another room.
    let mut room: Option<RoomHandle> = None;
    let mut player: Option<PlayerName> = None;

    while let Some(msg) = source.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match &msg {
            Message::Text(text) => {
                match state.codec.decode(text.as_bytes()) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!(
                            %conn_id, error = %e, "undecodable frame"
                        );
                        continue;
                    }
                }
            }
            Message::Binary(data) => match state.codec.decode(data) {
                Ok(event) => event,
                Err(e) => {
                    tracing::debug!(
                        %conn_id, error = %e, "undecodable frame"
                    );
                    continue;
                }
            },
            Message::Close(_) => break,
            // Ping/pong are answered by tungstenite itself.
            _ => continue,
        };

        if let ClientEvent::Join { room: room_id, name } = event {
            let handle =
                state.rooms.lock().await.get_or_create(&room_id);
            handle.join(name.clone(), events_tx.clone()).await?;
            tracing::info!(%conn_id, %room_id, player = %name, "joined");
            room = Some(handle);
            player = Some(name);
            continue;
        }

        let Some(handle) = room.as_ref() else {
            tracing::debug!(%conn_id, "event before join, dropped");
            continue;
        };

        match event {
            ClientEvent::Join { .. } => unreachable!("handled above"),
            ClientEvent::Submit {
                name,
                media_locator,
            } => handle.submit(name, media_locator).await?,
            ClientEvent::PlayOriginal {
                media_locator,
                kind,
            } => handle.play_original(media_locator, kind).await?,
            ClientEvent::Vote {
                voter_name,
                target_name,
                weight,
            } => handle.vote(voter_name, target_name, weight).await?,
            ClientEvent::EndRound => handle.end_round().await?,
            ClientEvent::PlayAllImitations => handle.play_all().await?,
            ClientEvent::StartRound => handle.start_round().await?,
        }
    }

    if let Some(name) = player {
        tracing::info!(%conn_id, player = %name, "connection closed");
    } else {
        tracing::debug!(%conn_id, "connection closed before join");
    }
    Ok(())
}

/// Writer task: serializes room events into JSON text frames.
///
/// Ends when the socket rejects a write (peer gone) or every sender is
/// dropped. Rooms keep a sender per player name, so in practice the send
/// failure after disconnect is what stops the task.
async fn pump_events(
    mut events_rx: mpsc::UnboundedReceiver<ServerEvent>,
    mut sink: WsSink,
    conn_id: ConnectionId,
) {
    while let Some(event) = events_rx.recv().await {
        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(
                    %conn_id, error = %e, "failed to serialize event"
                );
                continue;
            }
        };
        if let Err(e) = sink.send(Message::Text(text.into())).await {
            tracing::debug!(%conn_id, error = %e, "writer stopping");
            break;
        }
    }
}
