//! Per-connection handler: greeting, inbound decoding, and the outbound
//! writer.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Assign a `PlayerId` and queue `Welcome`
//!   2. Loop: decode inbound envelopes and hand them to the gateway,
//!      while writing queued server events to the socket
//!   3. On close, error, or idle timeout: remove the player

use std::sync::Arc;
use std::time::Instant;

use oddword_protocol::{
    ClientEvent, Codec, Envelope, PROTOCOL_VERSION, PlayerId, ServerEvent,
};
use oddword_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::OddwordError;
use crate::server::ServerState;

/// Drop guard that removes the player when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct DisconnectGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.disconnect(player_id).await;
        });
    }
}

/// Stamps outbound events with a sequence number and a timestamp.
struct Outbound {
    seq: u64,
    start: Instant,
}

impl Outbound {
    fn new() -> Self {
        Self {
            seq: 1,
            start: Instant::now(),
        }
    }

    fn wrap(&mut self, payload: ServerEvent) -> Envelope<ServerEvent> {
        Envelope {
            seq: next_seq(&mut self.seq),
            timestamp: self.elapsed_ms(),
            payload,
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), OddwordError> {
    let conn_id = conn.id();
    let player_id = state.next_player_id();
    tracing::info!(%conn_id, %player_id, "player connected");

    // Everything bound for this client, replies included, goes through
    // one queue so the socket sees a single ordered stream.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _ = tx.send(ServerEvent::Welcome {
        player_id,
        protocol_version: PROTOCOL_VERSION,
    });
    state.register(player_id, tx.clone()).await;
    let _guard = DisconnectGuard {
        player_id,
        state: Arc::clone(&state),
    };

    let mut outbound = Outbound::new();
    let idle_timeout = state.config.idle_timeout;
    let idle = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                };
                idle.as_mut().reset(tokio::time::Instant::now() + idle_timeout);

                let envelope: Envelope<ClientEvent> = match state.codec.decode(&data) {
                    Ok(env) => env,
                    Err(e) => {
                        tracing::debug!(
                            %player_id, error = %e, "failed to decode envelope"
                        );
                        let _ = tx.send(ServerEvent::Error {
                            code: 400,
                            message: format!("invalid message: {e}"),
                        });
                        continue;
                    }
                };

                match envelope.payload {
                    ClientEvent::Heartbeat { client_time } => {
                        let _ = tx.send(ServerEvent::HeartbeatAck {
                            client_time,
                            server_time: outbound.elapsed_ms(),
                        });
                    }
                    event => {
                        state
                            .apply(move |gateway| gateway.handle(player_id, event))
                            .await;
                    }
                }
            }
            Some(event) = rx.recv() => {
                let bytes = state.codec.encode(&outbound.wrap(event))?;
                conn.send(&bytes).await?;
            }
            () = &mut idle => {
                tracing::info!(%player_id, "connection timed out");
                break;
            }
        }
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(%player_id, error = %e, "close failed");
    }
    // _guard drops here → the player leaves their room.
    Ok(())
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}
