//! `OddwordServer` builder and server loop.
//!
//! Ties the layers together: transport → codec → gateway → game core.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use oddword_game::{
    GameConfig, GameSession, RandomSource, RoomRegistry, ThreadRandom, WordCatalog,
};
use oddword_protocol::{Codec, JsonCodec, PlayerId, ServerEvent};
use oddword_transport::{Transport, WebSocketTransport};
use tokio::sync::{Mutex, mpsc};

use crate::countdown;
use crate::handler::handle_connection;
use crate::{Gateway, OddwordError, Outcome, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Lock order is always `gateway` then `clients`.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) gateway: Mutex<Gateway>,
    clients: Mutex<HashMap<PlayerId, mpsc::UnboundedSender<ServerEvent>>>,
    next_player: AtomicU64,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

impl<C: Codec> ServerState<C> {
    pub(crate) fn new(config: ServerConfig, gateway: Gateway, codec: C) -> Self {
        Self {
            gateway: Mutex::new(gateway),
            clients: Mutex::new(HashMap::new()),
            next_player: AtomicU64::new(1),
            codec,
            config,
        }
    }

    pub(crate) fn next_player_id(&self) -> PlayerId {
        PlayerId(self.next_player.fetch_add(1, Ordering::Relaxed))
    }

    /// Routes future deliveries for `player` into `tx`.
    pub(crate) async fn register(
        &self,
        player: PlayerId,
        tx: mpsc::UnboundedSender<ServerEvent>,
    ) {
        self.clients.lock().await.insert(player, tx);
    }

    /// Runs `f` against the gateway and delivers its outcome.
    ///
    /// Deliveries are queued before the gateway lock is released, so every
    /// player sees events in the order the gateway produced them.
    pub(crate) async fn apply<F>(self: &Arc<Self>, f: F)
    where
        F: FnOnce(&mut Gateway) -> Outcome + Send,
    {
        let mut gateway = self.gateway.lock().await;
        let outcome = f(&mut gateway);
        {
            let clients = self.clients.lock().await;
            for (player, event) in outcome.deliveries {
                match clients.get(&player) {
                    Some(tx) => {
                        // The receiver only goes away with its handler,
                        // which deregisters right after.
                        let _ = tx.send(event);
                    }
                    None => {
                        tracing::debug!(player_id = %player, "no connection for delivery");
                    }
                }
            }
        }
        drop(gateway);

        if let Some(request) = outcome.countdown {
            countdown::arm(Arc::clone(self), request);
        }
    }

    /// Forgets the player's connection and removes them from their room.
    pub(crate) async fn disconnect(self: &Arc<Self>, player: PlayerId) {
        self.clients.lock().await.remove(&player);
        self.apply(|gateway| gateway.disconnect(player)).await;
        tracing::info!(player_id = %player, "player disconnected");
    }
}

/// Builder for configuring and starting an Oddword server.
///
/// # Example
///
/// ```rust,ignore
/// use oddword::prelude::*;
///
/// let server = OddwordServer::builder()
///     .bind("0.0.0.0:8080")
///     .discussion(Duration::from_secs(90))
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct OddwordServerBuilder {
    config: ServerConfig,
    catalog: WordCatalog,
    code_rng: Option<Box<dyn RandomSource>>,
    round_rng: Option<Box<dyn RandomSource>>,
}

impl OddwordServerBuilder {
    /// Creates a new builder with default settings and the built-in words.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            catalog: WordCatalog::builtin(),
            code_rng: None,
            round_rng: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn discussion(mut self, duration: Duration) -> Self {
        self.config.discussion = duration;
        self
    }

    pub fn idle_timeout(mut self, duration: Duration) -> Self {
        self.config.idle_timeout = duration;
        self
    }

    pub fn game(mut self, game: GameConfig) -> Self {
        self.config.game = game;
        self
    }

    pub fn catalog(mut self, catalog: WordCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Randomness for room codes. Defaults to the thread RNG.
    pub fn code_rng(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.code_rng = Some(rng);
        self
    }

    /// Randomness for word pairs and imposters. Defaults to the thread RNG.
    pub fn round_rng(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.round_rng = Some(rng);
        self
    }

    /// Binds the listener and assembles the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<OddwordServer, OddwordError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let registry = RoomRegistry::new(
            self.config.game.clone(),
            self.code_rng.unwrap_or_else(|| Box::new(ThreadRandom)),
        );
        let session = GameSession::new(
            &self.config.game,
            self.catalog,
            self.round_rng.unwrap_or_else(|| Box::new(ThreadRandom)),
        );
        let gateway = Gateway::new(registry, session, self.config.discussion);

        let state = Arc::new(ServerState::new(self.config, gateway, JsonCodec));
        Ok(OddwordServer { transport, state })
    }
}

impl Default for OddwordServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Oddword game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct OddwordServer {
    transport: WebSocketTransport,
    state: Arc<ServerState<JsonCodec>>,
}

impl OddwordServer {
    /// Creates a new builder.
    pub fn builder() -> OddwordServerBuilder {
        OddwordServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), OddwordError> {
        tracing::info!(addr = %self.state.config.bind_addr, "oddword server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
