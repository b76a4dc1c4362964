//! Server-level configuration.

use std::time::Duration;

use oddword_game::GameConfig;

/// Everything the server needs besides the word catalog.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// How long discussion lasts before voting opens on its own.
    pub discussion: Duration,

    /// A connection that sends nothing (not even a heartbeat) for this
    /// long is dropped.
    pub idle_timeout: Duration,

    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            discussion: Duration::from_secs(120),
            idle_timeout: Duration::from_secs(30),
            game: GameConfig::default(),
        }
    }
}
