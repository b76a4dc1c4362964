//! # Oddword
//!
//! A WebSocket server for a party game of hidden words: every player in a
//! room gets the same secret word except one, the imposter, who gets a
//! related but different one. After a timed discussion everybody votes on
//! who they think the imposter is and the results are revealed.
//!
//! The game rules live in [`oddword_game`]; this crate wires them to the
//! network. Inbound [`ClientEvent`](oddword_protocol::ClientEvent)s are
//! applied to the rooms by the [`Gateway`], and the resulting
//! [`ServerEvent`](oddword_protocol::ServerEvent)s are fanned out to each
//! recipient's connection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oddword::prelude::*;
//!
//! # async fn run() -> Result<(), OddwordError> {
//! let server = OddwordServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod countdown;
mod error;
mod gateway;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::OddwordError;
pub use gateway::{CountdownRequest, Gateway, Outcome};
pub use server::{OddwordServer, OddwordServerBuilder};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{OddwordError, OddwordServer, OddwordServerBuilder, ServerConfig};
    pub use oddword_game::{EmptyRoomPolicy, GameConfig, WordCatalog, WordPair};
}
