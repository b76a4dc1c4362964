//! Unified error type for the Oddword server.

use oddword_game::GameError;
use oddword_protocol::ProtocolError;
use oddword_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum OddwordError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rule of the game was violated.
    #[error(transparent)]
    Game(#[from] GameError),
}

impl OddwordError {
    /// The HTTP-style status code reported to clients for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Game(e) => e.status_code(),
            Self::Protocol(_) => 400,
            Self::Transport(_) => 500,
        }
    }
}
