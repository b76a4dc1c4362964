//! Wire protocol for Oddword.
//!
//! This crate defines the "language" that browsers and the game server
//! speak:
//!
//! - **Types** ([`Envelope`], [`ClientEvent`], [`ServerEvent`], etc.) —
//!   the event structures that travel on the wire.
//! - **Identity** ([`PlayerId`], [`RoomCode`]) — how players and rooms
//!   are named on both sides of the connection.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the game
//! core (rooms, rounds, votes). It doesn't know about connections or
//! rooms — it only knows how to serialize and deserialize events.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Gateway → Game core
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, Envelope, PlayerId, RoomCode, ServerEvent, PROTOCOL_VERSION,
};
