//! Wire protocol, crypto and shared identifiers for the Rysteria arena
//! server. Everything a future client needs to stay byte-compatible with
//! the authoritative server lives here; simulation state lives in
//! `rysteria_server`.

pub mod codec;
pub mod crypto;
pub mod entity;
pub mod error;
pub mod ids;
pub mod packet;

pub use codec::{PacketReader, PacketWriter};
pub use entity::WireEntity;
pub use error::ProtocolError;
