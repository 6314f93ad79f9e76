//! The 1024-byte obscured handshake frame (§4.7, `Server.c`'s
//! `LWS_CALLBACK_ESTABLISHED` branch): `requested_verification`, 4 padding
//! bytes, then both rolling keys, all four fixed keystream passes applied
//! on top.

use rysteria_protocol::crypto::{obscure_handshake_frame, HANDSHAKE_FRAME_SIZE};
use rysteria_protocol::{PacketReader, PacketWriter};

pub struct HandshakeFields {
    pub requested_verification: u64,
    pub clientbound_key: u64,
    pub serverbound_key: u64,
}

/// Builds the obscured frame the server sends immediately on accept.
pub fn build_handshake_frame(fields: &HandshakeFields) -> [u8; HANDSHAKE_FRAME_SIZE] {
    let mut writer = PacketWriter::with_capacity(HANDSHAKE_FRAME_SIZE);
    writer.write_u64(fields.requested_verification);
    writer.write_u32(fastrand::u32(..));
    writer.write_u64(fields.clientbound_key);
    writer.write_u64(fields.serverbound_key);
    let mut body = writer.into_vec();
    body.resize(HANDSHAKE_FRAME_SIZE, 0);
    let mut frame = [0u8; HANDSHAKE_FRAME_SIZE];
    frame.copy_from_slice(&body);
    obscure_handshake_frame(&mut frame);
    frame
}

/// Undoes the obscuring and parses a frame a client sent back, used by
/// tests and by any future replay-style harness; the live client applies
/// the same inverse to read the server's own frame.
pub fn verify_handshake_frame(mut frame: [u8; HANDSHAKE_FRAME_SIZE]) -> Option<HandshakeFields> {
    obscure_handshake_frame(&mut frame);
    let mut reader = PacketReader::new(&frame);
    let requested_verification = reader.read_u64("requested_verification").ok()?;
    let _useless = reader.read_u32("useless").ok()?;
    let clientbound_key = reader.read_u64("clientbound_key").ok()?;
    let serverbound_key = reader.read_u64("serverbound_key").ok()?;
    Some(HandshakeFields { requested_verification, clientbound_key, serverbound_key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_roundtrips_through_obscuring() {
        let fields = HandshakeFields {
            requested_verification: 0xABCD,
            clientbound_key: 111,
            serverbound_key: 222,
        };
        let frame = build_handshake_frame(&fields);
        let parsed = verify_handshake_frame(frame).unwrap();
        assert_eq!(parsed.requested_verification, 0xABCD);
        assert_eq!(parsed.clientbound_key, 111);
        assert_eq!(parsed.serverbound_key, 222);
    }
}
