//! Rolling keystream crypto and handshake obscuring.
//!
//! Grounded in `examples/original_source/Server/Server.c` (handshake framing,
//! lines ~385-404) and `Server/Client.c` (rolling key advance on send,
//! `rr_get_hash`/`rr_encrypt` call sites). The original `rr_encrypt`/
//! `rr_get_hash` bodies live in a `Shared/Crypto.c` that was not retained in
//! the source pack, so the mixing function itself (`roll_key`, a splitmix64
//! variant) is this port's own, chosen only to be a deterministic,
//! reversible 64-bit hash suitable for a keystream generator. Every
//! observable *protocol* behavior it must reproduce is preserved exactly:
//! the four fixed handshake keystream passes, the 8-byte extra pass with
//! key `1`, and the double-hash-on-receive / single-hash-on-send asymmetry.

/// The four hard-coded keystream constants XORed over the 1024-byte
/// handshake frame, applied in this order. Bit-exact with the original.
pub const HANDSHAKE_KEYSTREAM_PASSES: [u64; 4] = [
    21_094_093_777_837_637,
    59_731_158_950_470_853,
    64_709_235_936_361_169,
    59_013_169_977_270_713,
];

/// Size in bytes of the first (always-obscured) handshake frame.
pub const HANDSHAKE_FRAME_SIZE: usize = 1024;

/// Starting value of `quick_verification` on both peers before any packet
/// is exchanged (`RR_SECRET8` in the original).
pub const RR_SECRET8: u8 = 0xA7;

/// A splitmix64-style avalanche mix, used both as `rr_get_hash` (rolling key
/// advance) and as the keystream expansion function.
#[inline]
pub fn roll_key(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Advances the 1-byte quick-verification sequence number the same way on
/// both peers (`client->quick_verification = rr_get_hash(...)` truncated to
/// a byte).
#[inline]
pub fn roll_quick_verification(qv: u8) -> u8 {
    (roll_key(qv as u64) & 0xff) as u8
}

/// XORs `data` in place with a keystream expanded from `key`, exactly as
/// `rr_encrypt(data, size, key)` does: each 8-byte block is XORed with a
/// freshly re-mixed 64-bit word, so encrypting `n` bytes consumes
/// `ceil(n/8)` mix steps of the *same* key seed, not the rolling session
/// key (only the session key itself rolls, once per message send/receive).
pub fn xor_keystream(data: &mut [u8], key: u64) {
    let mut block = key;
    for chunk in data.chunks_mut(8) {
        block = roll_key(block);
        let bytes = block.to_le_bytes();
        for (b, k) in chunk.iter_mut().zip(bytes.iter()) {
            *b ^= k;
        }
    }
}

/// Applies the fixed four-pass handshake obscuring to a 1024-byte frame,
/// plus the extra 8-byte pass over the verification field with key `1`.
/// Used identically by server (encode) and client (decode) since XOR is its
/// own inverse.
pub fn obscure_handshake_frame(frame: &mut [u8; HANDSHAKE_FRAME_SIZE]) {
    xor_keystream(frame, HANDSHAKE_KEYSTREAM_PASSES[0]);
    xor_keystream(&mut frame[..8], 1);
    xor_keystream(frame, HANDSHAKE_KEYSTREAM_PASSES[1]);
    xor_keystream(frame, HANDSHAKE_KEYSTREAM_PASSES[2]);
    xor_keystream(frame, HANDSHAKE_KEYSTREAM_PASSES[3]);
}

/// One session direction's rolling encryption key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingKey(u64);

impl RollingKey {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Advances the key by one hash step (used once per message sent, and
    /// twice per message received, per §4.7).
    pub fn advance(&mut self) {
        self.0 = roll_key(self.0);
    }

    /// Clientbound-direction rule: advance once, then apply the new key.
    /// Used identically by the server to encrypt and by the client to
    /// decrypt, so both ends land on `hash^N(initial)` after N messages
    /// (Testable Property 4).
    pub fn advance_then_apply(&mut self, data: &mut [u8]) {
        self.advance();
        xor_keystream(data, self.0);
    }

    /// Serverbound-direction rule: apply the current key, then advance
    /// twice. Used identically by the client to encrypt and by the server
    /// to decrypt -- the double advance is a deliberate resync margin so
    /// the two ends don't drift if a packet is ever silently dropped.
    pub fn apply_then_advance_twice(&mut self, data: &mut [u8]) {
        xor_keystream(data, self.0);
        self.advance();
        self.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_keystream_is_its_own_inverse() {
        let original = b"hello rysteria world, this is a test payload!!!".to_vec();
        let mut data = original.clone();
        xor_keystream(&mut data, 0xDEADBEEF);
        assert_ne!(data, original);
        xor_keystream(&mut data, 0xDEADBEEF);
        assert_eq!(data, original);
    }

    #[test]
    fn clientbound_keys_agree_after_n_messages() {
        let mut server_key = RollingKey::new(123456789);
        let mut client_key = RollingKey::new(123456789);
        let mut expected = 123456789u64;

        for _ in 0..50 {
            let mut msg = vec![1u8, 2, 3, 4, 5, 6, 7, 8, 9];
            let plaintext = msg.clone();
            server_key.advance_then_apply(&mut msg);
            client_key.advance_then_apply(&mut msg);
            assert_eq!(msg, plaintext, "client must recover the plaintext");
            expected = roll_key(expected);
        }
        assert_eq!(server_key.value(), expected);
        assert_eq!(client_key.value(), expected);
    }

    #[test]
    fn serverbound_keys_agree_with_double_advance() {
        let mut client_key = RollingKey::new(42);
        let mut server_key = RollingKey::new(42);

        for _ in 0..50 {
            let mut msg = vec![9u8, 8, 7, 6, 5, 4, 3, 2, 1];
            let plaintext = msg.clone();
            client_key.apply_then_advance_twice(&mut msg);
            server_key.apply_then_advance_twice(&mut msg);
            assert_eq!(msg, plaintext);
        }
        assert_eq!(client_key.value(), server_key.value());
    }

    #[test]
    fn handshake_frame_roundtrips() {
        let mut frame = [0u8; HANDSHAKE_FRAME_SIZE];
        fastrand_fill(&mut frame);
        let original = frame;
        obscure_handshake_frame(&mut frame);
        assert_ne!(frame, original);
        obscure_handshake_frame(&mut frame);
        assert_eq!(frame, original);
    }

    fn fastrand_fill(buf: &mut [u8]) {
        let mut seed: u64 = 42;
        for b in buf.iter_mut() {
            seed = roll_key(seed);
            *b = (seed & 0xff) as u8;
        }
    }
}
