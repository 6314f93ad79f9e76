mod reader;
mod writer;

pub use reader::PacketReader;
pub use writer::PacketWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varuint_roundtrip() {
        for v in [0u64, 1, 127, 128, 300, 16384, u32::MAX as u64, u64::MAX] {
            let mut w = PacketWriter::new();
            w.write_varuint(v);
            let bytes = w.into_vec();
            let mut r = PacketReader::new(&bytes);
            assert_eq!(r.read_varuint("v").unwrap(), v);
            assert!(!r.has_remaining());
        }
    }

    #[test]
    fn string_truncates_to_max_len() {
        let mut w = PacketWriter::new();
        w.write_str("hello world", 5);
        let bytes = w.into_vec();
        let mut r = PacketReader::new(&bytes);
        assert_eq!(r.read_str(5, "s").unwrap(), "hello");
    }

    #[test]
    fn short_read_errors_instead_of_panicking() {
        let mut r = PacketReader::new(&[1, 2]);
        assert!(r.read_u32("too_short").is_err());
    }
}
