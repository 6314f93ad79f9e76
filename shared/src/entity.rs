//! Wire representation of an entity handle.
//!
//! The simulation's own `Entity` (server crate) is `(index: u32, generation:
//! u32)` for headroom; on the wire it is truncated to the 16+16 layout
//! `spec.md` §3 specifies (`(index:16, generation:16)`), which is plenty for
//! `MAX_ENTITIES = 16_384`.

use crate::codec::{PacketReader, PacketWriter};
use crate::error::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireEntity {
    pub index: u16,
    pub generation: u16,
}

impl WireEntity {
    pub const NULL: WireEntity = WireEntity { index: 0, generation: 0 };

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    pub fn write(&self, w: &mut PacketWriter) {
        w.write_u16(self.index);
        w.write_u16(self.generation);
    }

    pub fn read(r: &mut PacketReader) -> Result<Self, ProtocolError> {
        Ok(Self {
            index: r.read_u16("entity.index")?,
            generation: r.read_u16("entity.generation")?,
        })
    }
}
