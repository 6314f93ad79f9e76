//! Packet header catalogue (§4.7).
//!
//! Grounded in naia-shared's `connection::packet_type::PacketType` (a plain
//! `#[repr(u8)]` enum read as the first byte of every frame) but split into
//! the two direction-specific enums the spec defines, since client and
//! server headers are disjoint in Rysteria (unlike naia's single shared
//! transport-layer packet type).

use crate::error::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ClientboundHeader {
    Update = 0,
    SquadDump = 1,
    AnimationUpdate = 2,
    SquadFail = 3,
    SquadLeave = 4,
    AccountResult = 5,
    CraftResult = 6,
}

impl ClientboundHeader {
    pub fn from_u8(v: u8) -> Result<Self, ProtocolError> {
        use ClientboundHeader::*;
        Ok(match v {
            0 => Update,
            1 => SquadDump,
            2 => AnimationUpdate,
            3 => SquadFail,
            4 => SquadLeave,
            5 => AccountResult,
            6 => CraftResult,
            other => return Err(ProtocolError::UnknownHeader(other)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServerboundHeader {
    Input = 0,
    PetalSwitch = 1,
    SquadJoin = 2,
    SquadReady = 3,
    SquadUpdate = 4,
    PrivateUpdate = 5,
    ExposeCodeUpdate = 6,
    SquadKick = 7,
    SquadTransferOwnership = 8,
    PetalsCraft = 9,
    Chat = 10,
    ChatBlock = 11,
    DevCheat = 12,
}

impl ServerboundHeader {
    pub fn from_u8(v: u8) -> Result<Self, ProtocolError> {
        use ServerboundHeader::*;
        Ok(match v {
            0 => Input,
            1 => PetalSwitch,
            2 => SquadJoin,
            3 => SquadReady,
            4 => SquadUpdate,
            5 => PrivateUpdate,
            6 => ExposeCodeUpdate,
            7 => SquadKick,
            8 => SquadTransferOwnership,
            9 => PetalsCraft,
            10 => Chat,
            11 => ChatBlock,
            12 => DevCheat,
            other => return Err(ProtocolError::UnknownHeader(other)),
        })
    }
}

/// `squad_fail` reason codes (§6 error taxonomy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SquadFailReason {
    InvalidSquad = 0,
    Full = 1,
    Kicked = 2,
    Afk = 3,
}

/// Account sidecar message tags (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SidecarOutTag {
    LoginReady = 0,
    Logout = 1,
    Persist = 2,
    CraftResultBroadcast = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SidecarInTag {
    SetAlias = 101,
    LoadAccount = 1,
    ForceKick = 2,
}

impl SidecarInTag {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            101 => Some(SidecarInTag::SetAlias),
            1 => Some(SidecarInTag::LoadAccount),
            2 => Some(SidecarInTag::ForceKick),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        for v in 0..=6u8 {
            assert_eq!(ClientboundHeader::from_u8(v).unwrap() as u8, v);
        }
        assert!(ClientboundHeader::from_u8(200).is_err());
    }
}
