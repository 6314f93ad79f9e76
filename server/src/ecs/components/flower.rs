bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct FaceFlags: u8 {
        const SMILE = 0b0000_0001;
        const ANGRY = 0b0000_0010;
        const DEAD  = 0b0000_0100;
        const HURT  = 0b0000_1000;
    }
}

/// The player-controlled avatar (§3 Flower, §GLOSSARY).
#[derive(Debug, Clone, Copy)]
pub struct Flower {
    pub level: u32,
    pub dead: bool,
    pub face_flags: FaceFlags,
    pub crest_count: u32,
    pub third_eye_count: u32,
}

impl Default for Flower {
    fn default() -> Self {
        Self {
            level: 1,
            dead: false,
            face_flags: FaceFlags::SMILE,
            crest_count: 0,
            third_eye_count: 0,
        }
    }
}
