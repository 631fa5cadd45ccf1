use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Texture {
    pub replaceable_id: i32, // 0 = normal texture, 1 = team color, 2 = team glow, etc.
    pub path: String,
    pub wrap_width: bool,
    pub wrap_height: bool,
}

impl Texture {
    // i32 replaceable id, 256s path, 4 pad, i32 flags
    pub const BYTE_LEN: usize = 0x100 + 3 * 4;

    pub fn from_wrap_bits(replaceable_id: i32, path: String, bits: i32) -> Self {
        Self {
            replaceable_id,
            path,
            wrap_width: bits & 0x1 != 0,
            wrap_height: bits & 0x2 != 0,
        }
    }

    pub fn wrap_bits(&self) -> i32 {
        (self.wrap_width as i32) | ((self.wrap_height as i32) << 1)
    }
}
