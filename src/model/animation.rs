use serde::{Deserialize, Serialize};

/// Bounding sphere radius plus axis-aligned box, laid out as `f, 3f, 3f`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub bounds_radius: f32,
    pub minimum: [f32; 3],
    pub maximum: [f32; 3],
}

impl Extent {
    pub const BYTE_LEN: usize = 28;
}

/// A named sequence of the model's timeline (`SEQS`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    /// Start and end frame.
    pub interval: (i32, i32),
    pub move_speed: f32,
    pub non_looping: bool,
    pub rarity: f32,
    pub extent: Extent,
}

impl Animation {
    // 80s name, 2i interval, f move speed, i flags, f rarity, 4 pad, extent
    pub const BYTE_LEN: usize = 0x50 + 13 * 4;
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            name: String::new(),
            interval: (0, 0),
            move_speed: 0.0,
            non_looping: false,
            rarity: 0.0,
            extent: Extent::default(),
        }
    }
}
