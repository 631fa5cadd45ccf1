use serde::{Deserialize, Serialize};

/// Filter mode for material layers
/// Binary values:
/// 0 = None
/// 1 = Transparent
/// 2 = Blend
/// 3 = Additive
/// 4 = AddAlpha
/// 5 = Modulate
/// 6 = Modulate2x
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterMode {
    None,        // 0
    Transparent, // 1
    Blend,       // 2
    Additive,    // 3
    AddAlpha,    // 4
    Modulate,    // 5
    Modulate2x,  // 6
}

impl FilterMode {
    /// Parse FilterMode from its binary value
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Transparent),
            2 => Some(Self::Blend),
            3 => Some(Self::Additive),
            4 => Some(Self::AddAlpha),
            5 => Some(Self::Modulate),
            6 => Some(Self::Modulate2x),
            _ => None,
        }
    }

    pub fn to_i32(self) -> i32 {
        self as i32
    }
}
