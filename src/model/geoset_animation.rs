use serde::{Deserialize, Serialize};

use super::KeyframeAnimation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorAnimation {
    None,       // 0
    DropShadow, // 1
    Color,      // 2
    Both,       // 3
}

impl ColorAnimation {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::DropShadow),
            2 => Some(Self::Color),
            3 => Some(Self::Both),
            _ => None,
        }
    }

    pub fn to_i32(self) -> i32 {
        self as i32
    }
}

/// Alpha and color animation of one geoset (`GEOA`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeosetAnimation {
    pub alpha: f32,
    pub color_animation: ColorAnimation,
    pub color: [f32; 3],
    pub geoset_id: i32,
    pub animations: Vec<KeyframeAnimation>,
}

impl GeosetAnimation {
    // alpha, color animation, color, geoset id
    pub const FIXED_LEN: usize = 24;
}

impl Default for GeosetAnimation {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            color_animation: ColorAnimation::None,
            color: [1.0, 1.0, 1.0],
            geoset_id: -1,
            animations: Vec::new(),
        }
    }
}
