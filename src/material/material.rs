use serde::{Deserialize, Serialize};

use super::{FilterMode, ShadingFlags};
use crate::model::KeyframeAnimation;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Material {
    pub priority_plane: i32,
    pub constant_color: bool,
    pub sort_primitives_far_z: bool,
    pub full_resolution: bool,
    pub layers: Vec<Layer>,
}

impl Material {
    pub const CONSTANT_COLOR: i32 = 0x1;
    pub const SORT_PRIMITIVES_FAR_Z: i32 = 0x10;
    pub const FULL_RESOLUTION: i32 = 0x20;

    // i32 size, priority plane, flags
    pub const HEADER_LEN: usize = 12;

    pub fn apply_flag_bits(&mut self, bits: i32) {
        self.constant_color = bits & Self::CONSTANT_COLOR != 0;
        self.sort_primitives_far_z = bits & Self::SORT_PRIMITIVES_FAR_Z != 0;
        self.full_resolution = bits & Self::FULL_RESOLUTION != 0;
    }

    pub fn flag_bits(&self) -> i32 {
        let mut bits = 0;
        if self.constant_color {
            bits |= Self::CONSTANT_COLOR;
        }
        if self.sort_primitives_far_z {
            bits |= Self::SORT_PRIMITIVES_FAR_Z;
        }
        if self.full_resolution {
            bits |= Self::FULL_RESOLUTION;
        }
        bits
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub filter_mode: FilterMode,
    pub shading_flags: ShadingFlags,
    pub texture_id: i32,
    pub texture_animation_id: i32,
    pub coord_id: i32,
    pub alpha: f32,
    /// Material alpha and texture id tracks.
    pub animations: Vec<KeyframeAnimation>,
}

impl Layer {
    // i32 size, filter mode, flags, texture id, tvertex anim id, coord id, alpha
    pub const FIXED_LEN: usize = 28;
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            filter_mode: FilterMode::None,
            shading_flags: ShadingFlags::default(),
            texture_id: 0,
            texture_animation_id: -1,
            coord_id: 0,
            alpha: 1.0,
            animations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_flags() {
        let mut material = Material::default();
        material.apply_flag_bits(0x31);
        assert!(material.constant_color);
        assert!(material.sort_primitives_far_z);
        assert!(material.full_resolution);
        assert_eq!(material.flag_bits(), 0x31);

        material.apply_flag_bits(0x10 | 0x4);
        assert!(!material.constant_color);
        assert!(material.sort_primitives_far_z);
        assert_eq!(material.flag_bits(), 0x10);
    }
}
