use serde::{Deserialize, Serialize};

use crate::material::Material;
use crate::model::animation::{Animation, Extent};
use crate::model::geoset::Geoset;
use crate::model::geoset_animation::GeosetAnimation;
use crate::model::keyframe::KeyframeAnimation;
use crate::model::skeleton::{Attachment, Bone, Helper, Light};
use crate::model::texture::Texture;

/// General information about the model (`MODL`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    /// Only present in the long `MODL` layout written by the game's tools.
    pub animation_file_name: Option<String>,
    pub extent: Extent,
    pub blend_time: i32,
}

impl ModelInfo {
    // 80s name, 260s animation file name, extent, i32 blend time
    pub const LONG_LEN: usize = 0x50 + 0x104 + Extent::BYTE_LEN + 4;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub version: i32,
    pub model_info: ModelInfo,
    pub sequences: Vec<Animation>,
    pub global_sequences: Vec<i32>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub texture_animations: Vec<Vec<KeyframeAnimation>>,
    pub geosets: Vec<Geoset>,
    pub geoset_animations: Vec<GeosetAnimation>,
    pub bones: Vec<Bone>,
    pub lights: Vec<Light>,
    pub helpers: Vec<Helper>,
    pub attachments: Vec<Attachment>,
    pub pivot_points: Vec<[f32; 3]>,
}

impl Model {
    pub const SUPPORTED_VERSION: i32 = 800;
}

impl Default for Model {
    fn default() -> Self {
        Self {
            version: Self::SUPPORTED_VERSION,
            model_info: ModelInfo::default(),
            sequences: Vec::new(),
            global_sequences: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            texture_animations: Vec::new(),
            geosets: Vec::new(),
            geoset_animations: Vec::new(),
            bones: Vec::new(),
            lights: Vec::new(),
            helpers: Vec::new(),
            attachments: Vec::new(),
            pivot_points: Vec::new(),
        }
    }
}
