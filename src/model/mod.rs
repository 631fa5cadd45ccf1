mod animation;
mod geoset;
mod geoset_animation;
mod keyframe;
#[allow(clippy::module_inception)]
mod model;
mod skeleton;
mod texture;

pub use animation::*;
pub use geoset::*;
pub use geoset_animation::*;
pub use keyframe::*;
pub use model::*;
pub use skeleton::*;
pub use texture::*;

// Re-export material types from the material module
pub use crate::material::{FilterMode, Layer, Material, ShadingFlags};
