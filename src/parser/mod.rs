mod block;
mod geoset;
mod keyframe;
mod load;
mod node;
#[allow(clippy::module_inception)]
mod parser;

pub use block::{BlockReader, ByteSource};
pub use geoset::decode_geoset;
pub use keyframe::{decode_keyframe_animation, decode_keyframe_run};
pub use load::*;
pub use node::{decode_attachment, decode_bone, decode_helper, decode_light, decode_node};
