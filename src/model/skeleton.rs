use serde::{Deserialize, Serialize};

use super::KeyframeAnimation;

/// Bits of the generic object flags field. Higher bits encode the object
/// type and are not represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectFlag {
    DontInheritTranslation = 0x1,
    DontInheritRotation = 0x2,
    DontInheritScaling = 0x4,
    Billboarded = 0x8,
    BillboardedLockX = 0x10,
    BillboardedLockY = 0x20,
    BillboardedLockZ = 0x40,
    CameraAnchored = 0x80,
}

impl ObjectFlag {
    pub const ALL: [Self; 8] = [
        Self::DontInheritTranslation,
        Self::DontInheritRotation,
        Self::DontInheritScaling,
        Self::Billboarded,
        Self::BillboardedLockX,
        Self::BillboardedLockY,
        Self::BillboardedLockZ,
        Self::CameraAnchored,
    ];

    /// Get all flags present in the bitfield, ignoring undefined bits
    pub fn from_bits(bits: i32) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|flag| bits & *flag as i32 != 0)
            .collect()
    }

    /// Convert array of flags back to bitfield
    pub fn to_bits(flags: &[Self]) -> i32 {
        flags.iter().fold(0, |bits, flag| bits | *flag as i32)
    }
}

/// Shared shape of every hierarchical scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub object_id: i32,
    pub parent_id: Option<i32>, // stored as -1 when absent
    pub flags: Vec<ObjectFlag>,
    pub animations: Vec<KeyframeAnimation>,
}

impl Node {
    // i32 size, 80s name, object id, parent id, flags
    pub const HEADER_LEN: usize = 96;

    pub fn has_flag(&self, flag: ObjectFlag) -> bool {
        self.flags.contains(&flag)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_id: 0,
            parent_id: None,
            flags: Vec::new(),
            animations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bone {
    pub node: Node,
    pub geoset_id: Option<i32>,
    pub geoset_animation_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightType {
    Omnidirectional, // 0
    Directional,     // 1
    Ambient,         // 2
}

impl LightType {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Omnidirectional),
            1 => Some(Self::Directional),
            2 => Some(Self::Ambient),
            _ => None,
        }
    }

    pub fn to_i32(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub node: Node,
    pub light_type: LightType,
    /// Attenuation start and end.
    pub attenuation: [f32; 2],
    pub color: [f32; 3],
    pub intensity: f32,
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
}

impl Light {
    // type, attenuation, color, intensity, ambient color, ambient intensity
    pub const FIXED_LEN: usize = 44;
}

impl Default for Light {
    fn default() -> Self {
        Self {
            node: Node::default(),
            light_type: LightType::Omnidirectional,
            attenuation: [0.0, 0.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Helper {
    pub node: Node,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attachment {
    pub node: Node,
    pub path: String,
    pub attachment_id: i32,
}

impl Attachment {
    pub const PATH_LEN: usize = 0x104;
    // path, i32 attachment id
    pub const FIXED_LEN: usize = Self::PATH_LEN + 4;
}

/// Maps the format's `-1` "none" sentinel to `None`.
pub fn optional_id(raw: i32) -> Option<i32> {
    (raw != -1).then_some(raw)
}

pub fn id_or_sentinel(id: Option<i32>) -> i32 {
    id.unwrap_or(-1)
}
