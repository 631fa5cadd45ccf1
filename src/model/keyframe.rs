use serde::{Deserialize, Serialize};

/// Interpolation mode of a keyframe animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineType {
    NoInterpolation, // 0
    Linear,          // 1
    Hermite,         // 2
    Bezier,          // 3
}

impl LineType {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::NoInterpolation),
            1 => Some(Self::Linear),
            2 => Some(Self::Hermite),
            3 => Some(Self::Bezier),
            _ => None,
        }
    }

    pub fn to_i32(self) -> i32 {
        match self {
            Self::NoInterpolation => 0,
            Self::Linear => 1,
            Self::Hermite => 2,
            Self::Bezier => 3,
        }
    }

    /// Hermite and Bezier keys carry an in and an out tangent.
    pub fn has_tangents(self) -> bool {
        matches!(self, Self::Hermite | Self::Bezier)
    }
}

/// Shape of every value (and tangent) stored by an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueShape {
    Int,
    Float,
    Vec3,
    Vec4,
}

impl ValueShape {
    /// Encoded width in bytes.
    pub fn byte_len(self) -> usize {
        match self {
            Self::Int | Self::Float => 4,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
        }
    }
}

/// Which part of the model an animation target belongs to. Each kind of
/// record only accepts animations from its own domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetDomain {
    Material,
    TextureAnim,
    GeosetAnim,
    Object,
    Light,
}

/// Animatable property, one per keyframe tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationTarget {
    MaterialAlpha,
    MaterialTextureId,
    TextureAnimTranslation,
    TextureAnimRotation,
    TextureAnimScaling,
    GeosetAnimAlpha,
    GeosetAnimColor,
    ObjectTranslation,
    ObjectRotation,
    ObjectScaling,
    ObjectVisibility,
    LightVisibility,
    LightColor,
    LightIntensity,
    LightAmbientColor,
    LightAmbientIntensity,
    LightAttenuationStart,
    LightAttenuationEnd,
}

impl AnimationTarget {
    pub const ALL: [Self; 18] = [
        Self::MaterialAlpha,
        Self::MaterialTextureId,
        Self::TextureAnimTranslation,
        Self::TextureAnimRotation,
        Self::TextureAnimScaling,
        Self::GeosetAnimAlpha,
        Self::GeosetAnimColor,
        Self::ObjectTranslation,
        Self::ObjectRotation,
        Self::ObjectScaling,
        Self::ObjectVisibility,
        Self::LightVisibility,
        Self::LightColor,
        Self::LightIntensity,
        Self::LightAmbientColor,
        Self::LightAmbientIntensity,
        Self::LightAttenuationStart,
        Self::LightAttenuationEnd,
    ];

    pub fn tag(self) -> &'static [u8; 4] {
        match self {
            Self::MaterialAlpha => b"KMTA",
            Self::MaterialTextureId => b"KMTF",
            Self::TextureAnimTranslation => b"KTAT",
            Self::TextureAnimRotation => b"KTAR",
            Self::TextureAnimScaling => b"KTAS",
            Self::GeosetAnimAlpha => b"KGAO",
            Self::GeosetAnimColor => b"KGAC",
            Self::ObjectTranslation => b"KGTR",
            Self::ObjectRotation => b"KGRT",
            Self::ObjectScaling => b"KGSC",
            Self::ObjectVisibility => b"KATV",
            Self::LightVisibility => b"KLAV",
            Self::LightColor => b"KLAC",
            Self::LightIntensity => b"KLAI",
            Self::LightAmbientColor => b"KLBC",
            Self::LightAmbientIntensity => b"KLBI",
            Self::LightAttenuationStart => b"KLAS",
            Self::LightAttenuationEnd => b"KLAE",
        }
    }

    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|target| target.tag() == tag)
    }

    pub fn value_shape(self) -> ValueShape {
        match self {
            Self::MaterialTextureId => ValueShape::Int,
            Self::MaterialAlpha
            | Self::GeosetAnimAlpha
            | Self::ObjectVisibility
            | Self::LightVisibility
            | Self::LightIntensity
            | Self::LightAmbientIntensity
            | Self::LightAttenuationStart
            | Self::LightAttenuationEnd => ValueShape::Float,
            Self::TextureAnimTranslation
            | Self::TextureAnimScaling
            | Self::GeosetAnimColor
            | Self::ObjectTranslation
            | Self::ObjectScaling
            | Self::LightColor
            | Self::LightAmbientColor => ValueShape::Vec3,
            Self::TextureAnimRotation | Self::ObjectRotation => ValueShape::Vec4,
        }
    }

    pub fn domain(self) -> TargetDomain {
        match self {
            Self::MaterialAlpha | Self::MaterialTextureId => TargetDomain::Material,
            Self::TextureAnimTranslation | Self::TextureAnimRotation | Self::TextureAnimScaling => {
                TargetDomain::TextureAnim
            }
            Self::GeosetAnimAlpha | Self::GeosetAnimColor => TargetDomain::GeosetAnim,
            Self::ObjectTranslation
            | Self::ObjectRotation
            | Self::ObjectScaling
            | Self::ObjectVisibility => TargetDomain::Object,
            Self::LightVisibility
            | Self::LightColor
            | Self::LightIntensity
            | Self::LightAmbientColor
            | Self::LightAmbientIntensity
            | Self::LightAttenuationStart
            | Self::LightAttenuationEnd => TargetDomain::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KeyframeValue {
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

impl KeyframeValue {
    pub fn shape(&self) -> ValueShape {
        match self {
            Self::Int(_) => ValueShape::Int,
            Self::Float(_) => ValueShape::Float,
            Self::Vec3(_) => ValueShape::Vec3,
            Self::Vec4(_) => ValueShape::Vec4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tangents {
    pub tangent_in: KeyframeValue,
    pub tangent_out: KeyframeValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: i32,
    pub value: KeyframeValue,
    // None unless the owning animation is Hermite or Bezier
    pub tangents: Option<Tangents>,
}

impl Keyframe {
    pub fn tangent_in(&self) -> Option<&KeyframeValue> {
        self.tangents.as_ref().map(|t| &t.tangent_in)
    }

    pub fn tangent_out(&self) -> Option<&KeyframeValue> {
        self.tangents.as_ref().map(|t| &t.tangent_out)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeAnimation {
    pub target: AnimationTarget,
    pub line_type: LineType,
    /// `None` plays on the local sequence timeline.
    pub global_sequence_id: Option<i32>,
    pub keyframes: Vec<Keyframe>,
}

impl KeyframeAnimation {
    pub fn new(
        target: AnimationTarget,
        line_type: LineType,
        global_sequence_id: Option<i32>,
    ) -> Self {
        Self {
            target,
            line_type,
            global_sequence_id,
            keyframes: Vec::new(),
        }
    }

    /// Encoded size: tag, 12-byte header and every key record.
    pub fn byte_len(&self) -> usize {
        let shape = self.target.value_shape().byte_len();
        let key = if self.line_type.has_tangents() {
            4 + 3 * shape
        } else {
            4 + shape
        };
        16 + key * self.keyframes.len()
    }
}
