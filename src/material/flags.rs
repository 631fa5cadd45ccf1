use serde::{Deserialize, Serialize};

/// Layer shading flags, unpacked from one bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShadingFlags {
    pub unshaded: bool,
    pub sphere_env_map: bool,
    pub two_sided: bool,
    pub unfogged: bool,
    pub no_depth_test: bool,
    pub no_depth_set: bool,
}

impl ShadingFlags {
    pub const UNSHADED: i32 = 0x1;
    pub const SPHERE_ENV_MAP: i32 = 0x2;
    pub const TWO_SIDED: i32 = 0x10;
    pub const UNFOGGED: i32 = 0x20;
    pub const NO_DEPTH_TEST: i32 = 0x40;
    pub const NO_DEPTH_SET: i32 = 0x80;

    pub fn from_bits(bits: i32) -> Self {
        Self {
            unshaded: bits & Self::UNSHADED != 0,
            sphere_env_map: bits & Self::SPHERE_ENV_MAP != 0,
            two_sided: bits & Self::TWO_SIDED != 0,
            unfogged: bits & Self::UNFOGGED != 0,
            no_depth_test: bits & Self::NO_DEPTH_TEST != 0,
            no_depth_set: bits & Self::NO_DEPTH_SET != 0,
        }
    }

    pub fn to_bits(&self) -> i32 {
        let mut bits = 0;
        for (set, bit) in [
            (self.unshaded, Self::UNSHADED),
            (self.sphere_env_map, Self::SPHERE_ENV_MAP),
            (self.two_sided, Self::TWO_SIDED),
            (self.unfogged, Self::UNFOGGED),
            (self.no_depth_test, Self::NO_DEPTH_TEST),
            (self.no_depth_set, Self::NO_DEPTH_SET),
        ] {
            if set {
                bits |= bit;
            }
        }
        bits
    }
}
