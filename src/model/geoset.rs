use serde::{Deserialize, Serialize};

use super::Extent;

/// Primitive type codes of `PTYP`. Models exported by the game only use
/// `Triangles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveType {
    Points,        // 0
    Lines,         // 1
    LineLoop,      // 2
    LineStrip,     // 3
    Triangles,     // 4
    TriangleStrip, // 5
    TriangleFan,   // 6
    Quads,         // 7
    QuadStrip,     // 8
    Polygons,      // 9
}

impl PrimitiveType {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Points),
            1 => Some(Self::Lines),
            2 => Some(Self::LineLoop),
            3 => Some(Self::LineStrip),
            4 => Some(Self::Triangles),
            5 => Some(Self::TriangleStrip),
            6 => Some(Self::TriangleFan),
            7 => Some(Self::Quads),
            8 => Some(Self::QuadStrip),
            9 => Some(Self::Polygons),
            _ => None,
        }
    }

    pub fn to_i32(self) -> i32 {
        self as i32
    }

    /// Vertices per primitive for list types; `None` for strips, fans,
    /// loops and polygons whose index count is unconstrained.
    pub fn arity(self) -> Option<usize> {
        match self {
            Self::Points => Some(1),
            Self::Lines => Some(2),
            Self::Triangles => Some(3),
            Self::Quads => Some(4),
            _ => None,
        }
    }
}

/// One `PTYP`/`PCNT` entry with its share of `PVTX`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitives {
    pub primitive_type: PrimitiveType,
    pub indices: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeosetAttributes {
    pub material_id: i32,
    pub selection_group: i32,
    pub selectable: bool,
}

impl GeosetAttributes {
    // selection flags value the format uses for "unselectable"
    pub const UNSELECTABLE: i32 = 4;
}

impl Default for GeosetAttributes {
    fn default() -> Self {
        Self {
            material_id: 0,
            selection_group: 0,
            selectable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geoset {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<Primitives>,
    pub vertex_groups: Vec<u8>, // GNDX: index into groups for each vertex
    pub groups: Vec<Vec<i32>>,  // MTGC+MATS: bone indices per group
    pub attributes: GeosetAttributes,
    pub default_extent: Extent,
    pub extents: Vec<Extent>, // one per sequence
    pub texture_vertex_sets: Vec<Vec<[f32; 2]>>,
}

impl Geoset {
    /// Total number of indices across all primitive groups.
    pub fn index_count(&self) -> usize {
        self.faces.iter().map(|p| p.indices.len()).sum()
    }

    /// Triangles of every `Triangles` primitive group, in file order.
    pub fn triangles(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.faces
            .iter()
            .filter(|p| p.primitive_type == PrimitiveType::Triangles)
            .flat_map(|p| p.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangles_skip_other_primitive_types() {
        let geoset = Geoset {
            faces: vec![
                Primitives {
                    primitive_type: PrimitiveType::Triangles,
                    indices: vec![0, 1, 2, 2, 1, 3],
                },
                Primitives {
                    primitive_type: PrimitiveType::Lines,
                    indices: vec![0, 1],
                },
            ],
            ..Default::default()
        };
        assert_eq!(geoset.index_count(), 8);
        assert_eq!(geoset.triangles().collect::<Vec<_>>(), vec![[0, 1, 2], [2, 1, 3]]);
    }

    #[test]
    fn primitive_codes_round_trip() {
        for code in 0..10 {
            let ty = PrimitiveType::from_i32(code).unwrap();
            assert_eq!(ty.to_i32(), code);
        }
        assert_eq!(PrimitiveType::from_i32(10), None);
    }
}
