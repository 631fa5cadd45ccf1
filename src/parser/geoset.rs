use log::trace;

use crate::error::{FormatError, FormatErrorKind, Result};
use crate::model::{Extent, Geoset, GeosetAttributes, PrimitiveType, Primitives};
use crate::parser::block::BlockReader;

pub(crate) fn read_extent(reader: &mut BlockReader) -> Result<Extent> {
    Ok(Extent {
        bounds_radius: reader.read_f32()?,
        minimum: reader.read_f32_array()?,
        maximum: reader.read_f32_array()?,
    })
}

fn count_mismatch(offset: usize, what: &str, expected: usize, actual: usize) -> FormatError {
    FormatError::new(FormatErrorKind::CountMismatch)
        .at(offset)
        .with_arg("what", what)
        .with_arg("expected", expected)
        .with_arg("actual", actual)
}

/// Splits `elements` into consecutive runs of the given lengths. The caller
/// guarantees the lengths sum to `elements.len()`.
fn partition<T: Clone>(elements: &[T], counts: &[usize]) -> Vec<Vec<T>> {
    let mut rest = elements;
    counts
        .iter()
        .map(|&n| {
            let (head, tail) = rest.split_at(n);
            rest = tail;
            head.to_vec()
        })
        .collect()
}

fn read_counts(reader: &mut BlockReader, tag: &[u8; 4]) -> Result<Vec<usize>> {
    reader.read_vectors(tag, 4, |r| r.read_length())
}

/// PTYP, PCNT and PVTX: primitive types, index count per primitive, and the
/// flat index list they partition.
fn read_faces(reader: &mut BlockReader) -> Result<Vec<Primitives>> {
    let types = reader.read_vectors(b"PTYP", 4, |r| {
        let offset = r.offset();
        let raw = r.read_i32()?;
        PrimitiveType::from_i32(raw).ok_or_else(|| {
            FormatError::new(FormatErrorKind::InvalidEnumValue)
                .at(offset)
                .with_arg("field", "primitive type")
                .with_arg("value", raw)
        })
    })?;
    let counts_offset = reader.offset();
    let counts = read_counts(reader, b"PCNT")?;
    if counts.len() != types.len() {
        return Err(count_mismatch(counts_offset, "PCNT", types.len(), counts.len()));
    }
    let indices_offset = reader.offset();
    let indices = reader.read_vectors(b"PVTX", 2, |r| r.read_u16())?;
    let total = counts.iter().try_fold(0usize, |acc, &n| acc.checked_add(n));
    if total != Some(indices.len()) {
        return Err(count_mismatch(
            indices_offset,
            "PVTX",
            total.unwrap_or(usize::MAX),
            indices.len(),
        ));
    }

    let mut faces = Vec::with_capacity(types.len());
    for (primitive_type, indices) in types.into_iter().zip(partition(&indices, &counts)) {
        if let Some(arity) = primitive_type.arity() {
            if indices.len() % arity != 0 {
                return Err(
                    count_mismatch(indices_offset, "primitive indices", arity, indices.len())
                        .with_arg("primitive", format!("{primitive_type:?}")),
                );
            }
        }
        faces.push(Primitives {
            primitive_type,
            indices,
        });
    }
    Ok(faces)
}

/// MTGC group sizes and the MATS bone indices they partition.
fn read_groups(reader: &mut BlockReader) -> Result<Vec<Vec<i32>>> {
    let sizes = read_counts(reader, b"MTGC")?;
    let offset = reader.offset();
    let matrices = reader.read_vectors(b"MATS", 4, |r| r.read_i32())?;
    let total = sizes.iter().try_fold(0usize, |acc, &n| acc.checked_add(n));
    if total != Some(matrices.len()) {
        return Err(count_mismatch(
            offset,
            "MATS",
            total.unwrap_or(usize::MAX),
            matrices.len(),
        ));
    }
    Ok(partition(&matrices, &sizes))
}

fn read_attributes(reader: &mut BlockReader) -> Result<GeosetAttributes> {
    let material_id = reader.read_i32()?;
    let selection_group = reader.read_i32()?;
    let selection_flags = reader.read_i32()?;
    Ok(GeosetAttributes {
        material_id,
        selection_group,
        selectable: selection_flags != GeosetAttributes::UNSELECTABLE,
    })
}

/// Decodes one geoset from the body of its inclusive record. Sub-blocks
/// appear in a fixed order.
pub fn decode_geoset(reader: &mut BlockReader) -> Result<Geoset> {
    let offset = reader.offset();
    let vertices = reader.read_vectors(b"VRTX", 12, |r| r.read_f32_array())?;
    let normals = reader.read_vectors(b"NRMS", 12, |r| r.read_f32_array())?;
    let faces = read_faces(reader)?;
    let vertex_groups = reader.read_vectors(b"GNDX", 1, |r| r.read_u8())?;
    let groups = read_groups(reader)?;
    let attributes = read_attributes(reader)?;

    let default_extent = read_extent(reader)?;
    let extent_count = reader.read_length()?;
    if extent_count.saturating_mul(Extent::BYTE_LEN) > reader.remaining() {
        return Err(FormatError::new(FormatErrorKind::TruncatedInput)
            .at(reader.offset())
            .with_arg("needed", extent_count.saturating_mul(Extent::BYTE_LEN))
            .with_arg("available", reader.remaining()));
    }
    let extents = (0..extent_count)
        .map(|_| read_extent(reader))
        .collect::<Result<Vec<_>>>()?;

    reader.read_tag(b"UVAS")?;
    let set_count = reader.read_length()?;
    let mut texture_vertex_sets = Vec::new();
    for _ in 0..set_count {
        texture_vertex_sets.push(reader.read_vectors(b"UVBS", 8, |r| r.read_f32_array())?);
    }

    if !reader.is_exhausted() {
        trace!(
            "geoset at {:#x}: {} bytes past UVAS left undecoded",
            offset,
            reader.remaining()
        );
    }

    Ok(Geoset {
        vertices,
        normals,
        faces,
        vertex_groups,
        groups,
        attributes,
        default_extent,
        extents,
        texture_vertex_sets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Bytes(Vec<u8>);

    impl Bytes {
        fn tag(mut self, tag: &[u8; 4]) -> Self {
            self.0.extend_from_slice(tag);
            self
        }
        fn i32s(mut self, values: &[i32]) -> Self {
            for v in values {
                self.0.extend(v.to_le_bytes());
            }
            self
        }
        fn u16s(mut self, values: &[u16]) -> Self {
            for v in values {
                self.0.extend(v.to_le_bytes());
            }
            self
        }
        fn f32s(mut self, values: &[f32]) -> Self {
            for v in values {
                self.0.extend(v.to_le_bytes());
            }
            self
        }
    }

    fn quad_geoset(pcnt: &[i32], pvtx: &[u16]) -> Vec<u8> {
        Bytes::default()
            .tag(b"VRTX")
            .i32s(&[4])
            .f32s(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0])
            .tag(b"NRMS")
            .i32s(&[4])
            .f32s(&[0.0f32, 0.0, 1.0].repeat(4))
            .tag(b"PTYP")
            .i32s(&[pcnt.len() as i32])
            .i32s(&vec![4; pcnt.len()])
            .tag(b"PCNT")
            .i32s(&[pcnt.len() as i32])
            .i32s(pcnt)
            .tag(b"PVTX")
            .i32s(&[pvtx.len() as i32])
            .u16s(pvtx)
            .tag(b"GNDX")
            .i32s(&[4])
            .i32s(&[0x01000100])
            .tag(b"MTGC")
            .i32s(&[2, 1, 2])
            .tag(b"MATS")
            .i32s(&[3, 0, 1, 2])
            .i32s(&[0, 0, 4])
            .f32s(&[1.5, -1.0, -1.0, 0.0, 1.0, 1.0, 0.0])
            .i32s(&[1])
            .f32s(&[2.0, 0.0, 0.0, 0.0, 2.0, 2.0, 0.0])
            .tag(b"UVAS")
            .i32s(&[1])
            .tag(b"UVBS")
            .i32s(&[4])
            .f32s(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0])
            .0
    }

    #[test]
    fn decodes_every_sub_block() {
        let bytes = quad_geoset(&[6], &[0, 1, 2, 0, 2, 3]);
        let mut reader = BlockReader::new(&bytes);
        let geoset = decode_geoset(&mut reader).unwrap();
        assert!(reader.is_exhausted());

        assert_eq!(geoset.vertices.len(), 4);
        assert_eq!(geoset.normals, vec![[0.0, 0.0, 1.0]; 4]);
        assert_eq!(geoset.faces.len(), 1);
        assert_eq!(geoset.faces[0].primitive_type, PrimitiveType::Triangles);
        assert_eq!(geoset.index_count(), 6);
        assert_eq!(geoset.vertex_groups, vec![0, 1, 0, 1]);
        assert_eq!(geoset.groups, vec![vec![0], vec![1, 2]]);
        assert_eq!(geoset.attributes.material_id, 0);
        assert!(!geoset.attributes.selectable);
        assert_eq!(geoset.default_extent.bounds_radius, 1.5);
        assert_eq!(geoset.extents.len(), 1);
        assert_eq!(geoset.extents[0].maximum, [2.0, 2.0, 0.0]);
        assert_eq!(geoset.texture_vertex_sets.len(), 1);
        assert_eq!(geoset.texture_vertex_sets[0][2], [1.0, 1.0]);
    }

    #[test]
    fn several_primitive_groups_partition_pvtx() {
        let bytes = quad_geoset(&[3, 3], &[0, 1, 2, 0, 2, 3]);
        let mut reader = BlockReader::new(&bytes);
        let geoset = decode_geoset(&mut reader).unwrap();
        assert_eq!(geoset.faces[0].indices, vec![0, 1, 2]);
        assert_eq!(geoset.faces[1].indices, vec![0, 2, 3]);
    }

    #[test]
    fn pvtx_must_match_pcnt_sum() {
        let bytes = quad_geoset(&[6], &[0, 1, 2]);
        let mut reader = BlockReader::new(&bytes);
        let err = decode_geoset(&mut reader).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::CountMismatch);
        assert_eq!(err.arg("what"), Some("PVTX"));
    }

    #[test]
    fn triangle_lists_come_in_threes() {
        let bytes = quad_geoset(&[4], &[0, 1, 2, 3]);
        let mut reader = BlockReader::new(&bytes);
        let err = decode_geoset(&mut reader).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::CountMismatch);
        assert_eq!(err.arg("primitive"), Some("Triangles"));
    }

    #[test]
    fn sub_blocks_are_not_searched() {
        let bytes = Bytes::default().tag(b"NRMS").i32s(&[0]).0;
        let mut reader = BlockReader::new(&bytes);
        let err = decode_geoset(&mut reader).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::UnexpectedTag);
        assert_eq!(err.arg("expected"), Some("VRTX"));
    }

    #[test]
    fn partition_splits_in_order() {
        assert_eq!(
            partition(&[1, 2, 3, 4, 5], &[2, 0, 3]),
            vec![vec![1, 2], vec![], vec![3, 4, 5]]
        );
    }
}
