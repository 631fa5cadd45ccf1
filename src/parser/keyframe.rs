use log::trace;

use crate::error::{FormatError, FormatErrorKind, Result, tag_display};
use crate::model::{
    AnimationTarget, Keyframe, KeyframeAnimation, KeyframeValue, LineType, Tangents,
    TargetDomain, ValueShape, optional_id,
};
use crate::parser::block::BlockReader;

pub(crate) const MATERIAL: &[TargetDomain] = &[TargetDomain::Material];
pub(crate) const TEXTURE_ANIM: &[TargetDomain] = &[TargetDomain::TextureAnim];
pub(crate) const GEOSET_ANIM: &[TargetDomain] = &[TargetDomain::GeosetAnim];
pub(crate) const OBJECT: &[TargetDomain] = &[TargetDomain::Object];
pub(crate) const LIGHT: &[TargetDomain] = &[TargetDomain::Light];

fn read_value(reader: &mut BlockReader, shape: ValueShape) -> Result<KeyframeValue> {
    Ok(match shape {
        ValueShape::Int => KeyframeValue::Int(reader.read_i32()?),
        ValueShape::Float => KeyframeValue::Float(reader.read_f32()?),
        ValueShape::Vec3 => KeyframeValue::Vec3(reader.read_f32_array()?),
        ValueShape::Vec4 => KeyframeValue::Vec4(reader.read_f32_array()?),
    })
}

/// Decodes one tagged keyframe animation whose target must belong to one of
/// `domains`. Returns the bytes consumed (tag, header and keys) with the
/// animation, so callers walking a block by running offset know where the
/// next record starts.
pub fn decode_keyframe_animation(
    reader: &mut BlockReader,
    domains: &[TargetDomain],
) -> Result<(usize, KeyframeAnimation)> {
    let offset = reader.offset();
    let tag = reader.read_raw_tag()?;
    let target = AnimationTarget::from_tag(&tag)
        .filter(|target| domains.contains(&target.domain()))
        .ok_or_else(|| {
            let expected: Vec<String> = AnimationTarget::ALL
                .into_iter()
                .filter(|target| domains.contains(&target.domain()))
                .map(|target| tag_display(target.tag()))
                .collect();
            FormatError::new(FormatErrorKind::UnknownAnimationTag)
                .at(offset)
                .with_arg("tag", tag_display(&tag))
                .with_arg("expected", expected.join("|"))
        })?;
    let shape = target.value_shape();

    let key_count = reader.read_length()?;
    let line_offset = reader.offset();
    let raw_line_type = reader.read_i32()?;
    let line_type = LineType::from_i32(raw_line_type).ok_or_else(|| {
        FormatError::new(FormatErrorKind::InvalidLineType)
            .at(line_offset)
            .with_arg("line_type", raw_line_type)
    })?;
    let global_sequence_id = optional_id(reader.read_i32()?);

    let with_tangents = line_type.has_tangents();
    let key_len = 4 + shape.byte_len() * if with_tangents { 3 } else { 1 };
    let keys_len = key_count.checked_mul(key_len).unwrap_or(usize::MAX);
    if keys_len > reader.remaining() {
        return Err(FormatError::new(FormatErrorKind::TruncatedInput)
            .at(reader.offset())
            .with_arg("needed", keys_len)
            .with_arg("available", reader.remaining())
            .with_arg("section", tag_display(&tag)));
    }

    let mut anim = KeyframeAnimation::new(target, line_type, global_sequence_id);
    anim.keyframes.reserve(key_count);
    for _ in 0..key_count {
        let frame = reader.read_i32()?;
        let value = read_value(reader, shape)?;
        let tangents = if with_tangents {
            Some(Tangents {
                tangent_in: read_value(reader, shape)?,
                tangent_out: read_value(reader, shape)?,
            })
        } else {
            None
        };
        anim.keyframes.push(Keyframe {
            frame,
            value,
            tangents,
        });
    }

    trace!(
        "{} at {:#x}: {} keys, {:?}, global sequence {:?}",
        tag_display(&tag),
        offset,
        key_count,
        line_type,
        global_sequence_id
    );

    Ok((16 + keys_len, anim))
}

/// Decodes animations while the running offset `start` is below `limit`.
pub fn decode_keyframe_run(
    reader: &mut BlockReader,
    start: usize,
    limit: usize,
    domains: &[TargetDomain],
) -> Result<Vec<KeyframeAnimation>> {
    let mut anims = Vec::new();
    let mut offset = start;
    while offset < limit {
        let (consumed, anim) = decode_keyframe_animation(reader, domains)?;
        anims.push(anim);
        offset += consumed;
    }
    Ok(anims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(tag: &[u8; 4], keys: i32, line_type: i32, global_sequence: i32) -> Vec<u8> {
        let mut bytes = tag.to_vec();
        for v in [keys, line_type, global_sequence] {
            bytes.extend(v.to_le_bytes());
        }
        bytes
    }

    fn floats(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn bezier_rotation_has_quaternion_tangents() {
        let mut bytes = header(b"KGRT", 1, 3, -1);
        bytes.extend(10i32.to_le_bytes());
        bytes.extend(floats(&[0.0, 0.0, 0.0, 1.0]));
        bytes.extend(floats(&[0.1, 0.2, 0.3, 0.4]));
        bytes.extend(floats(&[0.5, 0.6, 0.7, 0.8]));

        let mut reader = BlockReader::new(&bytes);
        let (consumed, anim) = decode_keyframe_animation(&mut reader, OBJECT).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(consumed, anim.byte_len());
        assert_eq!(anim.target, AnimationTarget::ObjectRotation);
        assert_eq!(anim.line_type, LineType::Bezier);
        assert_eq!(anim.global_sequence_id, None);

        let key = &anim.keyframes[0];
        assert_eq!(key.frame, 10);
        assert_eq!(key.value, KeyframeValue::Vec4([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(key.tangent_in(), Some(&KeyframeValue::Vec4([0.1, 0.2, 0.3, 0.4])));
        assert_eq!(key.tangent_out(), Some(&KeyframeValue::Vec4([0.5, 0.6, 0.7, 0.8])));
    }

    #[test]
    fn linear_keys_have_no_tangents() {
        let mut bytes = header(b"KMTF", 2, 1, 0);
        for (frame, texture) in [(0, 3), (100, 4)] {
            bytes.extend(i32::to_le_bytes(frame));
            bytes.extend(i32::to_le_bytes(texture));
        }
        let mut reader = BlockReader::new(&bytes);
        let (consumed, anim) = decode_keyframe_animation(&mut reader, MATERIAL).unwrap();
        assert_eq!(consumed, 16 + 2 * 8);
        assert_eq!(anim.global_sequence_id, Some(0));
        assert!(anim.keyframes.iter().all(|k| k.tangents.is_none()));
        assert_eq!(anim.keyframes[1].value, KeyframeValue::Int(4));
    }

    #[test]
    fn unknown_tag() {
        let bytes = header(b"KXXX", 0, 0, -1);
        let mut reader = BlockReader::new(&bytes);
        let err = decode_keyframe_animation(&mut reader, OBJECT).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::UnknownAnimationTag);
        assert_eq!(err.arg("tag"), Some("KXXX"));
        assert_eq!(err.offset, Some(0));
    }

    #[test]
    fn known_tag_from_the_wrong_domain_is_rejected() {
        let bytes = header(b"KLAV", 0, 0, -1);
        let mut reader = BlockReader::new(&bytes);
        let err = decode_keyframe_animation(&mut reader, MATERIAL).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::UnknownAnimationTag);
        assert_eq!(err.arg("expected"), Some("KMTA|KMTF"));
    }

    #[test]
    fn invalid_line_type() {
        let bytes = header(b"KGAO", 0, 4, -1);
        let mut reader = BlockReader::new(&bytes);
        let err = decode_keyframe_animation(&mut reader, GEOSET_ANIM).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidLineType);
        assert_eq!(err.offset, Some(8));
    }

    #[test]
    fn key_count_beyond_block() {
        let bytes = header(b"KGAC", 1000, 2, -1);
        let mut reader = BlockReader::new(&bytes);
        let err = decode_keyframe_animation(&mut reader, GEOSET_ANIM).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::TruncatedInput);
    }

    #[test]
    fn run_stops_at_limit() {
        let mut bytes = header(b"KTAT", 0, 0, -1);
        bytes.extend(header(b"KTAR", 1, 0, 2));
        bytes.extend(5i32.to_le_bytes());
        bytes.extend(floats(&[0.0, 0.0, 0.0, 1.0]));
        bytes.extend(b"tail");
        let limit = bytes.len() - 4;

        let mut reader = BlockReader::new(&bytes);
        let anims = decode_keyframe_run(&mut reader, 0, limit, TEXTURE_ANIM).unwrap();
        assert_eq!(anims.len(), 2);
        assert_eq!(anims[1].target, AnimationTarget::TextureAnimRotation);
        assert_eq!(anims[1].global_sequence_id, Some(2));
        assert_eq!(reader.remaining(), 4);
    }
}
