use log::trace;

use crate::error::{FormatError, FormatErrorKind, Result};
use crate::model::{
    Attachment, Bone, Helper, Light, LightType, Node, ObjectFlag, optional_id,
};
use crate::parser::block::BlockReader;
use crate::parser::keyframe::{LIGHT, OBJECT, decode_keyframe_run};

/// Decodes the generic object: inclusive size, name, ids, flags and the
/// object tracks that fill the rest of the declared size.
///
/// The body is read from a sub-source of exactly `size - 4` bytes, so on
/// return the reader stands at `node start + size` whatever the tracks
/// consumed. Returns `(size, node)`.
pub fn decode_node(reader: &mut BlockReader) -> Result<(usize, Node)> {
    let offset = reader.offset();
    let size = reader.read_length()?;
    if size < Node::HEADER_LEN {
        return Err(FormatError::new(FormatErrorKind::InvalidRecordSize)
            .at(offset)
            .with_arg("size", size)
            .with_arg("minimum", Node::HEADER_LEN));
    }
    let body = reader.take_source(size - 4)?;
    let node = reader.scoped(body, |r| {
        let name = r.read_fixed_string(0x50)?;
        let object_id = r.read_i32()?;
        let parent_id = optional_id(r.read_i32()?);
        let flags = ObjectFlag::from_bits(r.read_i32()?);
        let animations = decode_keyframe_run(r, Node::HEADER_LEN, size, OBJECT)?;
        Ok(Node {
            name,
            object_id,
            parent_id,
            flags,
            animations,
        })
    })?;
    trace!(
        "node '{}' at {:#x}: id {}, parent {:?}, {} tracks",
        node.name,
        offset,
        node.object_id,
        node.parent_id,
        node.animations.len()
    );
    Ok((size, node))
}

/// Node followed by geoset id and geoset animation id, which lie outside
/// the node's declared size.
pub fn decode_bone(reader: &mut BlockReader) -> Result<(usize, Bone)> {
    let (consumed, node) = decode_node(reader)?;
    let geoset_id = optional_id(reader.read_i32()?);
    let geoset_animation_id = optional_id(reader.read_i32()?);
    Ok((
        consumed + 8,
        Bone {
            node,
            geoset_id,
            geoset_animation_id,
        },
    ))
}

pub fn decode_helper(reader: &mut BlockReader) -> Result<(usize, Helper)> {
    let (consumed, node) = decode_node(reader)?;
    Ok((consumed, Helper { node }))
}

/// Reads one light from the body of its inclusive record.
pub fn decode_light(reader: &mut BlockReader, body_len: usize) -> Result<Light> {
    let (consumed, mut node) = decode_node(reader)?;
    debug_assert_eq!(reader.position(), consumed);

    let type_offset = reader.offset();
    let raw_type = reader.read_i32()?;
    let light_type = LightType::from_i32(raw_type).ok_or_else(|| {
        FormatError::new(FormatErrorKind::InvalidEnumValue)
            .at(type_offset)
            .with_arg("field", "light type")
            .with_arg("value", raw_type)
    })?;
    let attenuation = reader.read_f32_array()?;
    let color = reader.read_f32_array()?;
    let intensity = reader.read_f32()?;
    let ambient_color = reader.read_f32_array()?;
    let ambient_intensity = reader.read_f32()?;

    let tracks = decode_keyframe_run(reader, consumed + Light::FIXED_LEN, body_len, LIGHT)?;
    node.animations.extend(tracks);

    Ok(Light {
        node,
        light_type,
        attenuation,
        color,
        intensity,
        ambient_color,
        ambient_intensity,
    })
}

/// Reads one attachment from the body of its inclusive record.
pub fn decode_attachment(reader: &mut BlockReader, body_len: usize) -> Result<Attachment> {
    let (consumed, mut node) = decode_node(reader)?;
    debug_assert_eq!(reader.position(), consumed);

    let path = reader.read_fixed_string(Attachment::PATH_LEN)?;
    let attachment_id = reader.read_i32()?;

    // visibility (KATV) tracks
    let start = consumed + Attachment::FIXED_LEN;
    let tracks = decode_keyframe_run(reader, start, body_len, OBJECT)?;
    node.animations.extend(tracks);

    Ok(Attachment {
        node,
        path,
        attachment_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnimationTarget, KeyframeValue};

    fn node_bytes(name: &str, object_id: i32, parent: i32, flags: i32, tracks: &[u8]) -> Vec<u8> {
        let size = (Node::HEADER_LEN + tracks.len()) as i32;
        let mut bytes = size.to_le_bytes().to_vec();
        let mut field = name.as_bytes().to_vec();
        field.resize(0x50, 0);
        bytes.extend(field);
        for v in [object_id, parent, flags] {
            bytes.extend(v.to_le_bytes());
        }
        bytes.extend_from_slice(tracks);
        bytes
    }

    fn visibility_track(value: f32) -> Vec<u8> {
        let mut bytes = b"KATV".to_vec();
        for v in [1i32, 0, -1, 0] {
            bytes.extend(v.to_le_bytes());
        }
        bytes.extend(value.to_le_bytes());
        bytes
    }

    #[test]
    fn node_header_and_tracks() {
        let bytes = node_bytes("Root", 0, -1, 0x8 | 0x10, &visibility_track(1.0));
        let mut reader = BlockReader::new(&bytes);
        let (consumed, node) = decode_node(&mut reader).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(node.name, "Root");
        assert_eq!(node.parent_id, None);
        assert!(node.has_flag(ObjectFlag::Billboarded));
        assert!(node.has_flag(ObjectFlag::BillboardedLockX));
        assert_eq!(node.animations.len(), 1);
        assert_eq!(node.animations[0].target, AnimationTarget::ObjectVisibility);
        assert_eq!(node.animations[0].keyframes[0].value, KeyframeValue::Float(1.0));
    }

    #[test]
    fn bone_trailing_ids_follow_the_node() {
        let mut bytes = node_bytes("Bone01", 3, 1, 0, &visibility_track(1.0));
        bytes.extend(2i32.to_le_bytes());
        bytes.extend((-1i32).to_le_bytes());
        let mut reader = BlockReader::new(&bytes);
        let (consumed, bone) = decode_bone(&mut reader).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(bone.node.parent_id, Some(1));
        assert_eq!(bone.geoset_id, Some(2));
        assert_eq!(bone.geoset_animation_id, None);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn node_size_bounds_its_tracks() {
        // a track that runs past the declared size cannot borrow bone bytes
        let track = visibility_track(1.0);
        let mut bytes = node_bytes("Bone01", 3, 1, 0, &track[..track.len() - 4]);
        bytes.extend(track[track.len() - 4..].iter());
        bytes.extend(2i32.to_le_bytes());
        let mut reader = BlockReader::new(&bytes);
        let err = decode_bone(&mut reader).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::TruncatedInput);
    }

    #[test]
    fn undersized_node() {
        let bytes = 20i32.to_le_bytes();
        let mut reader = BlockReader::new(&bytes);
        let err = decode_node(&mut reader).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidRecordSize);
    }

    #[test]
    fn light_tracks_join_node_tracks() {
        let mut body = node_bytes("Omni01", 4, -1, 0, &visibility_track(0.0));
        body.extend(0i32.to_le_bytes());
        for v in [80.0f32, 200.0, 1.0, 0.5, 0.25, 2.0, 0.1, 0.2, 0.3, 0.4] {
            body.extend(v.to_le_bytes());
        }
        body.extend(b"KLAI");
        for v in [1i32, 0, -1, 10] {
            body.extend(v.to_le_bytes());
        }
        body.extend(3.5f32.to_le_bytes());

        let len = body.len();
        let mut reader = BlockReader::new(&body);
        let light = decode_light(&mut reader, len).unwrap();
        assert_eq!(light.light_type, LightType::Omnidirectional);
        assert_eq!(light.attenuation, [80.0, 200.0]);
        assert_eq!(light.color, [1.0, 0.5, 0.25]);
        assert_eq!(light.intensity, 2.0);
        assert_eq!(light.ambient_color, [0.1, 0.2, 0.3]);
        assert_eq!(light.ambient_intensity, 0.4);
        let targets: Vec<_> = light.node.animations.iter().map(|a| a.target).collect();
        assert_eq!(
            targets,
            vec![AnimationTarget::ObjectVisibility, AnimationTarget::LightIntensity]
        );
    }

    #[test]
    fn unknown_light_type() {
        let mut body = node_bytes("L", 0, -1, 0, &[]);
        body.extend(7i32.to_le_bytes());
        body.extend([0u8; 40]);
        let len = body.len();
        let mut reader = BlockReader::new(&body);
        let err = decode_light(&mut reader, len).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidEnumValue);
        assert_eq!(err.offset, Some(Node::HEADER_LEN));
    }

    #[test]
    fn attachment_path_and_visibility() {
        let mut body = node_bytes("Origin Ref", 9, -1, 0, &[]);
        let mut path = b"Abilities\\Spells\\Aura.mdl".to_vec();
        path.resize(260, 0);
        body.extend(path);
        body.extend(7i32.to_le_bytes());
        body.extend(visibility_track(1.0));

        let len = body.len();
        let mut reader = BlockReader::new(&body);
        let attachment = decode_attachment(&mut reader, len).unwrap();
        assert_eq!(attachment.path, "Abilities\\Spells\\Aura.mdl");
        assert_eq!(attachment.attachment_id, 7);
        assert_eq!(attachment.node.animations.len(), 1);
        assert!(reader.is_exhausted());
    }
}
