use log::debug;

use crate::error::{FormatError, FormatErrorKind, Result};
use crate::material::{FilterMode, Layer, Material, ShadingFlags};
use crate::model::{
    Animation, Attachment, ColorAnimation, GeosetAnimation, Light, Model, ModelInfo, Node,
    Texture,
};
use crate::parser::block::BlockReader;
use crate::parser::geoset::{decode_geoset, read_extent};
use crate::parser::keyframe::{GEOSET_ANIM, MATERIAL, TEXTURE_ANIM, decode_keyframe_run};
use crate::parser::node::{decode_attachment, decode_bone, decode_helper, decode_light};

// Every reader below runs with the section's block as the active source.

pub(crate) fn read_version(reader: &mut BlockReader) -> Result<i32> {
    reader.read_i32()
}

pub(crate) fn read_model_info(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    let long_layout = reader.remaining() >= ModelInfo::LONG_LEN;
    let name = reader.read_fixed_string(0x50)?;
    let animation_file_name = if long_layout {
        Some(reader.read_fixed_string(0x104)?)
    } else {
        None
    };
    let extent = read_extent(reader)?;
    let blend_time = reader.read_i32()?;

    debug!("Model name: {}", name);
    model.model_info = ModelInfo {
        name,
        animation_file_name,
        extent,
        blend_time,
    };
    Ok(())
}

pub(crate) fn read_sequences(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    let count = reader.record_count(Animation::BYTE_LEN)?;

    for _ in 0..count {
        let name = reader.read_fixed_string(0x50)?;
        let start_frame = reader.read_i32()?;
        let end_frame = reader.read_i32()?;
        let move_speed = reader.read_f32()?;
        let non_looping_flag = reader.read_i32()?;
        let rarity = reader.read_f32()?;
        // sync point, unused
        reader.skip(4)?;
        let extent = read_extent(reader)?;

        model.sequences.push(Animation {
            name,
            interval: (start_frame, end_frame),
            move_speed,
            non_looping: non_looping_flag != 0,
            rarity,
            extent,
        });
    }

    debug!("Loaded {} sequences", model.sequences.len());
    Ok(())
}

pub(crate) fn read_global_sequences(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    let count = reader.record_count(4)?;
    for _ in 0..count {
        model.global_sequences.push(reader.read_i32()?);
    }
    debug!("Loaded {} global sequences", model.global_sequences.len());
    Ok(())
}

fn read_layer(reader: &mut BlockReader, body_len: usize) -> Result<Layer> {
    let mode_offset = reader.offset();
    let filter_mode_val = reader.read_i32()?;
    let filter_mode = FilterMode::from_i32(filter_mode_val).ok_or_else(|| {
        FormatError::new(FormatErrorKind::InvalidEnumValue)
            .at(mode_offset)
            .with_arg("field", "filter mode")
            .with_arg("value", filter_mode_val)
    })?;
    let shading_flags = ShadingFlags::from_bits(reader.read_i32()?);
    let texture_id = reader.read_i32()?;
    let texture_animation_id = reader.read_i32()?;
    let coord_id = reader.read_i32()?;
    let alpha = reader.read_f32()?;

    // KMTA / KMTF tracks fill the rest of the layer
    let animations = decode_keyframe_run(reader, Layer::FIXED_LEN - 4, body_len, MATERIAL)?;

    Ok(Layer {
        filter_mode,
        shading_flags,
        texture_id,
        texture_animation_id,
        coord_id,
        alpha,
        animations,
    })
}

/// The `LAYS` sub-block nested in a material: a count, then that many
/// inclusive-size layers.
fn read_layers(reader: &mut BlockReader) -> Result<Vec<Layer>> {
    reader.read_tag(b"LAYS")?;
    let layers_count = reader.read_length()?;
    let mut layers = Vec::new();

    for _ in 0..layers_count {
        let offset = reader.offset();
        let layer_size = reader.read_length()?;
        if layer_size < Layer::FIXED_LEN {
            return Err(FormatError::new(FormatErrorKind::InvalidRecordSize)
                .at(offset)
                .with_arg("size", layer_size)
                .with_arg("minimum", Layer::FIXED_LEN));
        }
        let body = reader.take_source(layer_size - 4)?;
        layers.push(reader.scoped(body, |r| read_layer(r, layer_size - 4))?);
    }

    Ok(layers)
}

pub(crate) fn read_materials(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    reader.read_inclusive_records(Material::HEADER_LEN, |r, _| {
        let mut material = Material {
            priority_plane: r.read_i32()?,
            ..Default::default()
        };
        material.apply_flag_bits(r.read_i32()?);
        material.layers = read_layers(r)?;
        model.materials.push(material);
        Ok(())
    })?;

    debug!("Loaded {} materials", model.materials.len());
    Ok(())
}

pub(crate) fn read_textures(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    let count = reader.record_count(Texture::BYTE_LEN)?;

    for _ in 0..count {
        let replaceable_id = reader.read_i32()?;
        let path = reader.read_fixed_string(0x100)?;
        // Skip padding (4 bytes)
        reader.skip(4)?;
        let flags = reader.read_i32()?;

        model
            .textures
            .push(Texture::from_wrap_bits(replaceable_id, path, flags));
    }

    debug!("Loaded {} textures", model.textures.len());
    Ok(())
}

pub(crate) fn read_texture_animations(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    reader.read_inclusive_records(4, |r, body_len| {
        let tracks = decode_keyframe_run(r, 0, body_len, TEXTURE_ANIM)?;
        model.texture_animations.push(tracks);
        Ok(())
    })?;

    debug!("Loaded {} texture animations", model.texture_animations.len());
    Ok(())
}

pub(crate) fn read_geosets(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    reader.read_inclusive_records(4, |r, _| {
        let geoset = decode_geoset(r)?;
        debug!(
            "  Geoset {}: {} vertices, {} primitive groups, {} vertex groups, {} matrix groups",
            model.geosets.len(),
            geoset.vertices.len(),
            geoset.faces.len(),
            geoset.vertex_groups.len(),
            geoset.groups.len()
        );
        model.geosets.push(geoset);
        Ok(())
    })?;

    debug!("Loaded {} geosets", model.geosets.len());
    Ok(())
}

pub(crate) fn read_geoset_animations(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    reader.read_inclusive_records(GeosetAnimation::FIXED_LEN + 4, |r, body_len| {
        let alpha = r.read_f32()?;
        let mode_offset = r.offset();
        let mode = r.read_i32()?;
        let color_animation = ColorAnimation::from_i32(mode).ok_or_else(|| {
            FormatError::new(FormatErrorKind::InvalidEnumValue)
                .at(mode_offset)
                .with_arg("field", "color animation")
                .with_arg("value", mode)
        })?;
        let color = r.read_f32_array()?;
        let geoset_id = r.read_i32()?;
        let animations =
            decode_keyframe_run(r, GeosetAnimation::FIXED_LEN, body_len, GEOSET_ANIM)?;

        model.geoset_animations.push(GeosetAnimation {
            alpha,
            color_animation,
            color,
            geoset_id,
            animations,
        });
        Ok(())
    })?;

    debug!("Loaded {} geoset animations", model.geoset_animations.len());
    Ok(())
}

/// Bones are packed back-to-back without an outer record size; each one is
/// a node followed by two ids.
pub(crate) fn read_bones(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    while !reader.is_exhausted() {
        let (_, bone) = decode_bone(reader)?;
        model.bones.push(bone);
    }

    debug!("Loaded {} bones", model.bones.len());
    Ok(())
}

pub(crate) fn read_lights(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    reader.read_inclusive_records(4 + Node::HEADER_LEN + Light::FIXED_LEN, |r, body_len| {
        model.lights.push(decode_light(r, body_len)?);
        Ok(())
    })?;

    debug!("Loaded {} lights", model.lights.len());
    Ok(())
}

pub(crate) fn read_helpers(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    while !reader.is_exhausted() {
        let (_, helper) = decode_helper(reader)?;
        model.helpers.push(helper);
    }

    debug!("Loaded {} helpers", model.helpers.len());
    Ok(())
}

pub(crate) fn read_attachments(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    reader.read_inclusive_records(4 + Node::HEADER_LEN + Attachment::FIXED_LEN, |r, body_len| {
        model.attachments.push(decode_attachment(r, body_len)?);
        Ok(())
    })?;

    debug!("Loaded {} attachments", model.attachments.len());
    Ok(())
}

pub(crate) fn read_pivots(reader: &mut BlockReader, model: &mut Model) -> Result<()> {
    let count = reader.record_count(12)?; // Each pivot point is 3 floats

    for _ in 0..count {
        model.pivot_points.push(reader.read_f32_array()?);
    }

    debug!(
        "Loaded {} pivot points ({} bones + {} helpers)",
        count,
        model.bones.len(),
        model.helpers.len()
    );
    Ok(())
}
