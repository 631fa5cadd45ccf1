//! MDX encoder.
//!
//! Writes exactly the layouts the parser decodes, so any model the parser
//! produced encodes back to an equivalent file. Block lengths are reserved
//! up front and patched once the body is written.

use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::io::Write;

use crate::error::{FormatError, FormatErrorKind, Result, tag_display};
use crate::material::{Layer, Material};
use crate::model::{
    Animation, Attachment, Bone, Extent, Geoset, GeosetAnimation, GeosetAttributes, Helper,
    KeyframeAnimation, KeyframeValue, Light, Model, ModelInfo, Node, ObjectFlag, TargetDomain,
    Texture, id_or_sentinel,
};
use crate::parser::MAGIC;

pub struct MdxWriter {
    buf: Vec<u8>,
}

impl Default for MdxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MdxWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    fn i32(&mut self, value: i32) -> Result<()> {
        self.buf.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    fn f32(&mut self, value: f32) -> Result<()> {
        self.buf.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    fn floats(&mut self, values: &[f32]) -> Result<()> {
        for &v in values {
            self.f32(v)?;
        }
        Ok(())
    }

    fn count(&mut self, n: usize) -> Result<()> {
        let n = i32::try_from(n).map_err(|_| {
            FormatError::new(FormatErrorKind::InvalidRecordSize).with_arg("count", n)
        })?;
        self.i32(n)
    }

    fn tag(&mut self, tag: &[u8; 4]) -> Result<()> {
        self.buf.write_all(tag)?;
        Ok(())
    }

    /// ASCII text NUL-padded to `n` bytes.
    fn fixed_string(&mut self, text: &str, n: usize) -> Result<()> {
        if let Some(bad) = text.bytes().position(|b| !b.is_ascii() || b == 0) {
            return Err(FormatError::new(FormatErrorKind::InvalidEncoding)
                .with_arg("text", text)
                .with_arg("index", bad));
        }
        if text.len() > n {
            return Err(FormatError::new(FormatErrorKind::InvalidEncoding)
                .with_arg("text", text)
                .with_arg("width", n));
        }
        self.buf.write_all(text.as_bytes())?;
        self.buf.resize(self.buf.len() + n - text.len(), 0);
        Ok(())
    }

    fn reserve_length(&mut self) -> usize {
        let at = self.buf.len();
        self.buf.extend_from_slice(&[0; 4]);
        at
    }

    /// Patches the length reserved at `at`; an inclusive length counts its
    /// own four bytes.
    fn patch_length(&mut self, at: usize, inclusive: bool) -> Result<()> {
        let len = self.buf.len() - at - if inclusive { 0 } else { 4 };
        let len = i32::try_from(len).map_err(|_| {
            FormatError::new(FormatErrorKind::InvalidRecordSize).with_arg("size", len)
        })?;
        LittleEndian::write_i32(&mut self.buf[at..at + 4], len);
        Ok(())
    }

    fn section(&mut self, tag: &[u8; 4], f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        self.tag(tag)?;
        let at = self.reserve_length();
        f(self).map_err(|e| e.with_arg("section", tag_display(tag)))?;
        self.patch_length(at, false)
    }

    fn inclusive(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let at = self.reserve_length();
        f(self)?;
        self.patch_length(at, true)
    }

    fn extent(&mut self, extent: &Extent) -> Result<()> {
        self.f32(extent.bounds_radius)?;
        self.floats(&extent.minimum)?;
        self.floats(&extent.maximum)
    }

    fn keyframe_value(&mut self, value: &KeyframeValue) -> Result<()> {
        match value {
            KeyframeValue::Int(v) => self.i32(*v),
            KeyframeValue::Float(v) => self.f32(*v),
            KeyframeValue::Vec3(v) => self.floats(v),
            KeyframeValue::Vec4(v) => self.floats(v),
        }
    }

    fn keyframe_animation(
        &mut self,
        anim: &KeyframeAnimation,
        domains: &[TargetDomain],
    ) -> Result<()> {
        let tag = anim.target.tag();
        if !domains.contains(&anim.target.domain()) {
            return Err(FormatError::new(FormatErrorKind::UnknownAnimationTag)
                .with_arg("tag", tag_display(tag))
                .with_arg("domain", format!("{:?}", domains)));
        }
        let shape = anim.target.value_shape();
        let with_tangents = anim.line_type.has_tangents();

        self.tag(tag)?;
        self.count(anim.keyframes.len())?;
        self.i32(anim.line_type.to_i32())?;
        self.i32(id_or_sentinel(anim.global_sequence_id))?;

        for key in &anim.keyframes {
            let mut values = vec![&key.value];
            if with_tangents {
                let tangents = key.tangents.as_ref().ok_or_else(|| {
                    FormatError::new(FormatErrorKind::InvalidEncoding)
                        .with_arg("tag", tag_display(tag))
                        .with_arg("frame", key.frame)
                        .with_arg("missing", "tangents")
                })?;
                values.push(&tangents.tangent_in);
                values.push(&tangents.tangent_out);
            } else if key.tangents.is_some() {
                return Err(FormatError::new(FormatErrorKind::InvalidEncoding)
                    .with_arg("tag", tag_display(tag))
                    .with_arg("frame", key.frame)
                    .with_arg("line_type", format!("{:?}", anim.line_type))
                    .with_arg("unexpected", "tangents"));
            }
            if let Some(bad) = values.iter().find(|v| v.shape() != shape) {
                return Err(FormatError::new(FormatErrorKind::InvalidEncoding)
                    .with_arg("tag", tag_display(tag))
                    .with_arg("frame", key.frame)
                    .with_arg("expected", format!("{:?}", shape))
                    .with_arg("actual", format!("{:?}", bad.shape())));
            }

            self.i32(key.frame)?;
            for value in values {
                self.keyframe_value(value)?;
            }
        }
        Ok(())
    }

    fn keyframe_animations<'m>(
        &mut self,
        anims: impl IntoIterator<Item = &'m KeyframeAnimation>,
        domains: &[TargetDomain],
    ) -> Result<()> {
        for anim in anims {
            self.keyframe_animation(anim, domains)?;
        }
        Ok(())
    }

    /// Generic object with its object tracks. Tracks from any other domain
    /// are left for the caller to write after the type-specific fields.
    fn node(&mut self, node: &Node) -> Result<()> {
        self.inclusive(|w| {
            w.fixed_string(&node.name, 0x50)?;
            w.i32(node.object_id)?;
            w.i32(id_or_sentinel(node.parent_id))?;
            w.i32(ObjectFlag::to_bits(&node.flags))?;
            w.keyframe_animations(
                node.animations
                    .iter()
                    .filter(|a| a.target.domain() == TargetDomain::Object),
                &[TargetDomain::Object],
            )
        })
    }

    fn object_tracks_only(node: &Node) -> Result<()> {
        match node
            .animations
            .iter()
            .find(|a| a.target.domain() != TargetDomain::Object)
        {
            Some(anim) => Err(FormatError::new(FormatErrorKind::UnknownAnimationTag)
                .with_arg("tag", tag_display(anim.target.tag()))
                .with_arg("node", &node.name)),
            None => Ok(()),
        }
    }

    fn model_info(&mut self, info: &ModelInfo) -> Result<()> {
        self.fixed_string(&info.name, 0x50)?;
        if let Some(file_name) = &info.animation_file_name {
            self.fixed_string(file_name, 0x104)?;
        }
        self.extent(&info.extent)?;
        self.i32(info.blend_time)
    }

    fn sequence(&mut self, sequence: &Animation) -> Result<()> {
        self.fixed_string(&sequence.name, 0x50)?;
        self.i32(sequence.interval.0)?;
        self.i32(sequence.interval.1)?;
        self.f32(sequence.move_speed)?;
        self.i32(sequence.non_looping as i32)?;
        self.f32(sequence.rarity)?;
        self.i32(0)?;
        self.extent(&sequence.extent)
    }

    fn layer(&mut self, layer: &Layer) -> Result<()> {
        self.inclusive(|w| {
            w.i32(layer.filter_mode.to_i32())?;
            w.i32(layer.shading_flags.to_bits())?;
            w.i32(layer.texture_id)?;
            w.i32(layer.texture_animation_id)?;
            w.i32(layer.coord_id)?;
            w.f32(layer.alpha)?;
            w.keyframe_animations(&layer.animations, &[TargetDomain::Material])
        })
    }

    fn material(&mut self, material: &Material) -> Result<()> {
        self.inclusive(|w| {
            w.i32(material.priority_plane)?;
            w.i32(material.flag_bits())?;
            w.tag(b"LAYS")?;
            w.count(material.layers.len())?;
            for layer in &material.layers {
                w.layer(layer)?;
            }
            Ok(())
        })
    }

    fn texture(&mut self, texture: &Texture) -> Result<()> {
        self.i32(texture.replaceable_id)?;
        self.fixed_string(&texture.path, 0x100)?;
        self.i32(0)?;
        self.i32(texture.wrap_bits())
    }

    fn vectors<T>(
        &mut self,
        tag: &[u8; 4],
        items: &[T],
        mut f: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        self.tag(tag)?;
        self.count(items.len())?;
        for item in items {
            f(self, item)?;
        }
        Ok(())
    }

    fn geoset(&mut self, geoset: &Geoset) -> Result<()> {
        self.vectors(b"VRTX", &geoset.vertices, |w, v| w.floats(v))?;
        self.vectors(b"NRMS", &geoset.normals, |w, v| w.floats(v))?;
        self.vectors(b"PTYP", &geoset.faces, |w, p| w.i32(p.primitive_type.to_i32()))?;
        self.vectors(b"PCNT", &geoset.faces, |w, p| w.count(p.indices.len()))?;
        self.tag(b"PVTX")?;
        self.count(geoset.index_count())?;
        for index in geoset.faces.iter().flat_map(|p| &p.indices) {
            self.buf.write_u16::<LittleEndian>(*index)?;
        }
        self.vectors(b"GNDX", &geoset.vertex_groups, |w, g| {
            w.buf.write_u8(*g)?;
            Ok(())
        })?;
        self.vectors(b"MTGC", &geoset.groups, |w, g| w.count(g.len()))?;
        self.tag(b"MATS")?;
        self.count(geoset.groups.iter().map(Vec::len).sum())?;
        for matrix in geoset.groups.iter().flatten() {
            self.i32(*matrix)?;
        }

        self.i32(geoset.attributes.material_id)?;
        self.i32(geoset.attributes.selection_group)?;
        self.i32(if geoset.attributes.selectable {
            0
        } else {
            GeosetAttributes::UNSELECTABLE
        })?;

        self.extent(&geoset.default_extent)?;
        self.count(geoset.extents.len())?;
        for extent in &geoset.extents {
            self.extent(extent)?;
        }

        self.tag(b"UVAS")?;
        self.count(geoset.texture_vertex_sets.len())?;
        for set in &geoset.texture_vertex_sets {
            self.vectors(b"UVBS", set, |w, uv| w.floats(uv))?;
        }
        Ok(())
    }

    fn geoset_animation(&mut self, anim: &GeosetAnimation) -> Result<()> {
        self.f32(anim.alpha)?;
        self.i32(anim.color_animation.to_i32())?;
        self.floats(&anim.color)?;
        self.i32(anim.geoset_id)?;
        self.keyframe_animations(&anim.animations, &[TargetDomain::GeosetAnim])
    }

    fn bone(&mut self, bone: &Bone) -> Result<()> {
        Self::object_tracks_only(&bone.node)?;
        self.node(&bone.node)?;
        self.i32(id_or_sentinel(bone.geoset_id))?;
        self.i32(id_or_sentinel(bone.geoset_animation_id))
    }

    /// Object tracks go inside the node, light tracks after the light
    /// fields.
    fn light(&mut self, light: &Light) -> Result<()> {
        if let Some(anim) = light.node.animations.iter().find(|a| {
            !matches!(a.target.domain(), TargetDomain::Object | TargetDomain::Light)
        }) {
            return Err(FormatError::new(FormatErrorKind::UnknownAnimationTag)
                .with_arg("tag", tag_display(anim.target.tag()))
                .with_arg("node", &light.node.name));
        }
        self.node(&light.node)?;
        self.i32(light.light_type.to_i32())?;
        self.floats(&light.attenuation)?;
        self.floats(&light.color)?;
        self.f32(light.intensity)?;
        self.floats(&light.ambient_color)?;
        self.f32(light.ambient_intensity)?;
        self.keyframe_animations(
            light
                .node
                .animations
                .iter()
                .filter(|a| a.target.domain() == TargetDomain::Light),
            &[TargetDomain::Light],
        )
    }

    fn helper(&mut self, helper: &Helper) -> Result<()> {
        Self::object_tracks_only(&helper.node)?;
        self.node(&helper.node)
    }

    fn attachment(&mut self, attachment: &Attachment) -> Result<()> {
        Self::object_tracks_only(&attachment.node)?;
        self.node(&attachment.node)?;
        self.fixed_string(&attachment.path, Attachment::PATH_LEN)?;
        self.i32(attachment.attachment_id)
    }

    /// Encodes a whole model. Optional sections are written only when they
    /// hold something.
    pub fn write_model(&mut self, model: &Model) -> Result<()> {
        self.tag(MAGIC)?;
        self.section(b"VERS", |w| w.i32(model.version))?;
        self.section(b"MODL", |w| w.model_info(&model.model_info))?;
        self.section(b"SEQS", |w| {
            model.sequences.iter().try_for_each(|s| w.sequence(s))
        })?;
        if !model.global_sequences.is_empty() {
            self.section(b"GLBS", |w| {
                model.global_sequences.iter().try_for_each(|&d| w.i32(d))
            })?;
        }
        self.section(b"MTLS", |w| {
            model.materials.iter().try_for_each(|m| w.material(m))
        })?;
        self.section(b"TEXS", |w| {
            model.textures.iter().try_for_each(|t| w.texture(t))
        })?;
        if !model.texture_animations.is_empty() {
            self.section(b"TXAN", |w| {
                model.texture_animations.iter().try_for_each(|tracks| {
                    w.inclusive(|w| w.keyframe_animations(tracks, &[TargetDomain::TextureAnim]))
                })
            })?;
        }
        self.section(b"GEOS", |w| {
            model
                .geosets
                .iter()
                .try_for_each(|g| w.inclusive(|w| w.geoset(g)))
        })?;
        if !model.geoset_animations.is_empty() {
            self.section(b"GEOA", |w| {
                model
                    .geoset_animations
                    .iter()
                    .try_for_each(|a| w.inclusive(|w| w.geoset_animation(a)))
            })?;
        }
        self.section(b"BONE", |w| model.bones.iter().try_for_each(|b| w.bone(b)))?;
        if !model.lights.is_empty() {
            self.section(b"LITE", |w| {
                model
                    .lights
                    .iter()
                    .try_for_each(|l| w.inclusive(|w| w.light(l)))
            })?;
        }
        if !model.helpers.is_empty() {
            self.section(b"HELP", |w| {
                model.helpers.iter().try_for_each(|h| w.helper(h))
            })?;
        }
        if !model.attachments.is_empty() {
            self.section(b"ATCH", |w| {
                model
                    .attachments
                    .iter()
                    .try_for_each(|a| w.inclusive(|w| w.attachment(a)))
            })?;
        }
        if !model.pivot_points.is_empty() {
            self.section(b"PIVT", |w| {
                model.pivot_points.iter().try_for_each(|p| w.floats(p))
            })?;
        }
        Ok(())
    }
}

/// Encodes `model` into a complete MDX file.
pub fn write(model: &Model) -> Result<Vec<u8>> {
    let mut writer = MdxWriter::new();
    writer.write_model(model)?;
    Ok(writer.into_inner())
}

pub fn write_file(model: &Model, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = write(model)?;
    fs::write(path, bytes).map_err(|e| {
        FormatError::new(FormatErrorKind::Io)
            .with_arg("path", path.display())
            .push_std(e)
    })
}
