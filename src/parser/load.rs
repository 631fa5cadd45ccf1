use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::{FormatError, FormatErrorKind, Result, tag_display};
use crate::model::Model;
use crate::parser::block::BlockReader;
use crate::parser::parser::*;
use crate::settings::LoaderSettings;

pub const MAGIC: &[u8; 4] = b"MDLX";

type SectionReader = fn(&mut BlockReader, &mut Model) -> Result<()>;

/// One decode pass over an in-memory MDX file.
pub struct Loader<'a> {
    reader: BlockReader<'a>,
    settings: LoaderSettings,
    model: Model,
}

impl<'a> Loader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_settings(bytes, LoaderSettings::default())
    }

    pub fn with_settings(bytes: &'a [u8], settings: LoaderSettings) -> Self {
        Self {
            reader: BlockReader::new(bytes),
            settings,
            model: Model::default(),
        }
    }

    fn mandatory(&mut self, tag: &[u8; 4], read: SectionReader) -> Result<()> {
        if self.reader.remaining() < 4 {
            return Err(FormatError::new(FormatErrorKind::UnexpectedTag)
                .at(self.reader.offset())
                .with_arg("expected", tag_display(tag))
                .with_arg("actual", "<eof>"));
        }
        self.reader.read_tag(tag)?;
        self.section(tag, read)
    }

    fn optional(&mut self, tag: &[u8; 4], read: SectionReader) -> Result<()> {
        if self.reader.peek_tag_or_absent(tag) {
            self.section(tag, read)
        } else {
            debug!("No {} section", tag_display(tag));
            Ok(())
        }
    }

    /// Runs `read` over the length-prefixed block following an already
    /// consumed tag. The reader then resumes right after the block.
    fn section(&mut self, tag: &[u8; 4], read: SectionReader) -> Result<()> {
        let block = self
            .reader
            .read_length_prefixed_block()
            .map_err(|e| e.with_arg("section", tag_display(tag)))?;
        debug!(
            "Section {} at {:#x}: {} bytes",
            tag_display(tag),
            block.offset(),
            block.len()
        );
        let model = &mut self.model;
        self.reader.scoped(block, |r| read(r, model))
    }

    fn check_magic(&mut self) -> Result<()> {
        match self.reader.read_raw_tag() {
            Ok(tag) if &tag == MAGIC => Ok(()),
            Ok(tag) => Err(FormatError::new(FormatErrorKind::BadMagic)
                .at(0)
                .with_arg("expected", tag_display(MAGIC))
                .with_arg("actual", tag_display(&tag))),
            Err(_) => Err(FormatError::new(FormatErrorKind::BadMagic)
                .at(0)
                .with_arg("expected", tag_display(MAGIC))),
        }
    }

    fn check_version(&mut self) -> Result<()> {
        self.reader.read_tag(b"VERS")?;
        let block = self.reader.read_length_prefixed_block()?;
        let offset = block.offset();
        let version = self.reader.scoped(block, read_version)?;
        if version != self.settings.supported_version {
            return Err(FormatError::new(FormatErrorKind::UnsupportedVersion)
                .at(offset)
                .with_arg("version", version)
                .with_arg("supported", self.settings.supported_version));
        }
        debug!("MDX Version: {}", version);
        self.model.version = version;
        Ok(())
    }

    pub fn load(mut self) -> Result<Model> {
        self.check_magic()?;
        self.check_version()?;

        self.mandatory(b"MODL", read_model_info)?;
        self.mandatory(b"SEQS", read_sequences)?;
        self.optional(b"GLBS", read_global_sequences)?;
        self.mandatory(b"MTLS", read_materials)?;
        self.mandatory(b"TEXS", read_textures)?;
        self.optional(b"TXAN", read_texture_animations)?;
        self.mandatory(b"GEOS", read_geosets)?;
        self.optional(b"GEOA", read_geoset_animations)?;
        self.mandatory(b"BONE", read_bones)?;
        self.optional(b"LITE", read_lights)?;

        if self.settings.decode_trailing_sections {
            self.optional(b"HELP", read_helpers)?;
            self.optional(b"ATCH", read_attachments)?;
            self.optional(b"PIVT", read_pivots)?;
        }

        if !self.reader.is_exhausted() {
            debug!(
                "{} trailing bytes at {:#x} left undecoded",
                self.reader.remaining(),
                self.reader.offset()
            );
        }

        if self.settings.log_summary {
            let m = &self.model;
            info!(
                "Loaded '{}': {} sequences, {} materials, {} textures, {} geosets, \
                 {} bones, {} lights, {} helpers, {} attachments",
                m.model_info.name,
                m.sequences.len(),
                m.materials.len(),
                m.textures.len(),
                m.geosets.len(),
                m.bones.len(),
                m.lights.len(),
                m.helpers.len(),
                m.attachments.len()
            );
        }

        Ok(self.model)
    }
}

/// Decodes a complete MDX file held in memory.
pub fn load(bytes: &[u8]) -> Result<Model> {
    Loader::new(bytes).load()
}

/// Reads and decodes an MDX file from disk.
pub fn load_file(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        FormatError::new(FormatErrorKind::Io)
            .with_arg("path", path.display())
            .push_std(e)
    })?;
    load(&bytes)
}
