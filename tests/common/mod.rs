//! Hand-built MDX files for the integration tests.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Little-endian byte builder.
#[derive(Debug, Clone, Default)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: &[u8; 4]) -> Self {
        self.0.extend_from_slice(tag);
        self
    }

    pub fn i32(mut self, value: i32) -> Self {
        self.0.write_i32::<LittleEndian>(value).unwrap();
        self
    }

    pub fn i32s(self, values: &[i32]) -> Self {
        values.iter().fold(self, |b, &v| b.i32(v))
    }

    pub fn f32s(mut self, values: &[f32]) -> Self {
        for &v in values {
            self.0.write_f32::<LittleEndian>(v).unwrap();
        }
        self
    }

    pub fn u16s(mut self, values: &[u16]) -> Self {
        for &v in values {
            self.0.write_u16::<LittleEndian>(v).unwrap();
        }
        self
    }

    pub fn text(mut self, text: &str, width: usize) -> Self {
        let mut field = text.as_bytes().to_vec();
        field.resize(width, 0);
        self.0.extend(field);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn append(self, other: Bytes) -> Self {
        self.raw(&other.0)
    }

    /// `tag`, exclusive length, body.
    pub fn block(self, tag: &[u8; 4], body: Bytes) -> Self {
        self.tag(tag).i32(body.0.len() as i32).append(body)
    }

    /// Inclusive length, body.
    pub fn inclusive(self, body: Bytes) -> Self {
        self.i32(body.0.len() as i32 + 4).append(body)
    }

    pub fn extent(self, radius: f32) -> Self {
        self.f32s(&[radius, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A keyframe track header followed by already-encoded keys.
pub fn track(tag: &[u8; 4], keys: i32, line_type: i32, global_sequence: i32, body: Bytes) -> Bytes {
    Bytes::new()
        .tag(tag)
        .i32s(&[keys, line_type, global_sequence])
        .append(body)
}

pub fn node(name: &str, object_id: i32, parent: i32, flags: i32, tracks: Bytes) -> Bytes {
    Bytes::new().inclusive(
        Bytes::new()
            .text(name, 0x50)
            .i32s(&[object_id, parent, flags])
            .append(tracks),
    )
}

pub fn model_info(name: &str) -> Bytes {
    Bytes::new().text(name, 0x50).extent(0.0).i32(0)
}

pub fn empty_geoset() -> Bytes {
    let mut bytes = Bytes::new();
    for tag in [b"VRTX", b"NRMS", b"PTYP", b"PCNT", b"PVTX", b"GNDX", b"MTGC", b"MATS"] {
        bytes = bytes.tag(tag).i32(0);
    }
    bytes
        .i32s(&[0, 0, 0])
        .extent(0.0)
        .i32(0)
        .tag(b"UVAS")
        .i32(0)
}

/// Section bodies of one file; optional sections are written only when set.
#[derive(Debug, Clone)]
pub struct ModelFile {
    pub version: i32,
    pub modl: Bytes,
    pub seqs: Bytes,
    pub glbs: Option<Bytes>,
    pub mtls: Bytes,
    pub texs: Bytes,
    pub txan: Option<Bytes>,
    pub geos: Bytes,
    pub geoa: Option<Bytes>,
    pub bone: Bytes,
    pub lite: Option<Bytes>,
    pub tail: Bytes,
}

impl Default for ModelFile {
    /// Named "Test", one empty geoset, everything else empty or absent.
    fn default() -> Self {
        Self {
            version: 800,
            modl: model_info("Test"),
            seqs: Bytes::new(),
            glbs: None,
            mtls: Bytes::new(),
            texs: Bytes::new(),
            txan: None,
            geos: Bytes::new().inclusive(empty_geoset()),
            geoa: None,
            bone: Bytes::new(),
            lite: None,
            tail: Bytes::new(),
        }
    }
}

impl ModelFile {
    pub fn build(self) -> Vec<u8> {
        let mut bytes = Bytes::new()
            .tag(b"MDLX")
            .block(b"VERS", Bytes::new().i32(self.version))
            .block(b"MODL", self.modl)
            .block(b"SEQS", self.seqs);
        if let Some(glbs) = self.glbs {
            bytes = bytes.block(b"GLBS", glbs);
        }
        bytes = bytes.block(b"MTLS", self.mtls).block(b"TEXS", self.texs);
        if let Some(txan) = self.txan {
            bytes = bytes.block(b"TXAN", txan);
        }
        bytes = bytes.block(b"GEOS", self.geos);
        if let Some(geoa) = self.geoa {
            bytes = bytes.block(b"GEOA", geoa);
        }
        bytes = bytes.block(b"BONE", self.bone);
        if let Some(lite) = self.lite {
            bytes = bytes.block(b"LITE", lite);
        }
        bytes.append(self.tail).0
    }
}

pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
