//! Decoder for the binary MDX model format (version 800): a tagged,
//! length-prefixed container of model info, sequences, materials, textures,
//! geosets, geoset animations and a node hierarchy with keyframe tracks.
//!
//! ```no_run
//! let model = mdx_rs::load_file("Footman.mdx")?;
//! println!("{} geosets", model.geosets.len());
//! # Ok::<(), mdx_rs::FormatError>(())
//! ```

pub mod error;
pub mod material;
pub mod model;
pub mod parser;
pub mod settings;
pub mod writer;

pub use error::{FormatError, FormatErrorKind};
pub use model::Model;
pub use parser::{Loader, load, load_file};
pub use settings::LoaderSettings;

pub const CONFY_APP_NAME: &str = "mdx-rs";
