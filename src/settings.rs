use std::path::Path;

use crate::CONFY_APP_NAME;
use crate::model::Model;

use log::warn;
use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "loader";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// The only `VERS` value accepted.
    pub supported_version: i32,
    /// Decode `HELP`, `ATCH` and `PIVT` after `LITE`.
    pub decode_trailing_sections: bool,
    /// Emit one `info!` line with section counts after each load.
    pub log_summary: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            supported_version: Model::SUPPORTED_VERSION,
            decode_trailing_sections: true,
            log_summary: true,
        }
    }
}

impl LoaderSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, CONFIG_NAME).unwrap_or_else(|e| {
            warn!("Falling back to default loader settings: {}", e);
            Self::default()
        })
    }

    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(CONFY_APP_NAME, CONFIG_NAME, self)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, confy::ConfyError> {
        confy::load_path(path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), confy::ConfyError> {
        confy::store_path(path, self)
    }
}
