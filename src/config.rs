use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::strip::{self, StripOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Per-schema strip options, keyed by schema name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schemas: BTreeMap<String, StripOptions>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Priority: explicit file (DOCSTRIP_CONFIG) or ./docstrip.toml → defaults
        let path = std::env::var("DOCSTRIP_CONFIG").unwrap_or_else(|_| "docstrip.toml".to_string());
        Self::load_from(path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str::<Config>(&contents)
                .map_err(|e| Error::Msg(format!("Failed to parse {}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no strip config found; using defaults");
                Ok(Config::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Msg(e.to_string()))
    }

    pub fn options_for(&self, schema: &str) -> Option<&StripOptions> {
        self.schemas.get(schema)
    }

    /// Install `stripPaths` on `schema` if it is configured. Returns whether it was.
    pub fn apply(&self, schema: &mut Schema) -> bool {
        match self.options_for(schema.name()) {
            Some(options) => {
                schema.plugin(strip::install, Some(options.clone()));
                true
            }
            None => false,
        }
    }
}
