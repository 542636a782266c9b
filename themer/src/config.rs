//! Render configuration
//!
//! ```toml
//! locale = "fr"
//! data_paths = ["data"]
//! preload = ["defaults.yml", "site.yml"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::Data;
use crate::error::{Result, ThemerError};
use crate::parser::DEFAULT_LOCALE;

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Locale for `{lang:...}` tags
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Search the data bundled with this crate before `data_paths`
    #[serde(default = "default_true")]
    pub bundled_data: bool,

    /// Directories searched for data files, in order
    #[serde(default)]
    pub data_paths: Vec<PathBuf>,

    /// Data files merged into the context at startup, in order
    #[serde(default)]
    pub preload: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            bundled_data: true,
            data_paths: Vec::new(),
            preload: Vec::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        let content = std::fs::read_to_string(config_path).map_err(|source| ThemerError::ConfigRead {
            path: config_path.to_path_buf(),
            source,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|source| ThemerError::ConfigParse {
            path: config_path.to_path_buf(),
            source,
        })?;

        // relative data paths are relative to the config file
        if let Some(base) = config_path.parent() {
            for path in &mut config.data_paths {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
        Ok(config)
    }

    /// Builds the data context: search paths, preloaded files, then language strings
    pub fn data(&self) -> Result<Data> {
        let mut data = if self.bundled_data { Data::bundled() } else { Data::new() };
        for path in &self.data_paths {
            data.add_path(path);
        }
        for name in &self.preload {
            data.load(name)?;
        }
        data.load_lang(&self.locale)?;
        Ok(data)
    }
}
