use crate::error::{Error, Result};
use crate::sink::SinkTarget;
use m4akit_esds::CookieLayout;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Settings read from a TOML file. Every field is optional.
///
/// ```toml
/// log = "m4akit=debug"
///
/// [cookie]
/// layout = "flagged"
///
/// [output]
/// path = "out.aac"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log: Option<String>,
    pub cookie: CookieConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CookieConfig {
    pub layout: CookieLayout,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// File path, or `-` for standard output.
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "-".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn target(&self) -> Result<SinkTarget> {
        self.path.parse()
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }
}

impl std::str::FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }
}
