//! Layered configuration: built-in defaults, an optional TOML file,
//! `CCEXTRACT_*` environment variables, then command-line overrides.

use std::path::{Path, PathBuf};

use ccextract_fs::{OverwritePolicy, PermissionMode};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::copy::{CopyOptions, DEFAULT_BUFFER_SIZE};
use crate::identifier::IdScheme;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "ccextract.toml";
pub const ENV_PREFIX: &str = "CCEXTRACT_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    Missing(PathBuf),

    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Figment(Box::new(e))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    pub force: bool,
    pub catalog: Option<PathBuf>,
    pub indirect_scheme: String,
    pub file_scheme: String,
    pub verify: bool,
    pub sync: bool,
    pub buffer_size: usize,
    pub file_mode: u32,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            force: false,
            catalog: None,
            indirect_scheme: "copycat-id".to_string(),
            file_scheme: "ncbi-file".to_string(),
            verify: true,
            sync: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            file_mode: 0o640,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the config file, then the environment.
    ///
    /// An explicit `path` must exist; the implicit `ccextract.toml` is only
    /// read when present.
    pub fn figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) if !path.is_file() => return Err(ConfigError::Missing(path.to_path_buf())),
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE)),
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::Invalid("buffer_size must be greater than zero".into()));
        }
        if self.indirect_scheme.trim().is_empty() || self.file_scheme.trim().is_empty() {
            return Err(ConfigError::Invalid("scheme names must not be empty".into()));
        }
        if self.indirect_scheme == self.file_scheme {
            return Err(ConfigError::Invalid(format!(
                "indirect and file schemes are both '{}'",
                self.file_scheme
            )));
        }
        if self.file_mode > 0o7777 {
            return Err(ConfigError::Invalid(format!("file_mode {:o} is not a permission mode", self.file_mode)));
        }
        Ok(())
    }

    pub fn scheme(&self) -> IdScheme {
        IdScheme::new(&self.indirect_scheme, &self.file_scheme)
    }

    pub fn copy_options(&self) -> CopyOptions {
        CopyOptions {
            policy: OverwritePolicy::from_force(self.force),
            buffer_size: self.buffer_size,
            file_mode: PermissionMode::custom(self.file_mode),
            verify: self.verify,
            sync: self.sync,
        }
    }
}
