//! Commit conventions: which types and scopes are allowed, and how long a
//! header may be.
//!
//! The configuration is a YAML file at the repository root. When there is
//! none, [`Config::default`] describes the usual conventional-commit
//! types.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::commit::validate::AllowedValues;

/// File names searched for, in order, relative to the search root.
pub const CANDIDATE_FILES: &[&str] = &[
    "commit_convention.yaml",
    "commit_convention.yml",
    ".config/commit_convention.yaml",
    ".config/commit_convention.yml",
];

/// Where `--init` writes the default configuration.
pub const DEFAULT_FILE: &str = "commit_convention.yaml";

const DEFAULT_COMMIT_TYPES: &[(&str, &str)] = &[
    ("feat", "adds a new feature"),
    ("fix", "fixes a bug"),
    ("build", "changes the build system or external dependencies"),
    ("chore", "changes that don't touch source or test files"),
    ("ci", "changes CI configuration files and scripts"),
    ("docs", "changes only the documentation"),
    ("perf", "improves performance"),
    ("refactor", "neither fixes a bug nor adds a feature"),
    ("revert", "reverts a previous commit"),
    ("style", "formatting only; no change in meaning"),
    ("test", "adds or corrects tests"),
];

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("could not read config file {path}")]
    #[diagnostic(code(gitcc::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}")]
    #[diagnostic(
        code(gitcc::config::yaml),
        help("expected keys: commit_types, scopes, header_max_length, enforce_max_length")
    )]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("could not render config")]
    #[diagnostic(code(gitcc::config::render))]
    Render(#[source] serde_yaml::Error),

    #[error("{path} already exists")]
    #[diagnostic(
        code(gitcc::config::exists),
        help("edit the existing file or remove it first")
    )]
    AlreadyExists { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Allowed commit types, in the order they should be offered.
    pub commit_types: AllowedValues,
    /// Allowed scopes. An empty table allows no scope at all.
    pub scopes: AllowedValues,
    /// Maximum header width, in terminal columns.
    pub header_max_length: usize,
    /// Whether an over-long header is a validation error.
    pub enforce_max_length: bool,
    /// The file this configuration came from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            commit_types: DEFAULT_COMMIT_TYPES.iter().copied().collect(),
            scopes: AllowedValues::new(),
            header_max_length: 72,
            enforce_max_length: false,
            source: None,
        }
    }
}

impl Config {
    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// The paths [`Config::discover`] checks under `dir`, in order.
    pub fn candidates(dir: &Path) -> Vec<PathBuf> {
        CANDIDATE_FILES.iter().map(|name| dir.join(name)).collect()
    }

    /// Load the first candidate file under `dir`, or fall back to the defaults.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        match Self::candidates(dir).into_iter().find(|p| p.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            None => {
                debug!(dir = %dir.display(), "no config file found; using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::Render)
    }

    /// Write this configuration to `path`, refusing to overwrite a file.
    pub fn write_new(&self, path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        let yaml = self.to_yaml()?;
        fs::write(path, yaml).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
