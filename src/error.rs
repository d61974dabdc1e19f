use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    #[error("Could not list directory '{path}': {source}")]
    Enumeration {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No folder is open")]
    NoFolderOpen,

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("TOML Parsing Error: Path '{path}', Error: {message}")]
    TomlParse { path: PathBuf, message: String },

    #[error("TOML Serialization Error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    Enumeration,
    Read,
}

/// A non-fatal failure surfaced to the caller. The affected subtree or file
/// was skipped and the operation carried on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub path: String,
    pub message: String,
}

impl Warning {
    /// Converts a skip-and-continue error into a warning. Errors that are not
    /// enumeration or read failures are reported as read warnings against
    /// `fallback_path`.
    pub fn from_error(err: &CoreError, fallback_path: &str) -> Self {
        match err {
            CoreError::Enumeration { path, .. } => Warning {
                kind: WarningKind::Enumeration,
                path: path.clone(),
                message: err.to_string(),
            },
            CoreError::Read { path, .. } => Warning {
                kind: WarningKind::Read,
                path: path.clone(),
                message: err.to_string(),
            },
            other => Warning {
                kind: WarningKind::Read,
                path: fallback_path.to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
