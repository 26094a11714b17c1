use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The engine refused to open the file at `path`.
    #[error("cannot open file: {path}")]
    Open { path: String },

    /// The engine refused to open an in-memory buffer.
    #[error("cannot open buffer {name:?}")]
    OpenBuffer { name: String },

    /// The session has been torn down.
    #[error("document session is closed")]
    Closed,

    /// A page-scoped operation was issued against a document with no pages.
    #[error("document has no pages")]
    NoPages,

    #[error("engine failure: {0}")]
    Engine(String),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access style file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode style file {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode style: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("unable to resolve platform config directory")]
    NoConfigDir,
}
