//! Errors reported while building routing tables or loading configuration.
//!
//! Only construction-time misconfiguration surfaces as an error. Anything that
//! goes wrong while a request is being dispatched is turned into a response
//! by the handler itself (see [`handler::responses`](crate::handler::responses)).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    /// A host or path pattern is not a valid regular expression.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A network range is neither a CIDR block nor a single address.
    #[error("invalid network range {0:?}")]
    InvalidRange(String),

    /// A filesystem path given to `file` or `mount` cannot be made absolute.
    #[error("invalid filesystem path {path:?}: {source}")]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
