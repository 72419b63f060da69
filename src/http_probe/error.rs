use thiserror::Error;

/// Invalid input to the probe itself. Raised before any request is sent.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no encoding variants supplied, nothing to probe")]
    NoVariants,

    #[error("missing base URL argument")]
    MissingUrl,

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to read config file {path}: {source}")]
    ConfigFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in config file {path}: {source}")]
    ConfigYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidSetting {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// A fault that prevented an HTTP response from being received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(CANCELLED)
    }
}

/// Message recorded for probes stopped by the overall deadline.
pub const CANCELLED: &str = "cancelled";

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(super::report(&err))
    }
}
