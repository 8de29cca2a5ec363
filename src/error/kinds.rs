use std::{fmt, io, time::Duration};

/// Crate-wide `Result` type using [`OrgUsersError`] as the error.
pub type Result<T> = std::result::Result<T, OrgUsersError>;

/// Top-level error type for the export pipeline.
///
/// Every variant is fatal: it is logged once and the process exits with
/// status 1. JSON rendering failures never get here; the exporter recovers
/// them as a [`SerializationError`] on its own.
#[derive(Debug)]
pub enum OrgUsersError {
    /// Bad flags, bad URL, bad config file, or an output file that cannot be created.
    Config(ConfigError),

    /// The database could not be reached, timed out, or the run was cancelled.
    Connectivity(ConnectivityError),

    /// The organization path has no match.
    NotFound(NotFoundError),

    /// A stored document does not map onto the entity types.
    Decode(DecodeError),

    /// Writing the rendered output failed.
    Io(io::Error),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// The assembled connection URI was rejected by the driver.
    InvalidUri { uri: String, reason: String },

    /// Invalid command-line arguments.
    InvalidArguments(String),

    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// The output file could not be created.
    OutputFile { path: String, reason: String },
}

/// Connectivity-specific errors. Each carries the operation it interrupted.
#[derive(Debug)]
pub enum ConnectivityError {
    /// The driver reported a failure.
    QueryFailed {
        operation: &'static str,
        message: String,
    },

    /// The operation did not finish before the pipeline deadline.
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The run was cancelled (Ctrl+C) while the operation was outstanding.
    Cancelled { operation: &'static str },
}

/// No document matched a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundError {
    pub collection: &'static str,
    pub field: &'static str,
    pub value: String,
}

/// A document failed to decode into an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub operation: &'static str,
    pub message: String,
}

/// JSON rendering failed. Recovered locally by the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializationError(pub String);

impl NotFoundError {
    pub fn new(collection: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self {
            collection,
            field,
            value: value.into(),
        }
    }
}

impl DecodeError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

impl ConnectivityError {
    /// Name of the operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            ConnectivityError::QueryFailed { operation, .. }
            | ConnectivityError::Timeout { operation, .. }
            | ConnectivityError::Cancelled { operation } => operation,
        }
    }
}

impl OrgUsersError {
    /// Short machine-friendly name of the error category, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            OrgUsersError::Config(_) => "configuration",
            OrgUsersError::Connectivity(_) => "connectivity",
            OrgUsersError::NotFound(_) => "not_found",
            OrgUsersError::Decode(_) => "decode",
            OrgUsersError::Io(_) => "io",
        }
    }

    /// Operation the error is attached to, when known.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            OrgUsersError::Connectivity(e) => Some(e.operation()),
            OrgUsersError::Decode(e) => Some(e.operation),
            OrgUsersError::NotFound(_) => Some("resolve_org_id"),
            _ => None,
        }
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for OrgUsersError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgUsersError::Config(e) => write!(f, "Configuration error: {e}"),
            OrgUsersError::Connectivity(e) => write!(f, "Connectivity error: {e}"),
            OrgUsersError::NotFound(e) => write!(f, "{e}"),
            OrgUsersError::Decode(e) => write!(f, "Decode error: {e}"),
            OrgUsersError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidUri { uri, reason } => {
                write!(f, "Invalid connection URI '{uri}': {reason}")
            }
            ConfigError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::OutputFile { path, reason } => {
                write!(f, "Cannot create output file '{path}': {reason}")
            }
        }
    }
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectivityError::QueryFailed { operation, message } => {
                write!(f, "{operation} failed: {message}")
            }
            ConnectivityError::Timeout { operation, after } => {
                write!(f, "{operation} timed out after {}s", after.as_secs_f64())
            }
            ConnectivityError::Cancelled { operation } => write!(f, "{operation} cancelled"),
        }
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No document in '{}' with {} '{}'",
            self.collection, self.field, self.value
        )
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.message)
    }
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for OrgUsersError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ConnectivityError {}
impl std::error::Error for NotFoundError {}
impl std::error::Error for DecodeError {}
impl std::error::Error for SerializationError {}

/* ========================= Conversions to OrgUsersError ========================= */

impl From<io::Error> for OrgUsersError {
    fn from(err: io::Error) -> Self {
        OrgUsersError::Io(err)
    }
}

impl From<ConfigError> for OrgUsersError {
    fn from(err: ConfigError) -> Self {
        OrgUsersError::Config(err)
    }
}

impl From<ConnectivityError> for OrgUsersError {
    fn from(err: ConnectivityError) -> Self {
        OrgUsersError::Connectivity(err)
    }
}

impl From<NotFoundError> for OrgUsersError {
    fn from(err: NotFoundError) -> Self {
        OrgUsersError::NotFound(err)
    }
}

impl From<DecodeError> for OrgUsersError {
    fn from(err: DecodeError) -> Self {
        OrgUsersError::Decode(err)
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for OrgUsersError {
    fn from(err: toml::de::Error) -> Self {
        OrgUsersError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}
