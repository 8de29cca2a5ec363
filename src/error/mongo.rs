use serde::{Deserialize, Serialize};
use tracing::debug;

use super::kinds::{ConfigError, ConnectivityError, DecodeError, OrgUsersError};

/// Structured error information extracted from MongoDB errors.
///
/// Serialized as compact JSON into the `details` field of error logs.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

impl ErrorInfo {
    /// Convert error info to compact JSON string (single line).
    pub fn to_json_compact(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Map a driver error raised during `operation` onto the crate's error taxonomy.
///
/// BSON decoding failures become [`DecodeError`], rejected arguments and TLS
/// settings become [`ConfigError`], and everything else (network, server
/// selection, authentication, command failures) is a [`ConnectivityError`].
pub fn classify(operation: &'static str, error: &mongodb::error::Error) -> OrgUsersError {
    use mongodb::error::ErrorKind;

    let info = extract_error_info(error);
    if let Ok(details) = info.to_json_compact() {
        debug!(operation, details = %details, "driver error");
    }

    match error.kind.as_ref() {
        ErrorKind::BsonDeserialization(e) => DecodeError::new(operation, e.to_string()).into(),
        ErrorKind::InvalidArgument { message, .. } | ErrorKind::InvalidTlsConfig { message, .. } => {
            ConfigError::InvalidArguments(format!("{operation}: {message}")).into()
        }
        _ => ConnectivityError::QueryFailed {
            operation,
            message: info.message.unwrap_or_else(|| error.to_string()),
        }
        .into(),
    }
}

/// Extract structured information from a MongoDB error using the driver API.
pub fn extract_error_info(error: &mongodb::error::Error) -> ErrorInfo {
    use mongodb::error::ErrorKind;

    let mut info = ErrorInfo::default();

    match error.kind.as_ref() {
        ErrorKind::Command(command_error) => {
            info.error_type = Some("mongo.command_error".to_string());
            info.code = Some(command_error.code);
            info.message = Some(command_error.message.clone());
            info.name = get_error_name(command_error.code);
        }
        ErrorKind::Authentication { message, .. } => {
            info.error_type = Some("mongo.authentication_error".to_string());
            info.message = Some(message.clone());
        }
        ErrorKind::InvalidArgument { message, .. } => {
            info.error_type = Some("mongo.invalid_argument".to_string());
            info.message = Some(message.clone());
        }
        ErrorKind::ServerSelection { message, .. } => {
            info.error_type = Some("mongo.server_selection_error".to_string());
            info.message = Some(message.clone());
        }
        ErrorKind::DnsResolve { message, .. } => {
            info.error_type = Some("mongo.dns_error".to_string());
            info.message = Some(message.clone());
        }
        ErrorKind::Io(io_error) => {
            info.error_type = Some("mongo.io_error".to_string());
            info.message = Some(io_error.to_string());
        }
        ErrorKind::BsonDeserialization(e) => {
            info.error_type = Some("mongo.decode_error".to_string());
            info.message = Some(e.to_string());
        }
        _ => {
            info.message = Some(error.to_string());
        }
    }

    info
}

/// Human-readable names for the server error codes a read path can hit.
fn get_error_name(code: i32) -> Option<String> {
    let name = match code {
        2 => "BadValue",
        6 => "HostUnreachable",
        7 => "HostNotFound",
        13 => "Unauthorized",
        18 => "AuthenticationFailed",
        26 => "NamespaceNotFound",
        50 => "MaxTimeMSExpired",
        89 => "NetworkTimeout",
        91 => "ShutdownInProgress",
        189 => "PrimarySteppedDown",
        13435 => "NotPrimaryNoSecondaryOk",
        _ => return None,
    };

    Some(name.to_string())
}
