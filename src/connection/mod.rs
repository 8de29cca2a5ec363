//! Connection management for MongoDB
//!
//! This module provides:
//! - Connection URL assembly from host, port and the fixed option suffix
//! - Validation through the driver's own URI parser
//! - Client construction, liveness check and shutdown

use mongodb::bson::doc;
use mongodb::options::{ClientOptions, ReadPreference, SelectionCriteria, Tls};
use mongodb::{Client, Database};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Lookup;
use crate::error::{ConfigError, Result, classify};
use crate::executor::OperationScope;
use crate::store::MongoDirectory;

/// Where to connect: the assembled URL plus the database selected on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// Full connection URL including the option suffix
    pub uri: String,

    /// Database name (not encoded in the URL path)
    pub database: String,
}

impl ConnectionTarget {
    /// Build a target from a base URL, port and database name
    ///
    /// The base URL gets `mongodb://` prepended unless it already starts with
    /// exactly that prefix. Other schemes are not recognised and end up
    /// prefixed, which the driver then rejects during validation.
    ///
    /// # Examples
    /// ```
    /// use orgusers::connection::ConnectionTarget;
    ///
    /// let target = ConnectionTarget::new("db.internal", 27017, "idm");
    /// assert_eq!(
    ///     target.uri,
    ///     "mongodb://db.internal:27017/?tls=true&replicaSet=rs0&readPreference=secondaryPreferred&retryWrites=false"
    /// );
    /// ```
    pub fn new(base_url: &str, port: u16, database: &str) -> Self {
        let base = normalize_url(base_url);
        Self {
            uri: format!("{}:{}/{}", base, port, Lookup::CONNECTION_OPTIONS),
            database: database.to_string(),
        }
    }

    /// URL safe for logs (credentials hidden)
    pub fn sanitized(&self) -> String {
        sanitize_uri(&self.uri)
    }
}

/// Prepend the MongoDB scheme if the URL does not already carry it
pub fn normalize_url(url: &str) -> String {
    if url.starts_with(Lookup::SCHEME_PREFIX) {
        url.to_string()
    } else {
        format!("{}{}", Lookup::SCHEME_PREFIX, url)
    }
}

/// Sanitize URI by hiding credentials
///
/// # Arguments
/// * `uri` - The URI to sanitize
///
/// # Returns
/// * `String` - URI with everything between `://` and `@` replaced by `***`
pub fn sanitize_uri(uri: &str) -> String {
    if let Some(proto_end) = uri.find("://") {
        if let Some(host_start) = uri.rfind('@') {
            if host_start > proto_end {
                let proto = &uri[..proto_end + 3];
                let host = &uri[host_start..];
                return format!("{}***{}", proto, host);
            }
        }
    }
    if uri.contains('@') {
        "mongodb://***".to_string()
    } else {
        uri.to_string()
    }
}

/// Parse and validate the target URL, then apply the fixed client settings
///
/// Certificate verification is turned off on the resulting TLS settings, so
/// any server certificate is accepted.
///
/// # Arguments
/// * `target` - Connection target
/// * `timeout` - Upper bound for server selection and connection setup
///
/// # Returns
/// * `Result<ClientOptions>` - Validated options or a configuration error
pub async fn client_options(target: &ConnectionTarget, timeout: Duration) -> Result<ClientOptions> {
    let mut options = ClientOptions::parse(&target.uri)
        .await
        .map_err(|e| ConfigError::InvalidUri {
            uri: target.sanitized(),
            reason: e.to_string(),
        })?;

    if accept_invalid_certificates(&mut options) {
        warn!(
            uri = %target.sanitized(),
            "TLS certificate verification disabled; any server certificate is accepted"
        );
    }

    options.app_name = Some(app_name());
    options.server_selection_timeout = Some(timeout);
    options.connect_timeout = Some(timeout);

    debug!(app_name = ?options.app_name, ?timeout, "client options ready");
    Ok(options)
}

/// Relax certificate checks on an enabled TLS configuration
///
/// Returns whether TLS was enabled and therefore relaxed.
fn accept_invalid_certificates(options: &mut ClientOptions) -> bool {
    match options.tls.as_mut() {
        Some(Tls::Enabled(tls)) => {
            tls.allow_invalid_certificates = Some(true);
            true
        }
        _ => false,
    }
}

/// Server selection for the liveness check
///
/// `run_command` does not inherit the client's read preference and would
/// otherwise require the primary.
pub fn ping_criteria(options: &ClientOptions) -> SelectionCriteria {
    options
        .selection_criteria
        .clone()
        .unwrap_or(SelectionCriteria::ReadPreference(ReadPreference::SecondaryPreferred {
            options: None,
        }))
}

fn app_name() -> String {
    match hostname::get() {
        Ok(host) => format!("{}@{}", Lookup::APP_NAME, host.to_string_lossy()),
        Err(_) => Lookup::APP_NAME.to_string(),
    }
}

/// MongoDB connection manager
///
/// Owns the client for one run. [`ConnectionManager::disconnect`] must be
/// awaited once the lookups finish, whatever their outcome.
pub struct ConnectionManager {
    /// MongoDB client instance
    client: Client,

    /// Database selected for the lookups
    database: String,

    /// Read preference the ping runs with
    ping_criteria: SelectionCriteria,
}

impl ConnectionManager {
    /// Create the client. No network traffic happens until the first operation.
    pub fn connect(options: ClientOptions, database: &str) -> Result<Self> {
        let criteria = ping_criteria(&options);
        let client = Client::with_options(options).map_err(|e| classify("connect", &e))?;
        Ok(Self {
            client,
            database: database.to_string(),
            ping_criteria: criteria,
        })
    }

    /// Get a database handle
    pub fn get_database(&self) -> Database {
        self.client.database(&self.database)
    }

    /// Store over the selected database
    pub fn directory(&self) -> MongoDirectory {
        MongoDirectory::new(self.get_database())
    }

    /// Verify the deployment is reachable within the operation scope
    pub async fn ping(&self, scope: &OperationScope) -> Result<()> {
        let db = self.get_database();
        let criteria = self.ping_criteria.clone();
        scope
            .run("connect", async move {
                db.run_command(doc! { "ping": 1 })
                    .selection_criteria(criteria)
                    .await
                    .map(|_| ())
                    .map_err(|e| classify("connect", &e))
            })
            .await?;
        info!(database = %self.database, "connected");
        Ok(())
    }

    /// Close all connections held by the client
    pub async fn disconnect(self) {
        self.client.shutdown().await;
        debug!("client shut down");
    }
}
