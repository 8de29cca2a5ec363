//! orgusers library
//!
//! Resolves an organization by its path in a MongoDB directory database,
//! fetches every user holding a membership in it, and exports them as JSON.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Fixed lookup settings and the optional config file
//! - `connection`: Connection URL assembly, validation and client lifecycle
//! - `error`: Error types and driver error classification
//! - `executor`: Operation scope, lookups and the export pipeline
//! - `formatter`: JSON rendering
//! - `store`: Directory store trait, MongoDB implementation and entities
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use orgusers::connection::{self, ConnectionManager, ConnectionTarget};
//! use orgusers::executor::{self, Destination, ExportJob, OperationScope};
//! use orgusers::formatter::JsonFormatter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let target = ConnectionTarget::new("localhost", 27017, "idm");
//!     let scope = OperationScope::new(Duration::from_secs(5));
//!     let options = connection::client_options(&target, scope.budget()).await?;
//!     let manager = ConnectionManager::connect(options, &target.database)?;
//!
//!     let job = ExportJob {
//!         org_path: "acme".to_string(),
//!         destination: Destination::Stdout,
//!     };
//!     let outcome =
//!         executor::run_export(&manager.directory(), &scope, &job, &JsonFormatter::plain()).await;
//!     manager.disconnect().await;
//!     outcome?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod store;

// Re-export commonly used types
pub use config::{Config, Lookup};
pub use connection::{ConnectionManager, ConnectionTarget};
pub use error::{OrgUsersError, Result};
pub use executor::{Destination, ExportJob, OperationScope};
pub use formatter::JsonFormatter;
pub use store::{DirectoryStore, MongoDirectory, Organization, OrganizationMembership, User};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
