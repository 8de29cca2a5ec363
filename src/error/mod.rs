//! Error handling for the org/user export pipeline.
//!
//! This module provides:
//! - The error taxonomy used across the crate (configuration, connectivity,
//!   not-found, decode and serialization failures)
//! - Classification of MongoDB driver errors into that taxonomy
//! - Structured error details for logging
//!
//! # Example
//!
//! ```rust,no_run
//! use orgusers::error::{Result, NotFoundError};
//!
//! fn lookup(path: &str) -> Result<String> {
//!     Err(NotFoundError::new("organizations", "path", path).into())
//! }
//! ```

pub mod kinds;
pub mod mongo;

pub use kinds::{
    ConfigError, ConnectivityError, DecodeError, NotFoundError, OrgUsersError, Result,
    SerializationError,
};
pub use mongo::{ErrorInfo, classify, extract_error_info};
