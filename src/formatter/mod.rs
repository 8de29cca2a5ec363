//! Output formatting for exported records

pub mod json;

pub use json::{JsonFormatter, Rendered};
