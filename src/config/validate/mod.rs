//! Configuration validation module
//!
//! Validates experiment configurations before any data is touched.

mod error;
mod validator;

#[cfg(test)]
mod proptests;

pub use error::ValidationError;
pub use validator::validate_config;
