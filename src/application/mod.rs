//! Application layer: services and use cases
//!
//! This layer orchestrates the tree engine for the CLI.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
