//! Domain layer for the micro-frontend shell
//!
//! Core models, port traits and error types shared by every remote.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, LoadError, QueryError, RegistryError};
