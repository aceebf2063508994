//! CLI command implementations.

pub mod config;
pub mod remote;
pub mod routes;
pub mod serve;
