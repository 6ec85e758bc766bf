//! Configuration module for the registry compiler
//!
//! Provides types and parsing for the optional `bundlec.toml` file.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
