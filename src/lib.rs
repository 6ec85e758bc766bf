//! bundlec - Registry precompiler for component bundles
//!
//! This library provides functionality to:
//! - Discover component, style and theme definitions under source roots
//! - Derive namespace-qualified descriptors and reject duplicates
//! - Resolve convention-derived theme references
//! - Publish a deterministic serialized registry atomically

pub mod build;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod registry;
pub mod themes;
