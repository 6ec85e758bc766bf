//! Registry compilation pipeline.
//!
//! Compiles definition files spread over one or more source roots into a
//! single serialized registry.
//!
//! # Overview
//!
//! A run consists of:
//! - **Pre-flight**: Check source roots and the output directory
//! - **Enumeration**: Find definition files under each root, skipping
//!   excluded namespaces
//! - **Building**: Derive descriptors, reject duplicates, resolve themes
//! - **Serializing**: Publish the registry atomically
//!
//! # Example
//!
//! ```no_run
//! use bundlec::build::{CompileContext, RegistrySerializer};
//! use std::path::PathBuf;
//!
//! let context = CompileContext::new(vec![PathBuf::from("src/components")], PathBuf::from("build"))
//!     .with_excluded(["test"]);
//! let mut run = RegistrySerializer::new(context);
//!
//! match run.execute() {
//!     Ok(summary) => println!("Compiled {} artifacts", summary.artifact_count),
//!     Err(e) => eprintln!("{} ({} errors)", e, e.errors().len()),
//! }
//! ```

pub mod context;
pub mod discovery;
pub mod error;
pub mod extension;
pub mod format;
pub mod log;
pub mod pipeline;
pub mod result;

pub use context::*;
pub use discovery::*;
pub use error::*;
pub use extension::*;
pub use format::*;
pub use log::*;
pub use pipeline::*;
pub use result::*;
