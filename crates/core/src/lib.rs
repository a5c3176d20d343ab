//! Core types for tagctx
//!
//! This crate defines the foundational types used by the service registry:
//! - TagKey: External key backing a global tag
//! - Identity: Storage-level identity of a tag (instance or global)
//! - AnyTag / Tag<S>: Erased and typed capability tokens
//! - Error: MissingServiceError and the ContextError hierarchy
//! - Config: RegistryConfig and DuplicatePolicy for batch construction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod tag;

pub use config::{DuplicatePolicy, RegistryConfig};
pub use error::{ContextError, ContextResult, MissingServiceError};
pub use tag::{is_tag, is_tag_of, is_tag_opt, AnyTag, Identity, KeyValue, Tag, TagKey};
