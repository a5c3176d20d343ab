//! Immutable, type-indexed service registry
//!
//! This crate provides the [`Context`] container and everything that
//! reads or builds it:
//! - Context: construction (`empty`, `make`), derivation (`add`, `merge`,
//!   `pick`, `omit`) and structural equality
//! - Lookup: `get`, `get_option`, `get_shared`, indexing by tag
//! - Service: the equality capability stored values implement
//! - Reference: tags with a default value
//! - ContextBuilder: batch construction under a `RegistryConfig`
//! - ContextSummary: serializable description of a context
//!
//! # Quick Start
//!
//! ```
//! use tagctx_context::{structural_service, Context, Tag};
//!
//! #[derive(Debug, PartialEq, Hash)]
//! struct Port(u16);
//! structural_service!(Port);
//!
//! let port = Tag::<Port>::global("PORT");
//! let defaults = Context::make(&port, Port(80));
//! let overrides = Context::make(&port, Port(8080));
//!
//! let context = defaults.merge(&overrides);
//! assert_eq!(context[&port], Port(8080));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod context;
pub mod lookup;
pub mod reference;
pub mod service;
pub mod summary;

pub use builder::ContextBuilder;
pub use context::Context;
pub use lookup::is_context;
pub use reference::Reference;
pub use service::Service;
pub use summary::{ContextSummary, ServiceSummary};

// Re-export core types so callers need one import path
pub use tagctx_core::{
    is_tag, is_tag_of, is_tag_opt, AnyTag, ContextError, ContextResult, DuplicatePolicy, Identity,
    KeyValue, MissingServiceError, RegistryConfig, Tag, TagKey,
};
