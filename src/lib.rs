//! tagctx - Immutable, type-indexed service registry
//!
//! A [`Context`] maps capability tags to service values. Tags are either
//! unique per construction ([`Tag::new`]) or derived from an external key
//! ([`Tag::global`]); every operation on a context returns a new context.
//!
//! # Quick Start
//!
//! ```
//! use tagctx::{structural_service, Context, ContextError, Tag};
//!
//! #[derive(Debug, PartialEq, Hash)]
//! struct Port(u16);
//! structural_service!(Port);
//!
//! #[derive(Debug, PartialEq, Hash)]
//! struct Timeout(u64);
//! structural_service!(Timeout);
//!
//! let port = Tag::<Port>::global("PORT");
//! let timeout = Tag::<Timeout>::new();
//!
//! let context = Context::make(&port, Port(8080)).add(&timeout, Timeout(5000));
//! assert_eq!(context.get(&port)?, &Port(8080));
//! assert_eq!(context.get_option(&timeout), Some(&Timeout(5000)));
//!
//! let only_port = context.pick([port.as_ref()]);
//! assert_eq!(only_port, Context::make(&port, Port(8080)));
//! assert!(matches!(
//!     only_port.get(&timeout),
//!     Err(ContextError::MissingService(_))
//! ));
//! # Ok::<(), ContextError>(())
//! ```
//!
//! # Architecture
//!
//! - `tagctx-core`: tag identity, errors, configuration
//! - `tagctx-context`: the container, lookups, builder and summaries
//!
//! This crate re-exports both.

pub use tagctx_context::*;

/// Tag identity, errors and configuration
pub use tagctx_core::{config, error, tag};
