//! Error types for tagctx
//!
//! This module defines all error types used by the registry.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Only lookups fail at runtime. Construction, merge and projection are
//! total; the builder adds the policy errors (duplicates, capacity).

use crate::tag::AnyTag;
use thiserror::Error;

/// Result type alias for registry operations
pub type ContextResult<T> = std::result::Result<T, ContextError>;

/// A lookup asked for a tag the context does not hold
///
/// `available` is the number of services the context held at lookup time,
/// which separates "this context was never populated" from "this context
/// holds services, just not this one".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Service not found: {tag} (context holds {available} services)")]
pub struct MissingServiceError {
    /// The tag that was looked up
    pub tag: AnyTag,
    /// Number of services in the context at lookup time
    pub available: usize,
}

impl MissingServiceError {
    /// Create a new missing-service error
    pub fn new(tag: AnyTag, available: usize) -> Self {
        Self { tag, available }
    }

    /// True when the context held no services at all
    pub fn is_unpopulated(&self) -> bool {
        self.available == 0
    }
}

/// Error types for the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// Tag identity absent from the context
    #[error(transparent)]
    MissingService(#[from] MissingServiceError),

    /// Tag identity present, but bound to a value of another type
    ///
    /// Happens when one global key is declared with two service types.
    #[error("Service type mismatch for {tag}: expected {expected}, found {found}")]
    ServiceTypeMismatch {
        /// The tag that was looked up
        tag: AnyTag,
        /// Type the caller asked for
        expected: &'static str,
        /// Type actually stored
        found: &'static str,
    },

    /// Builder rejected a second registration for the same tag
    #[error("Duplicate service registration: {tag}")]
    DuplicateService {
        /// The tag registered twice
        tag: AnyTag,
    },

    /// Builder would exceed the configured service limit
    #[error("Context capacity exceeded: limit is {limit} services")]
    CapacityExceeded {
        /// Configured maximum
        limit: usize,
    },

    /// Registry configuration could not be parsed or is inconsistent
    #[error("Invalid registry configuration: {0}")]
    InvalidConfig(String),
}

impl ContextError {
    /// Get a stable reason code for this error
    pub fn reason_code(&self) -> &'static str {
        match self {
            ContextError::MissingService(_) => "missing_service",
            ContextError::ServiceTypeMismatch { .. } => "service_type_mismatch",
            ContextError::DuplicateService { .. } => "duplicate_service",
            ContextError::CapacityExceeded { .. } => "capacity_exceeded",
            ContextError::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Get the tag this error is about, if any
    pub fn tag(&self) -> Option<&AnyTag> {
        match self {
            ContextError::MissingService(e) => Some(&e.tag),
            ContextError::ServiceTypeMismatch { tag, .. } => Some(tag),
            ContextError::DuplicateService { tag } => Some(tag),
            ContextError::CapacityExceeded { .. } | ContextError::InvalidConfig(_) => None,
        }
    }
}

impl From<toml::de::Error> for ContextError {
    fn from(e: toml::de::Error) -> Self {
        ContextError::InvalidConfig(e.to_string())
    }
}
