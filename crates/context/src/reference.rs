//! Tags with a default value
//!
//! A Reference pairs a tag with the value to use when a context has no
//! binding for it, which makes lookups through it total.

use crate::service::Service;
use std::fmt;
use std::sync::Arc;
use tagctx_core::{AnyTag, Tag, TagKey};

/// A tag that carries its own default service
pub struct Reference<S> {
    tag: Tag<S>,
    default: Arc<S>,
}

impl<S: Service> Reference<S> {
    /// Create a reference with instance identity
    pub fn new(default: S) -> Self {
        Self {
            tag: Tag::new(),
            default: Arc::new(default),
        }
    }

    /// Create a reference whose identity is derived from `key`
    pub fn global(key: impl Into<TagKey>, default: S) -> Self {
        Self {
            tag: Tag::global(key),
            default: Arc::new(default),
        }
    }

    /// The tag used to bind an override
    pub fn tag(&self) -> &Tag<S> {
        &self.tag
    }

    /// The fallback value
    pub fn default_value(&self) -> &S {
        &self.default
    }
}

impl<S> Clone for Reference<S> {
    fn clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            default: Arc::clone(&self.default),
        }
    }
}

impl<S> AsRef<AnyTag> for Reference<S> {
    fn as_ref(&self) -> &AnyTag {
        self.tag.as_ref()
    }
}

impl<S: fmt::Debug> fmt::Debug for Reference<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("tag", &self.tag)
            .field("default", &self.default)
            .finish()
    }
}
