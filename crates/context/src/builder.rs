//! Batch construction of contexts under a registry configuration
//!
//! `Context::add` always overwrites. The builder is the stricter entry
//! point: with `DuplicatePolicy::Reject` a second registration of the
//! same tag identity fails, and `max_services` bounds the result.

use crate::context::{Context, Entry};
use crate::service::Service;
use std::sync::Arc;
use tagctx_core::{AnyTag, ContextError, ContextResult, DuplicatePolicy, RegistryConfig, Tag};
use tracing::debug;

/// Accumulates services, then freezes them into a [`Context`]
///
/// # Examples
///
/// ```
/// use tagctx_context::{ContextBuilder, ContextError, RegistryConfig, Tag};
///
/// let port = Tag::<u16>::global("PORT");
/// let mut builder = ContextBuilder::with_config(RegistryConfig::strict()).unwrap();
/// builder.insert(&port, 8080).unwrap();
///
/// let err = builder.insert(&port, 9090).unwrap_err();
/// assert!(matches!(err, ContextError::DuplicateService { .. }));
///
/// let context = builder.build();
/// assert_eq!(context[&port], 8080);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    config: RegistryConfig,
    context: Context,
}

impl ContextBuilder {
    /// Create a builder with the default (overwriting, unbounded) config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with an explicit config
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the config fails validation.
    pub fn with_config(config: RegistryConfig) -> ContextResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            context: Context::empty(),
        })
    }

    /// Start from the services of an existing context
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an invalid config, or
    /// `CapacityExceeded` if `context` is already over the limit.
    pub fn from_context(context: &Context, config: RegistryConfig) -> ContextResult<Self> {
        config.validate()?;
        config.check_capacity(context.len())?;
        Ok(Self {
            config,
            context: context.clone(),
        })
    }

    /// The active configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of services accumulated so far
    pub fn len(&self) -> usize {
        self.context.len()
    }

    /// True when nothing has been inserted
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }

    /// Register `service` under `tag`
    ///
    /// # Errors
    ///
    /// - `DuplicateService` if the tag is already bound and the policy rejects
    /// - `CapacityExceeded` if the insert would exceed `max_services`
    ///
    /// On error the builder is unchanged.
    pub fn insert<S: Service>(&mut self, tag: &Tag<S>, service: S) -> ContextResult<&mut Self> {
        self.insert_shared(tag, Arc::new(service))
    }

    /// Like [`ContextBuilder::insert`], storing a caller-owned `Arc`
    pub fn insert_shared<S: Service>(
        &mut self,
        tag: &Tag<S>,
        service: Arc<S>,
    ) -> ContextResult<&mut Self> {
        self.admit(tag.as_ref())?;
        self.context.insert_entry(Entry {
            tag: tag.erase(),
            value: service,
        });
        Ok(self)
    }

    /// Register every service of `other`
    ///
    /// Checks run against the whole batch first, so either every entry is
    /// admitted or the builder is unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`ContextBuilder::insert`].
    pub fn extend_from(&mut self, other: &Context) -> ContextResult<&mut Self> {
        let mut added = 0usize;
        for tag in other.tags() {
            if self.context.contains(tag) {
                if self.config.duplicate_policy == DuplicatePolicy::Reject {
                    return Err(ContextError::DuplicateService { tag: tag.clone() });
                }
            } else {
                added += 1;
            }
        }
        self.config.check_capacity(self.context.len() + added)?;

        self.context = self.context.merge(other);
        debug!(target: "tagctx::builder", added, total = self.context.len(), "Builder extended");
        Ok(self)
    }

    /// Freeze into an immutable context
    pub fn build(self) -> Context {
        self.context
    }

    fn admit(&self, tag: &AnyTag) -> ContextResult<()> {
        if self.context.contains(tag) {
            return match self.config.duplicate_policy {
                DuplicatePolicy::Overwrite => Ok(()),
                DuplicatePolicy::Reject => {
                    debug!(target: "tagctx::builder", tag = %tag, "Duplicate registration rejected");
                    Err(ContextError::DuplicateService { tag: tag.clone() })
                }
            };
        }
        self.config.check_capacity(self.context.len() + 1)
    }
}

impl Context {
    /// Start a builder pre-filled with this context's services
    pub fn to_builder(&self) -> ContextBuilder {
        ContextBuilder {
            config: RegistryConfig::default(),
            context: self.clone(),
        }
    }
}
