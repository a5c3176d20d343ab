//! Reading services out of a Context
//!
//! Three access paths, all agreeing on presence:
//! - `ctx.get(&tag)`: checked; `MissingService` or `ServiceTypeMismatch`
//! - `ctx.get_option(&tag)`: total; `None` exactly when `get` errs
//! - `ctx[&tag]`: for tags known to be present; panics with the same
//!   message `get` would return
//!
//! A type mismatch means one global key was declared with two service
//! types. The context never hands out a value of the wrong type.

use crate::context::Context;
use crate::reference::Reference;
use crate::service::Service;
use std::any::{type_name, Any};
use std::ops::Index;
use std::sync::Arc;
use tagctx_core::{ContextError, ContextResult, MissingServiceError, Tag};
use tracing::warn;

impl Context {
    /// Look up the service bound to `tag`
    ///
    /// # Errors
    ///
    /// - `MissingService` if no service is bound to the tag identity
    /// - `ServiceTypeMismatch` if the bound service is not an `S`
    pub fn get<S: Service>(&self, tag: &Tag<S>) -> ContextResult<&S> {
        let entry = self
            .entries
            .get(tag.identity())
            .ok_or_else(|| MissingServiceError::new(tag.erase(), self.len()))?;

        entry.value.as_any().downcast_ref::<S>().ok_or_else(|| {
            let found = entry.value.type_name();
            warn!(target: "tagctx::context", tag = %tag, found, "Service type mismatch");
            ContextError::ServiceTypeMismatch {
                tag: tag.erase(),
                expected: type_name::<S>(),
                found,
            }
        })
    }

    /// Look up the service bound to `tag`, if any
    ///
    /// Quiet counterpart of [`Context::get`]: a type mismatch is `None`
    /// without logging or building an error.
    pub fn get_option<S: Service>(&self, tag: &Tag<S>) -> Option<&S> {
        self.entries
            .get(tag.identity())?
            .value
            .as_any()
            .downcast_ref::<S>()
    }

    /// Look up the service bound to `tag` as a shared handle
    ///
    /// The returned `Arc` is the one stored in the context.
    pub fn get_shared<S: Service>(&self, tag: &Tag<S>) -> Option<Arc<S>> {
        let entry = self.entries.get(tag.identity())?;
        Arc::clone(&entry.value).into_any().downcast::<S>().ok()
    }

    /// Look up a reference, falling back to its default value
    pub fn get_reference<'a, S: Service>(&'a self, reference: &'a Reference<S>) -> &'a S {
        self.get_option(reference.tag())
            .unwrap_or_else(|| reference.default_value())
    }
}

impl<'t, S: Service> Index<&'t Tag<S>> for Context {
    type Output = S;

    /// # Panics
    ///
    /// Panics if [`Context::get`] would fail for `tag`.
    fn index(&self, tag: &'t Tag<S>) -> &S {
        match self.get(tag) {
            Ok(service) => service,
            Err(err) => panic!("{}", err),
        }
    }
}

/// Check whether a dynamically typed value is a [`Context`]
pub fn is_context(value: &dyn Any) -> bool {
    value.is::<Context>()
}
