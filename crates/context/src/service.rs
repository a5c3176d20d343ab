//! Service equality capability
//!
//! Context equality compares stored values through the [`Service`] trait.
//! A type opts into structural comparison by overriding `service_eq` and
//! `service_hash` (or with [`structural_service!`]); otherwise two values
//! are equal only when they are the same allocation.
//!
//! ## Contract
//!
//! - `service_eq` is an equivalence relation
//! - `a.service_eq(b)` implies equal `service_hash` output
//!
//! The identity defaults satisfy both because services live behind an
//! `Arc` and never move once stored.

use std::any::{type_name, Any};
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;
use std::time::Duration;

/// A value that can be stored in a context
///
/// # Examples
///
/// ```
/// use tagctx_context::{structural_service, Service};
///
/// #[derive(Debug, PartialEq, Hash)]
/// struct Port(u16);
/// structural_service!(Port);
///
/// // Opaque handles keep identity equality.
/// #[derive(Debug)]
/// struct Pool(u32);
/// impl Service for Pool {}
///
/// let (a, b) = (Pool(1), Pool(1));
/// assert!(Port(8080).service_eq(&Port(8080)));
/// assert!(a.service_eq(&a));
/// assert!(!a.service_eq(&b));
/// ```
pub trait Service: Any + Send + Sync + fmt::Debug {
    /// Compare two values of this type
    ///
    /// Default: reference identity.
    fn service_eq(&self, other: &Self) -> bool {
        std::ptr::eq(self as *const Self as *const (), other as *const Self as *const ())
    }

    /// Feed a hash consistent with `service_eq` into `state`
    ///
    /// Default: the value's address.
    fn service_hash(&self, state: &mut dyn Hasher) {
        state.write_usize(self as *const Self as *const () as usize);
    }
}

/// Implement [`Service`] through `PartialEq` and `Hash`
///
/// The types must also implement `Debug + Send + Sync + 'static`.
#[macro_export]
macro_rules! structural_service {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Service for $ty {
                fn service_eq(&self, other: &Self) -> bool {
                    ::core::cmp::PartialEq::eq(self, other)
                }

                fn service_hash(&self, mut state: &mut dyn ::core::hash::Hasher) {
                    ::core::hash::Hash::hash(self, &mut state)
                }
            }
        )+
    };
}

structural_service!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    String,
    &'static str,
    Duration,
);

impl<T> Service for Vec<T>
where
    T: PartialEq + std::hash::Hash + fmt::Debug + Send + Sync + 'static,
{
    fn service_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn service_hash(&self, mut state: &mut dyn Hasher) {
        std::hash::Hash::hash(self, &mut state)
    }
}

impl<T> Service for Option<T>
where
    T: PartialEq + std::hash::Hash + fmt::Debug + Send + Sync + 'static,
{
    fn service_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn service_hash(&self, mut state: &mut dyn Hasher) {
        std::hash::Hash::hash(self, &mut state)
    }
}

// =============================================================================
// Type erasure
// =============================================================================

/// Object-safe view of a [`Service`] used by the storage layer
pub(crate) trait ErasedService: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    fn type_name(&self) -> &'static str;

    fn eq_erased(&self, other: &dyn ErasedService) -> bool;

    fn hash_erased(&self, state: &mut dyn Hasher);

    fn fmt_erased(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<S: Service> ErasedService for S {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<S>()
    }

    fn eq_erased(&self, other: &dyn ErasedService) -> bool {
        other
            .as_any()
            .downcast_ref::<S>()
            .is_some_and(|other| self.service_eq(other))
    }

    fn hash_erased(&self, state: &mut dyn Hasher) {
        self.service_hash(state);
    }

    fn fmt_erased(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Debug adapter for an erased service
pub(crate) struct ErasedDebug<'a>(pub(crate) &'a dyn ErasedService);

impl fmt::Debug for ErasedDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_erased(f)
    }
}
