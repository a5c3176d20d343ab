//! The Context container
//!
//! A Context is an immutable map from tag identity to service value.
//!
//! ## Invariants
//!
//! 1. **Key uniqueness**: at most one value per tag identity
//! 2. **Immutability**: every public operation returns a new Context
//! 3. **Structural equality**: `A == B` iff both hold the same identities,
//!    each bound to values equal under [`Service`]; insertion order is
//!    irrelevant
//!
//! Storage is an `Arc`-shared hash map. Derivations clone the handle and
//! copy the map on first write (`Arc::make_mut`), so sharing is never
//! observable and derived contexts can be built concurrently.

use crate::service::{ErasedDebug, ErasedService, Service};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tagctx_core::{AnyTag, Identity, Tag};
use tracing::{debug, trace};

/// One stored service, with the tag it was registered under
#[derive(Clone)]
pub(crate) struct Entry {
    pub(crate) tag: AnyTag,
    pub(crate) value: Arc<dyn ErasedService>,
}

impl Entry {
    fn new<S: Service>(tag: &Tag<S>, value: Arc<S>) -> Self {
        Self {
            tag: tag.erase(),
            value,
        }
    }
}

/// Immutable, type-indexed service registry
///
/// # Examples
///
/// ```
/// use tagctx_context::{Context, Tag};
///
/// let port = Tag::<u16>::global("PORT");
/// let name = Tag::<String>::new();
///
/// let base = Context::make(&port, 8080);
/// let full = base.add(&name, "api".to_string());
///
/// assert_eq!(full[&port], 8080);
/// assert_eq!(full.get_option(&name).map(String::as_str), Some("api"));
/// assert!(base.get_option(&name).is_none());
/// ```
#[derive(Clone, Default)]
pub struct Context {
    pub(crate) entries: Arc<FxHashMap<Identity, Entry>>,
}

impl Context {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a context with no services
    ///
    /// This is the identity element of [`Context::merge`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a context holding a single service
    pub fn make<S: Service>(tag: &Tag<S>, service: S) -> Self {
        Self::empty().add(tag, service)
    }

    /// Left-to-right right-biased merge of every context in `contexts`
    pub fn merge_all<'a, I>(contexts: I) -> Self
    where
        I: IntoIterator<Item = &'a Context>,
    {
        contexts
            .into_iter()
            .fold(Self::empty(), |merged, next| merged.merge(next))
    }

    // =========================================================================
    // Derivation
    // =========================================================================

    /// Return a context with `tag` bound to `service`
    ///
    /// An existing binding for the same identity is replaced.
    pub fn add<S: Service>(&self, tag: &Tag<S>, service: S) -> Self {
        self.add_shared(tag, Arc::new(service))
    }

    /// Like [`Context::add`], storing a caller-owned `Arc`
    ///
    /// Services with identity equality stay equal across contexts that
    /// share the same `Arc`.
    pub fn add_shared<S: Service>(&self, tag: &Tag<S>, service: Arc<S>) -> Self {
        let mut next = self.clone();
        next.insert_entry(Entry::new(tag, service));
        next
    }

    /// Right-biased union: entries of `that` win on collision
    pub fn merge(&self, that: &Context) -> Self {
        if that.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return that.clone();
        }

        let mut merged = self.clone();
        let entries = Arc::make_mut(&mut merged.entries);
        let mut shadowed = 0usize;
        for (identity, entry) in that.entries.iter() {
            if entries.insert(identity.clone(), entry.clone()).is_some() {
                shadowed += 1;
            }
        }

        if shadowed > 0 {
            debug!(target: "tagctx::context", left = self.len(), right = that.len(), shadowed, "Merge replaced services");
        } else {
            trace!(target: "tagctx::context", left = self.len(), right = that.len(), "Contexts merged");
        }
        merged
    }

    /// Keep only the entries whose identity appears in `tags`
    ///
    /// Tags absent from this context are ignored.
    pub fn pick<I>(&self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<AnyTag>,
    {
        let entries: FxHashMap<Identity, Entry> = tags
            .into_iter()
            .filter_map(|tag| {
                let identity = tag.as_ref().identity();
                self.entries
                    .get(identity)
                    .map(|entry| (identity.clone(), entry.clone()))
            })
            .collect();

        trace!(target: "tagctx::context", from = self.len(), kept = entries.len(), "Context picked");
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Drop the entries whose identity appears in `tags`
    pub fn omit<I>(&self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<AnyTag>,
    {
        let excluded: FxHashSet<Identity> = tags
            .into_iter()
            .map(|tag| tag.as_ref().identity().clone())
            .filter(|identity| self.entries.contains_key(identity))
            .collect();
        if excluded.is_empty() {
            return self.clone();
        }

        let entries: FxHashMap<Identity, Entry> = self
            .entries
            .iter()
            .filter(|(identity, _)| !excluded.contains(*identity))
            .map(|(identity, entry)| (identity.clone(), entry.clone()))
            .collect();

        trace!(target: "tagctx::context", from = self.len(), removed = excluded.len(), "Context omitted");
        Self {
            entries: Arc::new(entries),
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Number of services
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no services are bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when a service is bound to the identity of `tag`
    pub fn contains<T: AsRef<AnyTag> + ?Sized>(&self, tag: &T) -> bool {
        self.entries.contains_key(tag.as_ref().identity())
    }

    /// Tags of the bound services, in unspecified order
    ///
    /// Each tag is the one the service was registered under.
    pub fn tags(&self) -> impl Iterator<Item = &AnyTag> + '_ {
        self.entries.values().map(|entry| &entry.tag)
    }

    /// Entries sorted by tag identity
    pub(crate) fn sorted_entries(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.tag.cmp(&b.tag));
        entries
    }

    // =========================================================================
    // Internal mutation (builder and derivations only)
    // =========================================================================

    /// Insert into this handle's map, copying it first if shared
    pub(crate) fn insert_entry(&mut self, entry: Entry) -> Option<Entry> {
        let identity = entry.tag.identity().clone();
        let previous = Arc::make_mut(&mut self.entries).insert(identity, entry);
        if let Some(previous) = &previous {
            debug!(target: "tagctx::context", tag = %previous.tag, "Service replaced");
        }
        previous
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.entries, &other.entries) {
            return true;
        }
        self.len() == other.len()
            && self.entries.iter().all(|(identity, entry)| {
                other
                    .entries
                    .get(identity)
                    .is_some_and(|theirs| entry.value.eq_erased(&*theirs.value))
            })
    }
}

impl Eq for Context {}

// Sum of per-entry hashes, so iteration order does not matter.
impl Hash for Context {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut combined: u64 = 0;
        for (identity, entry) in self.entries.iter() {
            let mut hasher = FxHasher::default();
            identity.hash(&mut hasher);
            entry.value.hash_erased(&mut hasher);
            combined = combined.wrapping_add(hasher.finish());
        }
        state.write_usize(self.len());
        state.write_u64(combined);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Context ")?;
        f.debug_map()
            .entries(
                self.sorted_entries()
                    .into_iter()
                    .map(|entry| (entry.tag.to_string(), ErasedDebug(&*entry.value))),
            )
            .finish()
    }
}

impl<S: Service> FromIterator<(Tag<S>, S)> for Context {
    fn from_iter<I: IntoIterator<Item = (Tag<S>, S)>>(iter: I) -> Self {
        let mut context = Context::empty();
        for (tag, service) in iter {
            context.insert_entry(Entry::new(&tag, Arc::new(service)));
        }
        context
    }
}
