//! Tag identity types for tagctx
//!
//! This module defines the capability tokens used to address services:
//! - TagKey: External key backing a global tag
//! - Identity: What two tags must share to address the same slot
//! - AnyTag: Type-erased tag (identity + service type name)
//! - Tag<S>: Typed tag handed out at registration points
//!
//! ## Identity Rules
//!
//! - **Instance**: `Tag::new()` allocates a fresh identity on every call.
//!   Two unkeyed tags are never equal, even for the same service type.
//! - **Global**: `Tag::global(key)` derives identity from the key alone.
//!   Equal keys produce equal tags in any process, without a shared table.
//!
//! The service type parameter never participates in identity. A
//! `Tag<A>` and a `Tag<B>` built from the same key address the same
//! storage slot; keeping one key bound to one service type is a
//! convention the typed accessors rely on.

use serde::{Deserialize, Serialize};
use std::any::{type_name, Any};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Source of instance identities. Starts at 1 so that 0 never appears.
static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// TagKey
// =============================================================================

/// Value of a global key
///
/// Each kind hashes under its own seed, so `1u32` and `"1"` are distinct
/// keys. Unsigned values that fit in `i64` are stored as `Int`, so the same
/// number compares equal whatever integer type it was written with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    /// UTF-8 text
    Text(Arc<str>),
    /// Integer in `i64` range
    Int(i64),
    /// Unsigned integer above `i64::MAX`
    Uint(u64),
    /// Raw bytes
    Bytes(Arc<[u8]>),
}

impl KeyValue {
    fn seed(&self) -> u64 {
        match self {
            KeyValue::Text(_) => 1,
            KeyValue::Int(_) => 2,
            KeyValue::Uint(_) => 3,
            KeyValue::Bytes(_) => 4,
        }
    }

    fn fingerprint(&self) -> u64 {
        match self {
            KeyValue::Text(text) => xxh3_64_with_seed(text.as_bytes(), self.seed()),
            KeyValue::Int(n) => xxh3_64_with_seed(&n.to_le_bytes(), self.seed()),
            KeyValue::Uint(n) => xxh3_64_with_seed(&n.to_le_bytes(), self.seed()),
            KeyValue::Bytes(bytes) => xxh3_64_with_seed(bytes, self.seed()),
        }
    }
}

/// External key of a global tag
///
/// A TagKey is an immutable text, integer or byte-string value with a
/// precomputed xxh3 fingerprint. Hashing uses the fingerprint; equality
/// compares the value, so two different keys with colliding fingerprints
/// stay distinct.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "KeyRepr", into = "KeyRepr")]
pub struct TagKey {
    value: KeyValue,
    fingerprint: u64,
}

impl TagKey {
    /// Create a text key
    pub fn new(text: impl AsRef<str>) -> Self {
        Self::from_value(KeyValue::Text(Arc::from(text.as_ref())))
    }

    /// Create a key from an integer
    pub fn int(n: i64) -> Self {
        Self::from_value(KeyValue::Int(n))
    }

    /// Create a key from an unsigned integer
    pub fn uint(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Self::int(n),
            Err(_) => Self::from_value(KeyValue::Uint(n)),
        }
    }

    /// Create a key from raw bytes
    pub fn bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self::from_value(KeyValue::Bytes(Arc::from(bytes.as_ref())))
    }

    fn from_value(value: KeyValue) -> Self {
        let fingerprint = value.fingerprint();
        Self { value, fingerprint }
    }

    /// Get the key value
    pub fn value(&self) -> &KeyValue {
        &self.value
    }

    /// Get the key text, for text keys
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            KeyValue::Text(text) => Some(&**text),
            _ => None,
        }
    }

    /// Get the xxh3 fingerprint of the key
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

impl PartialEq for TagKey {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint && self.value == other.value
    }
}

impl Eq for TagKey {}

impl Hash for TagKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint);
    }
}

impl Ord for TagKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl PartialOrd for TagKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TagKey").field(&self.value).finish()
    }
}

/// Text keys print as-is, integers in decimal, bytes as `0x` hex
impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            KeyValue::Text(text) => f.write_str(text),
            KeyValue::Int(n) => write!(f, "{}", n),
            KeyValue::Uint(n) => write!(f, "{}", n),
            KeyValue::Bytes(bytes) => {
                f.write_str("0x")?;
                bytes.iter().try_for_each(|b| write!(f, "{:02x}", b))
            }
        }
    }
}

impl From<&str> for TagKey {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TagKey {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&[u8]> for TagKey {
    fn from(bytes: &[u8]) -> Self {
        Self::bytes(bytes)
    }
}

impl From<Vec<u8>> for TagKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self::bytes(bytes)
    }
}

macro_rules! signed_key {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for TagKey {
                fn from(n: $ty) -> Self {
                    Self::int(i64::from(n))
                }
            }
        )+
    };
}

macro_rules! unsigned_key {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for TagKey {
                fn from(n: $ty) -> Self {
                    Self::uint(u64::from(n))
                }
            }
        )+
    };
}

signed_key!(i8, i16, i32, i64);
unsigned_key!(u8, u16, u32, u64);

impl From<usize> for TagKey {
    fn from(n: usize) -> Self {
        // usize is at most 64 bits on supported targets
        Self::uint(n as u64)
    }
}

/// Wire form: text as a string, integers as numbers, bytes as an array
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum KeyRepr {
    Text(String),
    Int(i64),
    Uint(u64),
    Bytes(Vec<u8>),
}

impl From<KeyRepr> for TagKey {
    fn from(repr: KeyRepr) -> Self {
        match repr {
            KeyRepr::Text(text) => Self::new(text),
            KeyRepr::Int(n) => Self::int(n),
            KeyRepr::Uint(n) => Self::uint(n),
            KeyRepr::Bytes(bytes) => Self::bytes(bytes),
        }
    }
}

impl From<TagKey> for KeyRepr {
    fn from(key: TagKey) -> Self {
        match key.value {
            KeyValue::Text(text) => KeyRepr::Text(text.to_string()),
            KeyValue::Int(n) => KeyRepr::Int(n),
            KeyValue::Uint(n) => KeyRepr::Uint(n),
            KeyValue::Bytes(bytes) => KeyRepr::Bytes(bytes.to_vec()),
        }
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Identity of a tag as seen by the storage layer
///
/// Ordering: every Instance identity sorts before every Global identity;
/// instances order by allocation, globals by key value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identity {
    /// Allocation identity, unique per `Tag::new()` call in this process
    Instance(u64),
    /// Identity derived from an external key
    Global(TagKey),
}

impl Identity {
    /// Allocate a fresh instance identity
    pub fn fresh() -> Self {
        Identity::Instance(NEXT_INSTANCE.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Get the global key, if this identity has one
    pub fn key(&self) -> Option<&TagKey> {
        match self {
            Identity::Instance(_) => None,
            Identity::Global(key) => Some(key),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Instance(n) => write!(f, "#{}", n),
            Identity::Global(key) => match key.as_str() {
                Some(text) => write!(f, "{:?}", text),
                None => write!(f, "{}", key),
            },
        }
    }
}

// =============================================================================
// AnyTag
// =============================================================================

/// Type-erased tag
///
/// Carries the identity plus the name of the service type the tag was
/// declared with. The type name is for diagnostics only: equality,
/// ordering and hashing look at the identity alone.
#[derive(Debug, Clone)]
pub struct AnyTag {
    identity: Identity,
    service: &'static str,
}

impl AnyTag {
    /// Create an erased tag from its parts
    pub fn new(identity: Identity, service: &'static str) -> Self {
        Self { identity, service }
    }

    /// Get the tag identity
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Get the declared service type name
    pub fn service_name(&self) -> &'static str {
        self.service
    }

    /// Get the global key, if any
    pub fn key(&self) -> Option<&TagKey> {
        self.identity.key()
    }

    /// Check whether identity derives from an external key
    pub fn is_global(&self) -> bool {
        matches!(self.identity, Identity::Global(_))
    }
}

impl PartialEq for AnyTag {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for AnyTag {}

impl Hash for AnyTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl Ord for AnyTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity.cmp(&other.identity)
    }
}

impl PartialOrd for AnyTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AnyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag<{}>({})", self.service, self.identity)
    }
}

impl AsRef<AnyTag> for AnyTag {
    fn as_ref(&self) -> &AnyTag {
        self
    }
}

// =============================================================================
// Tag<S>
// =============================================================================

/// Typed capability token for a service of type `S`
///
/// `S` is phantom: it fixes the type the typed accessors downcast to, and
/// nothing else. Tags are cheap to clone and never change after creation.
///
/// # Examples
///
/// ```
/// use tagctx_core::Tag;
///
/// struct Port(u16);
///
/// let a = Tag::<Port>::global("PORT");
/// let b = Tag::<Port>::global("PORT");
/// assert_eq!(a, b);
///
/// let c = Tag::<Port>::new();
/// let d = Tag::<Port>::new();
/// assert_ne!(c, d);
/// ```
pub struct Tag<S> {
    inner: AnyTag,
    _service: PhantomData<fn() -> S>,
}

impl<S> Tag<S> {
    /// Create a tag with instance identity
    ///
    /// Every call returns a tag distinct from all others.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_identity(Identity::fresh())
    }

    /// Create a tag whose identity is derived from `key`
    ///
    /// Tags created from equal keys are equal and hash identically.
    pub fn global(key: impl Into<TagKey>) -> Self {
        Self::with_identity(Identity::Global(key.into()))
    }

    fn with_identity(identity: Identity) -> Self {
        Self {
            inner: AnyTag::new(identity, type_name::<S>()),
            _service: PhantomData,
        }
    }

    /// Get the tag identity
    pub fn identity(&self) -> &Identity {
        self.inner.identity()
    }

    /// Get the global key, if any
    pub fn key(&self) -> Option<&TagKey> {
        self.inner.key()
    }

    /// Check whether identity derives from an external key
    pub fn is_global(&self) -> bool {
        self.inner.is_global()
    }

    /// Erase the service type
    pub fn erase(&self) -> AnyTag {
        self.inner.clone()
    }
}

impl<S> Clone for Tag<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _service: PhantomData,
        }
    }
}

impl<S> PartialEq for Tag<S> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<S> Eq for Tag<S> {}

impl<S> Hash for Tag<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<S> fmt::Debug for Tag<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("identity", self.inner.identity())
            .field("service", &self.inner.service_name())
            .finish()
    }
}

impl<S> fmt::Display for Tag<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl<S> AsRef<AnyTag> for Tag<S> {
    fn as_ref(&self) -> &AnyTag {
        &self.inner
    }
}

impl<S> From<Tag<S>> for AnyTag {
    fn from(tag: Tag<S>) -> Self {
        tag.inner
    }
}

// =============================================================================
// Guards
// =============================================================================

/// Check whether a dynamically typed value is an erased tag
///
/// Only [`AnyTag`] is recognized. A typed `Tag<S>` is a distinct type per
/// `S` and cannot be identified through `&dyn Any` without knowing `S`:
/// pass `tag.as_ref()` or use [`is_tag_of`].
///
/// ```
/// use tagctx_core::{is_tag, Tag};
///
/// let tag = Tag::<u16>::global("PORT");
/// assert!(!is_tag(&tag));
/// assert!(is_tag(tag.as_ref()));
/// ```
pub fn is_tag(value: &dyn Any) -> bool {
    value.is::<AnyTag>()
}

/// Check whether a dynamically typed value is a `Tag<S>` or an erased tag
pub fn is_tag_of<S: 'static>(value: &dyn Any) -> bool {
    value.is::<Tag<S>>() || is_tag(value)
}

/// Like [`is_tag`], treating absence as "not a tag"
pub fn is_tag_opt(value: Option<&dyn Any>) -> bool {
    value.is_some_and(is_tag)
}
