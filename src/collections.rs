//! Collection type aliases that switch between gxhash and std collections
//! based on feature flags, plus the token interner built on top of them.
//! This allows building on systems without specific CPU intrinsics (AES-NI,
//! SSE2) while providing faster hashing on systems that support them.

use std::borrow::Cow;

#[cfg(feature = "gxhash")]
pub use gxhash::{HashMap as GxHashMap, HashMapExt};

#[cfg(not(feature = "gxhash"))]
use std::collections::HashMap as StdHashMap;

/// Type alias for HashMap that uses gxhash when available, std otherwise
#[cfg(feature = "gxhash")]
pub type HashMap<K, V> = GxHashMap<K, V>;

/// Type alias for HashMap that uses gxhash when available, std otherwise
#[cfg(not(feature = "gxhash"))]
pub type HashMap<K, V> = StdHashMap<K, V>;

/// Extension trait for creating HashMap instances
///
/// Mirrors the part of `gxhash::HashMapExt` the crate uses, so callers build
/// maps the same way with either hasher.
#[cfg(not(feature = "gxhash"))]
pub trait HashMapExt {
    /// Creates a new HashMap with specified capacity
    fn with_capacity(capacity: usize) -> Self;
}

#[cfg(not(feature = "gxhash"))]
impl<K, V> HashMapExt for StdHashMap<K, V> {
    fn with_capacity(capacity: usize) -> Self {
        StdHashMap::with_capacity(capacity)
    }
}

/// Maps token comparison keys to dense integer ids
///
/// Ids are shared between both documents so equal keys get equal ids and the
/// aligner compares integers instead of strings.
#[derive(Debug)]
pub(crate) struct Interner<'a> {
    ids: HashMap<Cow<'a, str>, u32>,
}

impl<'a> Interner<'a> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: <HashMap<Cow<'a, str>, u32> as HashMapExt>::with_capacity(capacity),
        }
    }

    /// Id for `key`, allocating the next free one on first sight
    pub(crate) fn intern(&mut self, key: Cow<'a, str>) -> u32 {
        let next = self.ids.len() as u32;
        *self.ids.entry(key).or_insert(next)
    }

    /// Number of distinct keys seen so far
    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}
