//! Key-to-bucket index functions.
//!
//! The map never rehashes, so an indexer only has to be deterministic for
//! as long as the map that owns it is alive.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Maps a key to a slot in `[0, modulus)`.
///
/// Implementations must be total and deterministic: the same key and the
/// same modulus always produce the same index. When a map is queried with a
/// borrowed form `Q` of its key type `K`, `index(q)` must equal `index(k)`
/// whenever `k.borrow() == q`.
pub trait Indexer<Q: ?Sized> {
    fn index(&self, key: &Q, modulus: usize) -> usize;
}

impl<Q, F> Indexer<Q> for F
where
    Q: ?Sized,
    F: Fn(&Q, usize) -> usize,
{
    #[inline]
    fn index(&self, key: &Q, modulus: usize) -> usize {
        self(key, modulus)
    }
}

/// Default indexer: hashes the key once and reduces it modulo the bucket count.
#[derive(Clone, Debug, Default)]
pub struct HashIndexer<S = DefaultHashBuilder> {
    hasher: S,
}

impl<S> HashIndexer<S> {
    pub fn new(hasher: S) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<Q, S> Indexer<Q> for HashIndexer<S>
where
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn index(&self, key: &Q, modulus: usize) -> usize {
        debug_assert!(modulus > 0);
        (self.hasher.hash_one(key) % modulus as u64) as usize
    }
}
