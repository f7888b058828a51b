//! BucketMap: public get/put/compute surface over the stripe table.

use crate::error::{MapError, Operation};
use crate::index::{HashIndexer, Indexer};
use crate::reentrancy::DebugReentrancy;
use crate::stripes::StripeTable;
use core::borrow::Borrow;
use core::fmt;

/// A fixed-capacity concurrent map striped across `bucket_count` buckets,
/// each guarded by its own reader/writer lock.
///
/// Every operation touches exactly one bucket and holds exactly one stripe
/// lock for its whole duration, so operations on the same key are
/// linearizable and no lock ordering between stripes is ever needed.
pub struct BucketMap<K, V, I = HashIndexer> {
    pub(crate) indexer: I,
    pub(crate) stripes: StripeTable<K, V>,
    reentrancy: DebugReentrancy,
}

impl<K, V> BucketMap<K, V>
where
    K: Eq + core::hash::Hash,
{
    /// Create a map with `bucket_count` buckets and a randomly seeded
    /// default hasher.
    pub fn new(bucket_count: usize) -> Result<Self, MapError> {
        Self::with_indexer(bucket_count, HashIndexer::default())
    }
}

impl<K, V, S> BucketMap<K, V, HashIndexer<S>>
where
    K: Eq + core::hash::Hash,
    S: core::hash::BuildHasher,
{
    pub fn with_hasher(bucket_count: usize, hasher: S) -> Result<Self, MapError> {
        Self::with_indexer(bucket_count, HashIndexer::new(hasher))
    }
}

impl<K, V, I> BucketMap<K, V, I>
where
    K: Eq,
    I: Indexer<K>,
{
    /// Create a map that places keys with a caller-supplied indexer.
    pub fn with_indexer(bucket_count: usize, indexer: I) -> Result<Self, MapError> {
        if bucket_count == 0 {
            return Err(MapError::InvalidBucketCount(bucket_count));
        }
        log::debug!("creating bucket map with {} buckets", bucket_count);
        Ok(Self {
            indexer,
            stripes: StripeTable::new(bucket_count),
            reentrancy: DebugReentrancy::new(),
        })
    }

    /// Store `value` under `key`, returning the value it replaced.
    pub fn put(&self, key: K, value: V) -> Result<Option<V>, MapError> {
        let bucket = self.bucket_of(&key)?;
        let _g = self.reentrancy.enter();
        let mut b = self.stripes.write(bucket)?;
        Ok(b.upsert(key, value))
    }

    /// Atomically recompute the value for `key`.
    ///
    /// `remap` receives the key and its current value, if any, and runs while
    /// the key's bucket is write-locked, so the read-modify-write cannot
    /// interleave with any other operation on that key. A `Some` result is
    /// stored (inserting or replacing); `None` removes the entry if present.
    /// Returns the value stored afterwards.
    ///
    /// `remap` must not call back into this map; debug builds panic if it does.
    pub fn compute<F>(&self, key: K, remap: F) -> Result<Option<V>, MapError>
    where
        V: Clone,
        F: FnOnce(&K, Option<&V>) -> Option<V>,
    {
        let bucket = self.bucket_of(&key)?;
        let _g = self.reentrancy.enter();
        let mut b = self.stripes.write(bucket)?;
        Ok(b.apply(key, remap).cloned())
    }
}

impl<K, V, I> BucketMap<K, V, I>
where
    K: Eq,
{
    /// Number of buckets, fixed at construction.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.stripes.len()
    }

    fn bucket_of<Q>(&self, key: &Q) -> Result<usize, MapError>
    where
        Q: ?Sized,
        I: Indexer<Q>,
    {
        let bucket_count = self.stripes.len();
        let index = self.indexer.index(key, bucket_count);
        if index < bucket_count {
            Ok(index)
        } else {
            Err(MapError::IndexOutOfRange {
                index,
                bucket_count,
            })
        }
    }

    /// Clone out the value for `key`.
    pub fn get<Q>(&self, key: &Q) -> Result<Option<V>, MapError>
    where
        V: Clone,
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        I: Indexer<Q>,
    {
        self.get_with(key, V::clone)
    }

    /// Run `f` on the value for `key` under the bucket's read lock.
    pub fn get_with<Q, R, F>(&self, key: &Q, f: F) -> Result<Option<R>, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        I: Indexer<Q>,
        F: FnOnce(&V) -> R,
    {
        let bucket = self.bucket_of(key)?;
        let _g = self.reentrancy.enter();
        let b = self.stripes.read(bucket)?;
        Ok(b.get(key).map(f))
    }

    #[cold]
    fn unsupported<T>(&self, op: Operation) -> Result<T, MapError> {
        log::debug!("rejected unsupported operation {}", op);
        Err(MapError::Unsupported(op))
    }

    /// Unsupported: the map keeps no entry count.
    pub fn len(&self) -> Result<usize, MapError> {
        self.unsupported(Operation::Len)
    }

    /// Unsupported: the map keeps no entry count.
    pub fn is_empty(&self) -> Result<bool, MapError> {
        self.unsupported(Operation::IsEmpty)
    }

    /// Unsupported: use `get` or `get_with` instead.
    pub fn contains_key<Q>(&self, _key: &Q) -> Result<bool, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
    {
        self.unsupported(Operation::ContainsKey)
    }

    /// Unsupported: would need every stripe.
    pub fn contains_value(&self, _value: &V) -> Result<bool, MapError> {
        self.unsupported(Operation::ContainsValue)
    }

    /// Unsupported: express as `compute`.
    pub fn put_if_absent(&self, _key: K, _value: V) -> Result<Option<V>, MapError> {
        self.unsupported(Operation::PutIfAbsent)
    }

    /// Unsupported: bulk mutation.
    pub fn put_all<T>(&self, _entries: T) -> Result<(), MapError>
    where
        T: IntoIterator<Item = (K, V)>,
    {
        self.unsupported(Operation::PutAll)
    }

    /// Unsupported: express as `compute`.
    pub fn replace(&self, _key: K, _value: V) -> Result<Option<V>, MapError> {
        self.unsupported(Operation::Replace)
    }

    /// Unsupported: express as `compute`.
    pub fn replace_if_eq(&self, _key: K, _expected: &V, _value: V) -> Result<bool, MapError> {
        self.unsupported(Operation::ReplaceIfEq)
    }

    /// Unsupported: bulk mutation.
    pub fn clear(&self) -> Result<(), MapError> {
        self.unsupported(Operation::Clear)
    }

    /// Unsupported: remove with `compute` returning `None`.
    pub fn remove<Q>(&self, _key: &Q) -> Result<Option<V>, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
    {
        self.unsupported(Operation::Remove)
    }

    /// Unsupported: express as `compute`.
    pub fn remove_if_eq<Q>(&self, _key: &Q, _expected: &V) -> Result<bool, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
    {
        self.unsupported(Operation::RemoveIfEq)
    }

    /// Unsupported: no table-wide views.
    pub fn keys(&self) -> Result<Vec<K>, MapError> {
        self.unsupported(Operation::Keys)
    }

    /// Unsupported: no table-wide views.
    pub fn values(&self) -> Result<Vec<V>, MapError> {
        self.unsupported(Operation::Values)
    }

    /// Unsupported: no table-wide views.
    pub fn entries(&self) -> Result<Vec<(K, V)>, MapError> {
        self.unsupported(Operation::Entries)
    }
}

impl<K, V, I> fmt::Debug for BucketMap<K, V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketMap")
            .field("bucket_count", &self.stripes.len())
            .finish_non_exhaustive()
    }
}
