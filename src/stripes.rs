//! StripeTable: one reader/writer lock per bucket.
//!
//! Each `RwLock` owns the bucket it guards, so stripe `i` and bucket `i`
//! are aligned by construction and bucket contents are unreachable without
//! holding the lock. Guards are RAII: every exit path, including unwinding
//! out of a caller-supplied closure, releases the stripe.

use crate::bucket::Bucket;
use crate::error::MapError;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) struct StripeTable<K, V> {
    stripes: Box<[RwLock<Bucket<K, V>>]>,
}

impl<K, V> StripeTable<K, V> {
    /// Allocate `len` empty buckets. Callers validate `len > 0`.
    pub(crate) fn new(len: usize) -> Self {
        debug_assert!(len > 0);
        let stripes = (0..len).map(|_| RwLock::new(Bucket::new())).collect();
        Self { stripes }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.stripes.len()
    }

    fn stripe(&self, bucket: usize) -> Result<&RwLock<Bucket<K, V>>, MapError> {
        self.stripes.get(bucket).ok_or(MapError::IndexOutOfRange {
            index: bucket,
            bucket_count: self.stripes.len(),
        })
    }

    /// Block until no writer holds `bucket`, then share it.
    pub(crate) fn read(&self, bucket: usize) -> Result<RwLockReadGuard<'_, Bucket<K, V>>, MapError> {
        self.stripe(bucket)?.read().map_err(|_| poisoned(bucket))
    }

    /// Block until `bucket` is free of readers and writers, then own it.
    pub(crate) fn write(&self, bucket: usize) -> Result<RwLockWriteGuard<'_, Bucket<K, V>>, MapError> {
        self.stripe(bucket)?.write().map_err(|_| poisoned(bucket))
    }
}

#[cold]
fn poisoned(bucket: usize) -> MapError {
    log::warn!("stripe lock for bucket {} is poisoned", bucket);
    MapError::Poisoned { bucket }
}
