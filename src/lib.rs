//! bucket-map: a fixed-capacity, lock-striped concurrent map with
//! atomic per-key compute.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: let many threads share one key-value table without a global
//!   lock, while keeping every read-modify-write on a key indivisible.
//! - Layers:
//!   - Indexer<Q>: maps a key to a bucket in `[0, bucket_count)`. The
//!     default `HashIndexer` hashes once with a stored `BuildHasher`; any
//!     `Fn(&Q, usize) -> usize` also works.
//!   - Bucket<K, V>: insertion-ordered entries found by linear scan. No
//!     locking of its own.
//!   - StripeTable<K, V>: one `RwLock` per bucket; each lock owns its
//!     bucket so the two can never drift out of alignment.
//!   - BucketMap<K, V, I>: public API (`get`, `get_with`, `put`,
//!     `compute`) that picks a bucket and takes its stripe lock.
//!
//! Constraints
//! - Fixed capacity: `bucket_count` is set at construction and never
//!   changes, so a key's bucket never changes either.
//! - One lock per operation: every call is keyed by a single key, touches
//!   a single bucket, and holds a single stripe. No lock ordering exists
//!   because no two stripes are ever held together.
//! - Linearizable per key: operations on one key are totally ordered by
//!   acquisition of that key's stripe. Keys in different buckets are
//!   independent; keys sharing a bucket serialize but do not interfere.
//! - Blocking only: acquisitions always block until granted. There is no
//!   try-lock path, so no access to bucket contents is ever unguarded.
//!
//! Failure model
//! - `MapError::InvalidBucketCount`: zero buckets, rejected up front.
//! - `MapError::Unsupported`: table-wide views and bulk mutation (`len`,
//!   `contains_key`, `clear`, `keys`, ...) are outside the contract and
//!   fail immediately instead of returning a degenerate answer.
//! - `MapError::Poisoned`: a thread panicked while holding a stripe (for
//!   example inside a `compute` closure). Poison is per stripe and is
//!   reported on every later access to that bucket.
//! - `MapError::IndexOutOfRange`: a custom indexer broke its contract.
//!
//! Reentrancy policy
//! - `compute` runs the caller's closure under the bucket's write lock.
//!   Calling back into the same map from that closure is not allowed: the
//!   stripe is not reentrant and a second stripe would break the
//!   one-lock rule. Debug builds detect this with a per-thread guard and
//!   panic instead of deadlocking; release builds do not check.
//!
//! Notes and non-goals
//! - No resizing, iteration, ordering or size queries.
//! - Absence is always `None`; there is no in-band sentinel value.
//! - The crate logs through the `log` facade and installs no logger.

mod bucket;
mod bucket_map_proptest;
mod error;
pub mod index;
mod map;
mod reentrancy;
mod stripes;

// Public surface
pub use error::{MapError, Operation};
pub use index::{HashIndexer, Indexer};
pub use map::BucketMap;
