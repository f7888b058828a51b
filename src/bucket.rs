//! Bucket: the entries that share one slot, found by linear scan.
//!
//! No locking happens here; every method assumes the caller holds the
//! bucket's stripe lock in the matching mode.

use core::borrow::Borrow;

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    key: K,
    value: V,
}

/// Insertion-ordered entries for one slot. A key appears at most once.
#[derive(Debug)]
pub(crate) struct Bucket<K, V> {
    entries: Vec<Entry<K, V>>,
}

impl<K, V> Bucket<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: Eq, V> Bucket<K, V> {
    fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.entries.iter().position(|e| e.key.borrow() == key)
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.position(key).map(|i| &self.entries[i].value)
    }

    /// Replace the value in place if `key` is present, otherwise append.
    /// Returns the previous value.
    pub(crate) fn upsert(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Some(i) => Some(core::mem::replace(&mut self.entries[i].value, value)),
            None => {
                self.entries.push(Entry { key, value });
                None
            }
        }
    }

    /// Read-modify-write for one key. `remap` sees the current value and
    /// its result decides the entry's fate:
    ///
    /// | current | result  | effect            |
    /// |---------|---------|-------------------|
    /// | absent  | present | insert            |
    /// | absent  | absent  | nothing           |
    /// | present | present | replace in place  |
    /// | present | absent  | remove            |
    ///
    /// Returns a reference to the value now stored, if any.
    pub(crate) fn apply<F>(&mut self, key: K, remap: F) -> Option<&V>
    where
        F: FnOnce(&K, Option<&V>) -> Option<V>,
    {
        match self.position(&key) {
            Some(i) => match remap(&key, Some(&self.entries[i].value)) {
                Some(v) => {
                    let slot = &mut self.entries[i].value;
                    *slot = v;
                    Some(&*slot)
                }
                None => {
                    self.entries.remove(i);
                    None
                }
            },
            None => {
                let v = remap(&key, None)?;
                self.entries.push(Entry { key, value: v });
                self.entries.last().map(|e| &e.value)
            }
        }
    }
}

impl<K, V> Default for Bucket<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
