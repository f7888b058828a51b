//! Closed error taxonomy for `BucketMap`.

use core::fmt;

/// Table-wide or bulk operations the map deliberately does not provide.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operation {
    Len,
    IsEmpty,
    ContainsKey,
    ContainsValue,
    PutIfAbsent,
    PutAll,
    Replace,
    ReplaceIfEq,
    Clear,
    Remove,
    RemoveIfEq,
    Keys,
    Values,
    Entries,
}

impl Operation {
    /// Method name as it appears on `BucketMap`.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Len => "len",
            Operation::IsEmpty => "is_empty",
            Operation::ContainsKey => "contains_key",
            Operation::ContainsValue => "contains_value",
            Operation::PutIfAbsent => "put_if_absent",
            Operation::PutAll => "put_all",
            Operation::Replace => "replace",
            Operation::ReplaceIfEq => "replace_if_eq",
            Operation::Clear => "clear",
            Operation::Remove => "remove",
            Operation::RemoveIfEq => "remove_if_eq",
            Operation::Keys => "keys",
            Operation::Values => "values",
            Operation::Entries => "entries",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MapError {
    /// Construction with a bucket count of zero.
    InvalidBucketCount(usize),
    /// The operation is outside the map's get/put/compute contract.
    Unsupported(Operation),
    /// A thread panicked while holding this bucket's stripe lock.
    Poisoned { bucket: usize },
    /// The indexer returned a slot outside `[0, bucket_count)`.
    IndexOutOfRange { index: usize, bucket_count: usize },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidBucketCount(n) => {
                write!(f, "bucket count must be positive, got {n}")
            }
            MapError::Unsupported(op) => write!(f, "unsupported operation: {op}"),
            MapError::Poisoned { bucket } => {
                write!(f, "stripe lock for bucket {bucket} is poisoned")
            }
            MapError::IndexOutOfRange {
                index,
                bucket_count,
            } => write!(
                f,
                "indexer returned {index}, outside of [0, {bucket_count})"
            ),
        }
    }
}

impl std::error::Error for MapError {}
