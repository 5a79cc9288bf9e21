use alloc::collections::TryReserveError;

/// Errors reported by the fallible growth operations of
/// [`HashTable`](crate::HashTable) and its front-ends.
///
/// Every operation that returns this error leaves the container exactly as it
/// was before the call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested bucket count exceeds what can be addressed.
    #[error("requested {requested} buckets but at most {max} can be allocated")]
    CapacityOverflow {
        /// Bucket count that was asked for.
        requested: usize,
        /// The container's `max_bucket_count`.
        max: usize,
    },
    /// The allocator could not provide a new bucket array.
    #[error("bucket array allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
}

/// Shorthand for results carrying [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
