#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bucket;

/// Errors reported by fallible rehash and reserve operations.
pub mod error;

pub mod hash_table;

/// A hash map front-end for the chained hash table.
///
/// This module provides `HashMap` and `HashMultiMap`, which wrap the
/// `HashTable` and provide a key-value interface with configurable hashers.
pub mod hash_map;

/// A hash set front-end for the chained hash table.
///
/// This module provides `HashSet` and `HashMultiSet`, which wrap the
/// `HashTable` and provide a set interface with configurable hashers.
pub mod hash_set;

pub mod flat_set;

pub mod geometry;

pub mod sparse_grid;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder when neither `foldhash` nor `std` is enabled. It
        /// implements no hashing, so containers must be built with an explicit
        /// hasher via their `with_hasher` constructors.
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}

pub use error::Error;
pub use error::Result;
pub use flat_set::FlatSet;
pub use hash_map::HashMap;
pub use hash_map::HashMultiMap;
pub use hash_set::HashMultiSet;
pub use hash_set::HashSet;
pub use hash_table::Handle;
pub use hash_table::HashTable;
pub use sparse_grid::GridPosition;
pub use sparse_grid::SparseGrid;
