//! A sorted, deduplicated set stored in one contiguous `Vec`.
//!
//! Lookups are binary searches; insertions and removals shift the tail of the
//! vector. Positions are plain indices, so they are invalidated by any
//! insertion or removal in front of them.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::iter::FusedIterator;
use core::iter::Peekable;
use core::ops::Range;
use core::ops::RangeBounds;

/// An ordered set of unique keys backed by a sorted `Vec<T>`.
///
/// Comparison between sets is lexicographic over their sorted contents.
///
/// # Examples
///
/// ```rust
/// use chain_hash::FlatSet;
///
/// let set: FlatSet<i32> = [3, 9, 2, 1, 3].into_iter().collect();
/// assert_eq!(set.as_slice(), &[1, 2, 3, 9]);
/// assert_eq!(set.lower_bound(&4), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlatSet<T> {
    items: Vec<T>,
}

impl<T> Default for FlatSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FlatSet<T> {
    /// Creates an empty set.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates an empty set with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The keys in ascending order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterates over the keys in ascending order.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Smallest key.
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Largest key.
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Removes and returns the key at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn erase_at(&mut self, index: usize) -> T {
        self.items.remove(index)
    }

    /// Removes the keys at the given positions.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn erase_range(&mut self, range: impl RangeBounds<usize>) {
        self.items.drain(range);
    }
}

impl<T: Ord> FlatSet<T> {
    /// Builds a set from a vector that is already strictly increasing.
    ///
    /// Ordering is only checked in debug builds.
    pub fn from_sorted_vec(items: Vec<T>) -> Self {
        debug_assert!(items.windows(2).all(|w| w[0] < w[1]));
        Self { items }
    }

    /// Inserts `key`, returning its position and whether it was newly added.
    pub fn insert(&mut self, key: T) -> (usize, bool) {
        match self.items.binary_search(&key) {
            Ok(index) => (index, false),
            Err(index) => {
                self.items.insert(index, key);
                (index, true)
            }
        }
    }

    /// Removes `key`, returning how many keys were removed (0 or 1).
    pub fn erase(&mut self, key: &T) -> usize {
        match self.items.binary_search(key) {
            Ok(index) => {
                self.items.remove(index);
                1
            }
            Err(_) => 0,
        }
    }

    /// Position of `key`, if present.
    pub fn find(&self, key: &T) -> Option<usize> {
        self.items.binary_search(key).ok()
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &T) -> bool {
        self.find(key).is_some()
    }

    /// `1` if `key` is present, `0` otherwise.
    pub fn count(&self, key: &T) -> usize {
        usize::from(self.contains(key))
    }

    /// Position of the first key not less than `key`.
    pub fn lower_bound(&self, key: &T) -> usize {
        self.items.partition_point(|k| k < key)
    }

    /// Position of the first key greater than `key`.
    pub fn upper_bound(&self, key: &T) -> usize {
        self.items.partition_point(|k| k <= key)
    }

    /// Positions of the keys equal to `key`: empty, or exactly one element.
    pub fn equal_range(&self, key: &T) -> Range<usize> {
        self.lower_bound(key)..self.upper_bound(key)
    }

    /// Keys of `self` that are not in `other`, in ascending order.
    ///
    /// Runs in `O(self.len() + other.len())`.
    pub fn difference<'a>(&'a self, other: &'a FlatSet<T>) -> Difference<'a, T> {
        Difference {
            left: self.items.iter(),
            right: other.items.iter().peekable(),
        }
    }
}

/// Sorted merge yielding the keys of one [`FlatSet`] missing from another.
pub struct Difference<'a, T> {
    left: core::slice::Iter<'a, T>,
    right: Peekable<core::slice::Iter<'a, T>>,
}

impl<'a, T: Ord> Iterator for Difference<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        'left: for key in self.left.by_ref() {
            while let Some(&other) = self.right.peek() {
                match other.cmp(key) {
                    Ordering::Less => {
                        self.right.next();
                    }
                    Ordering::Equal => {
                        self.right.next();
                        continue 'left;
                    }
                    Ordering::Greater => break,
                }
            }
            return Some(key);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.left.size_hint().1)
    }
}

impl<T: Ord> FusedIterator for Difference<'_, T> {}

impl<T: Ord> FromIterator<T> for FlatSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut items: Vec<T> = iter.into_iter().collect();
        items.sort_unstable();
        items.dedup();
        Self { items }
    }
}

impl<T: Ord> Extend<T> for FlatSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<T> IntoIterator for FlatSet<T> {
    type IntoIter = alloc::vec::IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a FlatSet<T> {
    type IntoIter = core::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
