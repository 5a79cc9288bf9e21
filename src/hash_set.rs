use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::Result;
use crate::hash_table;
use crate::hash_table::Handle;
use crate::hash_table::HashTable;
use crate::hash_table::Identity;
use crate::hash_table::Multi;
use crate::hash_table::Policy;
use crate::hash_table::Unique;

/// A hash set built on the chained [`HashTable`].
///
/// `HashSet<T, P, S>` stores values of type `T` where `T` implements
/// `Hash + Eq`, hashed with the builder `S`. With [`Multi`] (see
/// [`HashMultiSet`]) equal values may be stored several times; they are kept
/// adjacent in iteration order.
pub struct HashSet<T, P = Unique, S = DefaultHashBuilder> {
    table: HashTable<T, Identity, P, S>,
}

/// A [`HashSet`] that admits duplicates.
pub type HashMultiSet<T, S = DefaultHashBuilder> = HashSet<T, Multi, S>;

impl<T, P, S> Clone for HashSet<T, P, S>
where
    T: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<T, S> PartialEq for HashSet<T, Unique, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for HashSet<T, Unique, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, P, S> Debug for HashSet<T, P, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, P, S> Default for HashSet<T, P, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, S> HashSet<T, P, S>
where
    S: Default,
{
    /// Creates an empty set using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty set with exactly `bucket_count` buckets using the
    /// default hasher builder.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn with_bucket_count(bucket_count: usize) -> Self {
        Self::with_bucket_count_and_hasher(bucket_count, S::default())
    }
}

impl<T, P, S> HashSet<T, P, S> {
    /// Creates an empty set with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use chain_hash::hash_set::HashSet;
    /// use chain_hash::hash_table::Unique;
    ///
    /// let set: HashSet<i32, Unique, _> = HashSet::with_hasher(RandomState::new());
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::with_hasher(hash_builder),
        }
    }

    /// Creates an empty set with exactly `bucket_count` buckets and the given
    /// hasher builder.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn with_bucket_count_and_hasher(bucket_count: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_bucket_count_and_hasher(bucket_count, hash_builder),
        }
    }

    /// Returns the number of values in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert_eq!(set.len(), 0);
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Largest number of values the set could ever address.
    pub fn max_size(&self) -> usize {
        self.table.max_size()
    }

    /// Current number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Largest bucket count the set could ever allocate.
    pub fn max_bucket_count(&self) -> usize {
        self.table.max_bucket_count()
    }

    /// Number of values chained in bucket `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.bucket_count()`.
    pub fn bucket_size(&self, index: usize) -> usize {
        self.table.bucket_size(index)
    }

    /// Iterates over the values chained in bucket `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.bucket_count()`.
    pub fn bucket_iter(&self, index: usize) -> hash_table::BucketIter<'_, T> {
        self.table.bucket_iter(index)
    }

    /// Average number of values per bucket.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// The bound the load factor is kept under.
    pub fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    /// Changes the maximum load factor. See
    /// [`HashTable::set_max_load_factor`].
    pub fn set_max_load_factor(&mut self, max_load_factor: f32) -> Result<()> {
        self.table.set_max_load_factor(max_load_factor)
    }

    /// See [`HashTable::rehash`].
    pub fn rehash(&mut self, bucket_count: usize) {
        self.table.rehash(bucket_count);
    }

    /// See [`HashTable::try_rehash`].
    pub fn try_rehash(&mut self, bucket_count: usize) -> Result<()> {
        self.table.try_rehash(bucket_count)
    }

    /// Makes room for at least `additional` more values without rehashing.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Fallible [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.table.try_reserve(additional)
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        self.table.hasher()
    }

    /// Returns bucket-distribution statistics.
    #[cfg(feature = "stats")]
    pub fn chain_stats(&self) -> hash_table::ChainStats {
        self.table.chain_stats()
    }

    /// Returns the value a handle refers to.
    ///
    /// # Panics
    ///
    /// Panics if the handle's value has been removed.
    pub fn get_at(&self, handle: Handle) -> &T {
        self.table.get_at(handle)
    }

    /// Removes the value a handle refers to in O(1) and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the handle's value has already been removed.
    pub fn erase_at(&mut self, handle: Handle) -> T {
        self.table.erase_at(handle)
    }

    /// Removes all values, keeping the bucket count.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Keeps only the values for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = (0..8).collect();
    /// set.retain(|v| v % 2 == 0);
    /// assert_eq!(set.len(), 4);
    /// # }
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        self.table.retain(|v| f(v));
    }

    /// An iterator over all values.
    pub fn iter(&self) -> hash_table::Iter<'_, T> {
        self.table.iter()
    }

    /// Removes all values, returning them in an iterator.
    pub fn drain(&mut self) -> hash_table::Drain<'_, T> {
        self.table.drain()
    }
}

impl<T, P, S> HashSet<T, P, S>
where
    T: Hash + Eq,
    P: Policy,
    S: BuildHasher,
{
    /// Adds a value to the set.
    ///
    /// For a unique set an equal value already present is kept and
    /// `(its handle, false)` is returned. A multiset always inserts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert!(set.insert(2).1);
    /// assert!(!set.insert(2).1);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, value: T) -> (Handle, bool) {
        self.table.insert(value)
    }

    /// Returns `true` if the set contains `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains(value)
    }

    /// Returns the stored value equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.get(value)
    }

    /// Returns a handle to the stored value equal to `value`.
    pub fn find<Q>(&self, value: &Q) -> Option<Handle>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find(value)
    }

    /// Number of stored values equal to `value`.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.count(value)
    }

    /// `1` if a value equal to `value` is stored, `0` otherwise.
    pub fn count_unique<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.count_unique(value)
    }

    /// Iterates over every stored value equal to `value`.
    pub fn equal_range<Q>(&self, value: &Q) -> hash_table::EqualRange<'_, T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.equal_range(value)
    }

    /// Index of the bucket `value` hashes to.
    pub fn bucket<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.table.bucket(value)
    }

    /// Removes every stored value equal to `value`, returning how many were
    /// removed.
    pub fn erase<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.erase(value)
    }

    /// Removes and returns one stored value equal to `value`.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove(value)
    }
}

impl<T, P, S> Extend<T> for HashSet<T, P, S>
where
    T: Hash + Eq,
    P: Policy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.table.extend(iter);
    }
}

impl<T, P, S> FromIterator<T> for HashSet<T, P, S>
where
    T: Hash + Eq,
    P: Policy,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            table: HashTable::from_iter(iter),
        }
    }
}

impl<'a, T, P, S> IntoIterator for &'a HashSet<T, P, S> {
    type IntoIter = hash_table::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, P, S> IntoIterator for HashSet<T, P, S> {
    type IntoIter = hash_table::IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}
