use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::Result;
use crate::hash_table;
use crate::hash_table::First;
use crate::hash_table::Handle;
use crate::hash_table::HashTable;
use crate::hash_table::Multi;
use crate::hash_table::Policy;
use crate::hash_table::Unique;

/// A hash map built on the chained [`HashTable`].
///
/// `HashMap<K, V, P, S>` stores `(K, V)` pairs where keys implement
/// `Hash + Eq`, hashed with the builder `S`. With the default policy
/// [`Unique`] each key maps to at most one value; with [`Multi`] (see
/// [`HashMultiMap`]) a key may map to any number of values, which are kept
/// adjacent in iteration order.
///
/// # Performance Characteristics
///
/// - **Memory**: one slab node per entry, holding the `(K, V)` pair, its
///   `u64` hash and two links, plus 24 bytes per bucket.
/// - **Handles**: [`insert`](Self::insert) and [`find`](Self::find) return a
///   [`Handle`] that survives rehashing and gives O(1) access and removal.
pub struct HashMap<K, V, P = Unique, S = DefaultHashBuilder> {
    table: HashTable<(K, V), First, P, S>,
}

/// A [`HashMap`] that admits several values per key.
pub type HashMultiMap<K, V, S = DefaultHashBuilder> = HashMap<K, V, Multi, S>;

impl<K, V, P, S> Clone for HashMap<K, V, P, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<K, V, P, S> Debug for HashMap<K, V, P, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, Unique, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for HashMap<K, V, Unique, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, P, S> Default for HashMap<K, V, P, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, P, S> HashMap<K, V, P, S>
where
    S: Default,
{
    /// Creates an empty map using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.bucket_count(), 3);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty map with exactly `bucket_count` buckets using the
    /// default hasher builder.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn with_bucket_count(bucket_count: usize) -> Self {
        Self::with_bucket_count_and_hasher(bucket_count, S::default())
    }
}

impl<K, V, P, S> HashMap<K, V, P, S> {
    /// Creates an empty map with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use chain_hash::hash_map::HashMap;
    /// use chain_hash::hash_table::Unique;
    ///
    /// let map: HashMap<i32, String, Unique, _> = HashMap::with_hasher(RandomState::new());
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::with_hasher(hash_builder),
        }
    }

    /// Creates an empty map with exactly `bucket_count` buckets and the given
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

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Largest number of entries the map could ever address.
    pub fn max_size(&self) -> usize {
        self.table.max_size()
    }

    /// Current number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Largest bucket count the map could ever allocate.
    pub fn max_bucket_count(&self) -> usize {
        self.table.max_bucket_count()
    }

    /// Number of entries chained in bucket `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.bucket_count()`.
    pub fn bucket_size(&self, index: usize) -> usize {
        self.table.bucket_size(index)
    }

    /// Iterates over the entries chained in bucket `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.bucket_count()`.
    pub fn bucket_iter(&self, index: usize) -> impl ExactSizeIterator<Item = (&K, &V)> {
        self.table.bucket_iter(index).map(|(k, v)| (k, v))
    }

    /// Average number of entries per bucket.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// The bound the load factor is kept under.
    pub fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    /// Changes the maximum load factor, rehashing immediately if the current
    /// load factor exceeds it. See [`HashTable::set_max_load_factor`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = (0..10).map(|i| (i, i)).collect();
    /// map.set_max_load_factor(0.5)?;
    /// assert!(map.bucket_count() >= 20);
    /// # }
    /// # Ok::<(), chain_hash::Error>(())
    /// ```
    pub fn set_max_load_factor(&mut self, max_load_factor: f32) -> Result<()> {
        self.table.set_max_load_factor(max_load_factor)
    }

    /// Rebuilds the map with exactly `bucket_count` buckets unless that would
    /// exceed the maximum load factor. See [`HashTable::rehash`].
    pub fn rehash(&mut self, bucket_count: usize) {
        self.table.rehash(bucket_count);
    }

    /// Fallible [`rehash`](Self::rehash).
    pub fn try_rehash(&mut self, bucket_count: usize) -> Result<()> {
        self.table.try_rehash(bucket_count)
    }

    /// Makes room for at least `additional` more entries without rehashing.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Fallible [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.table.try_reserve(additional)
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        self.table.hasher()
    }

    /// Returns bucket-distribution statistics.
    #[cfg(feature = "stats")]
    pub fn chain_stats(&self) -> hash_table::ChainStats {
        self.table.chain_stats()
    }

    /// Returns the entry a handle refers to.
    ///
    /// # Panics
    ///
    /// Panics if the handle's entry has been removed.
    pub fn get_at(&self, handle: Handle) -> (&K, &V) {
        let (k, v) = self.table.get_at(handle);
        (k, v)
    }

    /// Returns the value a handle refers to, mutably.
    ///
    /// # Panics
    ///
    /// Panics if the handle's entry has been removed.
    pub fn get_at_mut(&mut self, handle: Handle) -> &mut V {
        &mut self.table.get_at_mut(handle).1
    }

    /// Removes the entry a handle refers to in O(1) and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the handle's entry has already been removed.
    pub fn erase_at(&mut self, handle: Handle) -> (K, V) {
        self.table.erase_at(handle)
    }

    /// Removes all entries, keeping the bucket count.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(|(k, v)| f(k, v));
    }

    /// An iterator over all key-value pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map: HashMap<&str, i32> = HashMap::new();
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// let mut total = 0;
    /// for (_, v) in map.iter() {
    ///     total += v;
    /// }
    /// assert_eq!(total, 3);
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// An iterator over all key-value pairs with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// An iterator over all keys. Keys of a multimap repeat once per value.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// An iterator over all values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// An iterator over all values, mutably.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes all entries, returning them in an iterator.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<K, V, P, S> HashMap<K, V, P, S>
where
    K: Hash + Eq,
    P: Policy,
    S: BuildHasher,
{
    /// Inserts a key-value pair.
    ///
    /// For a unique map an existing entry with an equal key is left untouched
    /// and `(its handle, false)` is returned; use
    /// [`insert_or_assign`](Self::insert_or_assign) to overwrite. A multimap
    /// always inserts and returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// let (handle, inserted) = map.insert(37, "a");
    /// assert!(inserted);
    ///
    /// let (again, inserted) = map.insert(37, "b");
    /// assert!(!inserted);
    /// assert_eq!(again, handle);
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// # }
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (Handle, bool) {
        self.table.insert((key, value))
    }

    /// Inserts a key-value pair, overwriting the value of an existing entry
    /// with an equal key. Returns the previous value, if any.
    ///
    /// For a multimap the first entry of the key's run is overwritten.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// assert_eq!(map.insert_or_assign(37, "a"), None);
    /// assert_eq!(map.insert_or_assign(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// # }
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Option<V> {
        match self.table.get_mut(&key) {
            Some((_, slot)) => Some(core::mem::replace(slot, value)),
            None => {
                self.table.insert((key, value));
                None
            }
        }
    }

    /// Returns the value stored for `key`, inserting `default()` first if
    /// there is none.
    pub fn get_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
        let handle = match self.table.find(&key) {
            Some(handle) => handle,
            None => self.table.insert((key, default())).0,
        };
        &mut self.table.get_at_mut(handle).1
    }

    /// Returns a handle to an entry with key `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find(key)
    }

    /// Returns a reference to the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMap;
    ///
    /// let mut map: HashMap<String, i32> = HashMap::new();
    /// map.insert("one".to_string(), 1);
    /// assert_eq!(map.get("one"), Some(&1));
    /// assert_eq!(map.get("two"), None);
    /// # }
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.get(key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.get_mut(key).map(|(_, v)| v)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.get(key).map(|(k, v)| (k, v))
    }

    /// Returns `true` if the map holds an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains(key)
    }

    /// Number of entries stored for `key`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.count(key)
    }

    /// `1` if the map holds an entry for `key`, `0` otherwise.
    pub fn count_unique<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.count_unique(key)
    }

    /// Iterates over every entry stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashMultiMap;
    ///
    /// let mut map: HashMultiMap<&str, i32> = HashMultiMap::new();
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    /// map.insert("a", 3);
    ///
    /// let mut values: Vec<i32> = map.equal_range("a").map(|(_, v)| *v).collect();
    /// values.sort();
    /// assert_eq!(values, [1, 3]);
    /// # }
    /// ```
    pub fn equal_range<Q>(&self, key: &Q) -> EqualRange<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        EqualRange {
            inner: self.table.equal_range(key),
        }
    }

    /// Index of the bucket `key` hashes to.
    pub fn bucket<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.table.bucket(key)
    }

    /// Removes every entry stored for `key`, returning how many were removed.
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.erase(key)
    }

    /// Removes one entry stored for `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove(key).map(|(_, v)| v)
    }

    /// Removes one entry stored for `key` and returns it.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove(key)
    }
}

impl<K, V, P, S> Extend<(K, V)> for HashMap<K, V, P, S>
where
    K: Hash + Eq,
    P: Policy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.table.extend(iter);
    }
}

impl<K, V, P, S> FromIterator<(K, V)> for HashMap<K, V, P, S>
where
    K: Hash + Eq,
    P: Policy,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            table: HashTable::from_iter(iter),
        }
    }
}

impl<'a, K, V, P, S> IntoIterator for &'a HashMap<K, V, P, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, P, S> IntoIterator for &'a mut HashMap<K, V, P, S> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, P, S> IntoIterator for HashMap<K, V, P, S> {
    type IntoIter = hash_table::IntoIter<(K, V)>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// A mutable iterator over the key-value pairs of a `HashMap`.
pub struct IterMut<'a, K, V> {
    inner: hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// The entries stored for one key, see [`HashMap::equal_range`].
pub struct EqualRange<'a, K, V> {
    inner: hash_table::EqualRange<'a, (K, V)>,
}

impl<'a, K, V> Iterator for EqualRange<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for EqualRange<'_, K, V> {}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
