//! The chained hash table engine shared by every map and set in this crate.
//!
//! A [`HashTable`] stores entries of type `E`. The key of an entry is
//! projected out by a [`KeyOf`] implementation ([`Identity`] for sets,
//! [`First`] for `(K, V)` maps) and the [`Policy`] parameter decides whether
//! equal keys may coexist ([`Multi`]) or not ([`Unique`]).
//!
//! Each bucket is a doubly linked chain of nodes. Nodes live in a slab and are
//! never moved once inserted, which is what keeps a [`Handle`] valid across
//! rehashes. Each node also records the full hash of its key, so rebuilding the
//! bucket array never calls the hasher again.

use alloc::alloc::handle_alloc_error;
use alloc::collections::TryReserveError;
use alloc::vec;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::marker::PhantomData;

use crate::DefaultHashBuilder;
use crate::bucket::Bucket;
use crate::bucket::NIL;
use crate::bucket::Nodes;
use crate::bucket::Slot;
use crate::error::Error;
use crate::error::Result;

/// Bucket count of a freshly constructed table.
pub const DEFAULT_BUCKET_COUNT: usize = 3;

/// Maximum load factor of a freshly constructed table.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 1.0;

/// Projects the lookup key out of a stored entry.
pub trait KeyOf<E> {
    /// The key type entries are hashed and compared by.
    type Key;

    /// Returns the key of `entry`.
    fn key(entry: &E) -> &Self::Key;
}

/// Key extraction for sets: the entry is its own key.
#[derive(Debug)]
pub enum Identity {}

impl<T> KeyOf<T> for Identity {
    type Key = T;

    #[inline]
    fn key(entry: &T) -> &T {
        entry
    }
}

/// Key extraction for maps: the key is the first element of a `(K, V)` pair.
#[derive(Debug)]
pub enum First {}

impl<K, V> KeyOf<(K, V)> for First {
    type Key = K;

    #[inline]
    fn key(entry: &(K, V)) -> &K {
        &entry.0
    }
}

/// Decides whether a table admits several entries with equal keys.
pub trait Policy {
    /// `true` if at most one entry per key may be stored.
    const UNIQUE: bool;
}

/// At most one entry per key.
#[derive(Debug)]
pub enum Unique {}

impl Policy for Unique {
    const UNIQUE: bool = true;
}

/// Any number of entries per key. Entries with equal keys are kept adjacent in
/// iteration order.
#[derive(Debug)]
pub enum Multi {}

impl Policy for Multi {
    const UNIQUE: bool = false;
}

/// A stable reference to one stored entry.
///
/// A handle stays valid across rehashes and across the removal of other
/// entries. It is invalidated when its own entry is removed or the table is
/// cleared or drained. Passing an invalidated handle back to the table that
/// issued it panics or, if the slot has since been reused, addresses the new
/// entry; handles from a different table address arbitrary entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(usize);

#[derive(Clone, Copy)]
enum Fallibility {
    Fallible,
    Infallible,
}

impl Fallibility {
    #[cold]
    fn capacity_overflow(self, requested: usize, max: usize) -> Error {
        match self {
            Fallibility::Fallible => Error::CapacityOverflow { requested, max },
            Fallibility::Infallible => {
                panic!("capacity overflow: requested {requested} buckets, max is {max}")
            }
        }
    }

    /// `requested` counts elements of type `T`, named `what` in the panic
    /// message.
    #[cold]
    fn alloc_err<T>(self, err: TryReserveError, requested: usize, what: &str) -> Error {
        match self {
            Fallibility::Fallible => Error::Alloc(err),
            Fallibility::Infallible => match Layout::array::<T>(requested) {
                Ok(layout) => handle_alloc_error(layout),
                Err(_) => panic!("capacity overflow: requested {requested} {what}"),
            },
        }
    }
}

/// Smallest bucket count for which `len / n <= max_load_factor` holds when
/// evaluated in `f32`, the precision [`HashTable::load_factor`] reports in.
fn buckets_for(len: usize, max_load_factor: f32) -> usize {
    let mut n = ((len as f64 / f64::from(max_load_factor)) as usize).max(1);
    while n < usize::MAX && len as f32 / n as f32 > max_load_factor {
        // Step by roughly one f32 ulp of `n`.
        n = n.saturating_add(1 + (n >> 24));
    }
    n
}

/// Summary of how entries are spread over the buckets of a table.
///
/// Requires the `stats` feature.
#[cfg(feature = "stats")]
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStats {
    /// Number of stored entries.
    pub entries: usize,
    /// Number of buckets.
    pub buckets: usize,
    /// Number of buckets holding no entries.
    pub empty_buckets: usize,
    /// Length of the longest chain.
    pub longest_chain: usize,
    /// Current load factor.
    pub load_factor: f32,
    /// Configured maximum load factor.
    pub max_load_factor: f32,
    /// `histogram[n]` is the number of buckets whose chain holds `n` entries.
    pub histogram: Vec<usize>,
}

#[cfg(feature = "stats")]
impl ChainStats {
    /// Pretty-print the statistics and a horizontal chain length histogram.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Chain Statistics ===");
        println!(
            "Population: {} entries in {} buckets ({:.3} load factor, max {:.3})",
            self.entries, self.buckets, self.load_factor, self.max_load_factor
        );
        println!(
            "Empty buckets: {} ({:.2}%)",
            self.empty_buckets,
            if self.buckets == 0 {
                0.0
            } else {
                self.empty_buckets as f64 / self.buckets as f64 * 100.0
            }
        );
        println!("Longest chain: {}", self.longest_chain);

        let max = self.histogram.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return;
        }
        const WIDTH: usize = 50;
        for (len, &count) in self.histogram.iter().enumerate() {
            let bar = count * WIDTH / max;
            println!("{len:>4} | {:<WIDTH$} {count}", "#".repeat(bar));
        }
    }
}

/// A separately chained hash table with a configurable maximum load factor.
///
/// `HashTable<E, X, P, S>` stores entries of type `E`, keyed through `X`,
/// under uniqueness policy `P`, hashed with `S`. Most users want the
/// [`HashMap`](crate::HashMap) and [`HashSet`](crate::HashSet) front-ends,
/// which fix `X` for them.
///
/// The table always has at least one bucket. After every insertion the load
/// factor (`len / bucket_count`) is compared against the maximum load factor;
/// when it is exceeded the bucket count grows to `2 * bucket_count + 1` until
/// the bound holds again.
///
/// ## Example
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use chain_hash::hash_table::HashTable;
/// use chain_hash::hash_table::Identity;
/// use chain_hash::hash_table::Multi;
///
/// let mut table: HashTable<&str, Identity, Multi> = HashTable::new();
/// table.insert("apple");
/// table.insert("pear");
/// table.insert("apple");
///
/// assert_eq!(table.count("apple"), 2);
/// assert_eq!(table.equal_range("apple").count(), 2);
/// assert!(table.load_factor() <= table.max_load_factor());
/// # }
/// ```
pub struct HashTable<E, X, P, S = DefaultHashBuilder> {
    nodes: Nodes<E>,
    buckets: Vec<Bucket>,
    len: usize,
    max_load_factor: f32,
    hash_builder: S,
    marker: PhantomData<fn() -> (X, P)>,
}

impl<E, X, P, S> Debug for HashTable<E, X, P, S>
where
    E: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("len", &self.len)
            .field("bucket_count", &self.buckets.len())
            .field("max_load_factor", &self.max_load_factor)
            .field("entries", &DebugEntries(self))
            .finish()
    }
}

struct DebugEntries<'a, E, X, P, S>(&'a HashTable<E, X, P, S>);

impl<E: Debug, X, P, S> Debug for DebugEntries<'_, E, X, P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<E, X, P, S> Clone for HashTable<E, X, P, S>
where
    E: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            buckets: self.buckets.clone(),
            len: self.len,
            max_load_factor: self.max_load_factor,
            hash_builder: self.hash_builder.clone(),
            marker: PhantomData,
        }
    }
}

impl<E, X, P, S> Default for HashTable<E, X, P, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<E, X, P, S> HashTable<E, X, P, S>
where
    S: Default,
{
    /// Creates an empty table with [`DEFAULT_BUCKET_COUNT`] buckets and the
    /// default hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with exactly `bucket_count` buckets.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn with_bucket_count(bucket_count: usize) -> Self {
        Self::with_bucket_count_and_hasher(bucket_count, S::default())
    }
}

impl<E, X, P, S> HashTable<E, X, P, S> {
    /// Creates an empty table with [`DEFAULT_BUCKET_COUNT`] buckets which will
    /// use `hash_builder` to hash keys.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_bucket_count_and_hasher(DEFAULT_BUCKET_COUNT, hash_builder)
    }

    /// Creates an empty table with exactly `bucket_count` buckets which will
    /// use `hash_builder` to hash keys.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn with_bucket_count_and_hasher(bucket_count: usize, hash_builder: S) -> Self {
        assert!(bucket_count > 0, "a hash table needs at least one bucket");
        Self {
            nodes: Nodes::new(),
            buckets: vec![Bucket::EMPTY; bucket_count],
            len: 0,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            hash_builder,
            marker: PhantomData,
        }
    }

    /// Returns the number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table stores no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest number of entries the table could ever address.
    pub fn max_size(&self) -> usize {
        isize::MAX as usize / core::mem::size_of::<Slot<E>>().max(1)
    }

    /// Current number of buckets. Always at least one.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Largest bucket count the table could ever allocate.
    pub fn max_bucket_count(&self) -> usize {
        isize::MAX as usize / core::mem::size_of::<Bucket>()
    }

    /// Number of entries chained in bucket `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.bucket_count()`.
    pub fn bucket_size(&self, index: usize) -> usize {
        self.checked_bucket(index).len
    }

    /// Iterates over the entries chained in bucket `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.bucket_count()`.
    pub fn bucket_iter(&self, index: usize) -> BucketIter<'_, E> {
        let bucket = self.checked_bucket(index);
        BucketIter {
            nodes: &self.nodes,
            cursor: bucket.head,
            remaining: bucket.len,
        }
    }

    fn checked_bucket(&self, index: usize) -> &Bucket {
        let count = self.buckets.len();
        assert!(
            index < count,
            "bucket index {index} out of range for {count} buckets"
        );
        &self.buckets[index]
    }

    /// Average number of entries per bucket.
    #[inline]
    pub fn load_factor(&self) -> f32 {
        self.len as f32 / self.buckets.len() as f32
    }

    /// The bound the load factor is kept under.
    #[inline]
    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// Returns a reference to the table's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the entry a handle refers to.
    ///
    /// # Panics
    ///
    /// Panics if the handle's entry has been removed.
    pub fn get_at(&self, handle: Handle) -> &E {
        &self.nodes.node(handle.0).entry
    }

    /// Returns the entry a handle refers to, mutably.
    ///
    /// The key of the entry must not be changed in a way that alters its hash
    /// or equality; doing so leaves the entry unreachable by key.
    ///
    /// # Panics
    ///
    /// Panics if the handle's entry has been removed.
    pub fn get_at_mut(&mut self, handle: Handle) -> &mut E {
        &mut self.nodes.node_mut(handle.0).entry
    }

    /// Removes exactly the entry a handle refers to in O(1).
    ///
    /// # Panics
    ///
    /// Panics if the handle's entry has already been removed.
    pub fn erase_at(&mut self, handle: Handle) -> E {
        let index = handle.0;
        let bucket = self.bucket_index(self.nodes.node(index).hash);
        self.unlink_release(bucket, index)
    }

    /// Removes every entry, keeping the current bucket count.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.buckets.fill(Bucket::EMPTY);
        self.len = 0;
    }

    /// Keeps only the entries for which `f` returns `true`.
    ///
    /// `f` may mutate the value part of an entry but must not change its key.
    pub fn retain(&mut self, mut f: impl FnMut(&mut E) -> bool) {
        for bucket in 0..self.buckets.len() {
            let mut cursor = self.buckets[bucket].head;
            while cursor != NIL {
                let node = self.nodes.node_mut(cursor);
                let next = node.next;
                if !f(&mut node.entry) {
                    self.unlink_release(bucket, cursor);
                }
                cursor = next;
            }
        }
    }

    /// Iterates over all entries, bucket by bucket.
    ///
    /// The order is unrelated to insertion order and changes on rehash.
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            nodes: &self.nodes,
            buckets: &self.buckets,
            bucket: 0,
            cursor: NIL,
            remaining: self.len,
        }
    }

    /// Iterates mutably over all entries, bucket by bucket.
    ///
    /// Keys must not be changed through the returned references.
    pub fn iter_mut(&mut self) -> IterMut<'_, E> {
        let (base, slots) = self.nodes.slots_mut_ptr();
        IterMut {
            base,
            slots,
            buckets: &self.buckets,
            bucket: 0,
            cursor: NIL,
            remaining: self.len,
            marker: PhantomData,
        }
    }

    /// Removes every entry, returning them in an iterator. The bucket count is
    /// kept.
    ///
    /// The table is empty as soon as this returns, even if the iterator is
    /// leaked.
    pub fn drain(&mut self) -> Drain<'_, E> {
        let slots = self.nodes.take_slots();
        self.buckets.fill(Bucket::EMPTY);
        let remaining = core::mem::replace(&mut self.len, 0);
        Drain {
            inner: IntoIter {
                slots: slots.into_iter(),
                remaining,
            },
            marker: PhantomData,
        }
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    fn unlink_release(&mut self, bucket: usize, index: usize) -> E {
        self.buckets[bucket].unlink(&mut self.nodes, index);
        self.len -= 1;
        self.nodes.release(index)
    }

    /// Rebuilds the bucket array with exactly `bucket_count` buckets.
    ///
    /// The new array is allocated before anything is touched, so an error
    /// leaves the table unchanged. Nodes are relinked in old bucket order,
    /// which keeps runs of equal keys adjacent.
    fn rehash_to(&mut self, bucket_count: usize, fallibility: Fallibility) -> Result<()> {
        let max = self.max_bucket_count();
        if bucket_count > max {
            return Err(fallibility.capacity_overflow(bucket_count, max));
        }

        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(bucket_count)
            .map_err(|err| fallibility.alloc_err::<Bucket>(err, bucket_count, "buckets"))?;
        buckets.resize(bucket_count, Bucket::EMPTY);

        log::trace!(
            "rehashing {} entries from {} to {} buckets",
            self.len,
            self.buckets.len(),
            bucket_count
        );

        let old = core::mem::replace(&mut self.buckets, buckets);
        for bucket in old {
            let mut cursor = bucket.head;
            while cursor != NIL {
                let node = self.nodes.node(cursor);
                let next = node.next;
                let target = self.bucket_index(node.hash);
                self.buckets[target].push_back(&mut self.nodes, cursor);
                cursor = next;
            }
        }

        Ok(())
    }

    fn rehash_infallible(&mut self, bucket_count: usize) {
        if let Err(err) = self.rehash_to(bucket_count, Fallibility::Infallible) {
            unreachable!("infallible rehash reported {err}");
        }
    }

    /// Grows after an insertion pushed the load factor past its bound.
    fn grow(&mut self) {
        let mut bucket_count = self.buckets.len();
        while bucket_count < usize::MAX
            && self.len as f32 / bucket_count as f32 > self.max_load_factor
        {
            bucket_count = bucket_count.saturating_mul(2).saturating_add(1);
        }
        self.rehash_infallible(bucket_count);
    }

    /// Rebuilds the table with exactly `bucket_count` buckets, unless that
    /// many buckets would push the load factor over its bound, in which case
    /// nothing happens.
    ///
    /// Aborts on allocation failure like `Vec` does; see
    /// [`try_rehash`](Self::try_rehash) for the fallible version.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero or exceeds
    /// [`max_bucket_count`](Self::max_bucket_count).
    pub fn rehash(&mut self, bucket_count: usize) {
        assert!(bucket_count > 0, "a hash table needs at least one bucket");
        if self.len as f32 / bucket_count as f32 > self.max_load_factor {
            return;
        }
        self.rehash_infallible(bucket_count);
    }

    /// Like [`rehash`](Self::rehash), but reports allocation failure instead
    /// of aborting. On error the table is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn try_rehash(&mut self, bucket_count: usize) -> Result<()> {
        assert!(bucket_count > 0, "a hash table needs at least one bucket");
        if self.len as f32 / bucket_count as f32 > self.max_load_factor {
            return Ok(());
        }
        self.rehash_to(bucket_count, Fallibility::Fallible)
    }

    /// Changes the maximum load factor.
    ///
    /// If the current load factor exceeds `max_load_factor`, the table is
    /// immediately rehashed to the smallest bucket count that satisfies the
    /// new bound. If that rehash fails, the previous maximum is restored and
    /// the error returned; the table is otherwise unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `max_load_factor` is not a finite positive number.
    pub fn set_max_load_factor(&mut self, max_load_factor: f32) -> Result<()> {
        assert!(
            max_load_factor.is_finite() && max_load_factor > 0.0,
            "max load factor must be finite and positive, got {max_load_factor}"
        );

        let previous = core::mem::replace(&mut self.max_load_factor, max_load_factor);
        if self.load_factor() <= max_load_factor {
            return Ok(());
        }

        let bucket_count = buckets_for(self.len, max_load_factor);
        if let Err(err) = self.rehash_to(bucket_count, Fallibility::Fallible) {
            log::debug!(
                "keeping max load factor {previous}: rehash to {bucket_count} buckets failed: {err}"
            );
            self.max_load_factor = previous;
            return Err(err);
        }
        Ok(())
    }

    fn reserve_impl(&mut self, additional: usize, fallibility: Fallibility) -> Result<()> {
        let Some(target) = self.len.checked_add(additional) else {
            let max = self.max_bucket_count();
            return Err(fallibility.capacity_overflow(usize::MAX, max));
        };

        if let Err(err) = self.nodes.try_reserve(additional, self.len) {
            return Err(fallibility.alloc_err::<Slot<E>>(err, target, "node slots"));
        }

        let bucket_count = buckets_for(target, self.max_load_factor);
        if bucket_count > self.buckets.len() {
            self.rehash_to(bucket_count, fallibility)?;
        }
        Ok(())
    }

    /// Makes room for at least `additional` more entries without another
    /// rehash.
    ///
    /// # Panics
    ///
    /// Panics if the required bucket count overflows; aborts on allocation
    /// failure.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.reserve_impl(additional, Fallibility::Infallible) {
            unreachable!("infallible reserve reported {err}");
        }
    }

    /// Like [`reserve`](Self::reserve), but reports failure instead of
    /// panicking or aborting. On error the table's contents and bucket count
    /// are unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.reserve_impl(additional, Fallibility::Fallible)
    }

    /// Returns bucket-distribution statistics.
    #[cfg(feature = "stats")]
    pub fn chain_stats(&self) -> ChainStats {
        let longest_chain = self.buckets.iter().map(|b| b.len).max().unwrap_or(0);
        let mut histogram = vec![0usize; longest_chain + 1];
        for bucket in &self.buckets {
            histogram[bucket.len] += 1;
        }

        ChainStats {
            entries: self.len,
            buckets: self.buckets.len(),
            empty_buckets: histogram[0],
            longest_chain,
            load_factor: self.load_factor(),
            max_load_factor: self.max_load_factor,
            histogram,
        }
    }
}

impl<E, X, P, S> HashTable<E, X, P, S>
where
    X: KeyOf<E>,
    X::Key: Hash + Eq,
    P: Policy,
    S: BuildHasher,
{
    #[inline]
    fn make_hash<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        self.hash_builder.hash_one(key)
    }

    /// First node of `bucket` whose key equals `key`.
    fn find_in_bucket<Q>(&self, bucket: usize, hash: u64, key: &Q) -> Option<usize>
    where
        X::Key: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut cursor = self.buckets[bucket].head;
        while cursor != NIL {
            let node = self.nodes.node(cursor);
            if node.hash == hash && X::key(&node.entry).borrow() == key {
                return Some(cursor);
            }
            cursor = node.next;
        }
        None
    }

    fn locate<Q>(&self, key: &Q) -> (usize, u64, Option<usize>)
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.make_hash(key);
        let bucket = self.bucket_index(hash);
        (bucket, hash, self.find_in_bucket(bucket, hash, key))
    }

    /// Length of the run of entries equal to `key` starting at `first`.
    fn run_len<Q>(&self, first: usize, hash: u64, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if P::UNIQUE {
            return 1;
        }
        let mut len = 0;
        let mut cursor = first;
        while cursor != NIL {
            let node = self.nodes.node(cursor);
            if node.hash != hash || X::key(&node.entry).borrow() != key {
                break;
            }
            len += 1;
            cursor = node.next;
        }
        len
    }

    /// Inserts `entry`.
    ///
    /// Under [`Unique`], if an entry with an equal key is already stored the
    /// table is left unchanged and `(handle of the existing entry, false)` is
    /// returned. Under [`Multi`] the entry is always inserted, directly in
    /// front of any entries with an equal key.
    ///
    /// The returned handle is valid after any rehash the insertion caused.
    pub fn insert(&mut self, entry: E) -> (Handle, bool) {
        let (bucket, hash, existing) = {
            let key = X::key(&entry);
            let hash = self.make_hash(key);
            let bucket = self.bucket_index(hash);
            (bucket, hash, self.find_in_bucket(bucket, hash, key))
        };

        if P::UNIQUE {
            if let Some(index) = existing {
                return (Handle(index), false);
            }
        }

        let index = self.nodes.alloc(entry, hash);
        match existing {
            Some(at) => self.buckets[bucket].insert_before(&mut self.nodes, at, index),
            None => self.buckets[bucket].push_back(&mut self.nodes, index),
        }
        self.len += 1;

        if self.load_factor() > self.max_load_factor {
            self.grow();
        }

        (Handle(index), true)
    }

    /// Returns a handle to an entry whose key equals `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).2.map(Handle)
    }

    /// Returns an entry whose key equals `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&E>
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).2.map(|index| &self.nodes.node(index).entry)
    }

    /// Returns an entry whose key equals `key`, mutably. The key must not be
    /// changed through the returned reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut E>
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.locate(key).2?;
        Some(&mut self.nodes.node_mut(index).entry)
    }

    /// Returns `true` if an entry with key `key` is stored.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).2.is_some()
    }

    /// Number of entries whose key equals `key`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.locate(key) {
            (_, hash, Some(first)) => self.run_len(first, hash, key),
            (_, _, None) => 0,
        }
    }

    /// `1` if an entry with key `key` is stored, `0` otherwise.
    pub fn count_unique<Q>(&self, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        usize::from(self.contains(key))
    }

    /// Iterates over every entry whose key equals `key`.
    ///
    /// The entries form one contiguous run of the table's iteration order.
    pub fn equal_range<Q>(&self, key: &Q) -> EqualRange<'_, E>
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (cursor, remaining) = match self.locate(key) {
            (_, hash, Some(first)) => (first, self.run_len(first, hash, key)),
            (_, _, None) => (NIL, 0),
        };
        EqualRange {
            inner: BucketIter {
                nodes: &self.nodes,
                cursor,
                remaining,
            },
        }
    }

    /// Index of the bucket `key` hashes to.
    pub fn bucket<Q>(&self, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.bucket_index(self.make_hash(key))
    }

    /// Removes every entry whose key equals `key`, returning how many were
    /// removed.
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (bucket, hash, Some(first)) = self.locate(key) else {
            return 0;
        };

        let run = self.run_len(first, hash, key);
        let mut cursor = first;
        for _ in 0..run {
            let next = self.nodes.node(cursor).next;
            self.unlink_release(bucket, cursor);
            cursor = next;
        }
        run
    }

    /// Removes and returns one entry whose key equals `key`.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<E>
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (bucket, _, index) = self.locate(key);
        Some(self.unlink_release(bucket, index?))
    }
}

impl<E, X, P, S> Extend<E> for HashTable<E, X, P, S>
where
    X: KeyOf<E>,
    X::Key: Hash + Eq,
    P: Policy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        // Duplicates are likely when the table already holds entries.
        let hint = if self.is_empty() {
            iter.size_hint().0
        } else {
            iter.size_hint().0.div_ceil(2)
        };
        self.reserve(hint);
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl<E, X, P, S> FromIterator<E> for HashTable<E, X, P, S>
where
    X: KeyOf<E>,
    X::Key: Hash + Eq,
    P: Policy,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<'a, E, X, P, S> IntoIterator for &'a HashTable<E, X, P, S> {
    type IntoIter = Iter<'a, E>;
    type Item = &'a E;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, E, X, P, S> IntoIterator for &'a mut HashTable<E, X, P, S> {
    type IntoIter = IterMut<'a, E>;
    type Item = &'a mut E;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<E, X, P, S> IntoIterator for HashTable<E, X, P, S> {
    type IntoIter = IntoIter<E>;
    type Item = E;

    fn into_iter(mut self) -> Self::IntoIter {
        IntoIter {
            slots: self.nodes.take_slots().into_iter(),
            remaining: self.len,
        }
    }
}

/// Iterator over the entries of a [`HashTable`].
pub struct Iter<'a, E> {
    nodes: &'a Nodes<E>,
    buckets: &'a [Bucket],
    bucket: usize,
    cursor: usize,
    remaining: usize,
}

impl<E> Clone for Iter<'_, E> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            buckets: self.buckets,
            bucket: self.bucket,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        while self.cursor == NIL {
            self.cursor = self.buckets[self.bucket].head;
            self.bucket += 1;
        }
        let node = self.nodes.node(self.cursor);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> ExactSizeIterator for Iter<'_, E> {}

/// Mutable iterator over the entries of a [`HashTable`].
pub struct IterMut<'a, E> {
    base: *mut Slot<E>,
    slots: usize,
    buckets: &'a [Bucket],
    bucket: usize,
    cursor: usize,
    remaining: usize,
    marker: PhantomData<&'a mut E>,
}

impl<'a, E> Iterator for IterMut<'a, E> {
    type Item = &'a mut E;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        while self.cursor == NIL {
            self.cursor = self.buckets[self.bucket].head;
            self.bucket += 1;
        }
        assert!(self.cursor < self.slots);

        // SAFETY: `cursor` is linked into a bucket chain, so it indexes an
        // occupied slot inside the slab we hold an exclusive borrow of. Every
        // node is linked exactly once, so each slot is handed out at most once
        // and the returned references never alias.
        let slot = unsafe { &mut *self.base.add(self.cursor) };
        let Slot::Occupied(node) = slot else {
            unreachable!("bucket chain links a vacant slot");
        };
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&mut node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> ExactSizeIterator for IterMut<'_, E> {}

/// Iterator over the entries chained in one bucket.
pub struct BucketIter<'a, E> {
    nodes: &'a Nodes<E>,
    cursor: usize,
    remaining: usize,
}

impl<'a, E> Iterator for BucketIter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.nodes.node(self.cursor);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> ExactSizeIterator for BucketIter<'_, E> {}

/// Iterator over the run of entries sharing one key, see
/// [`HashTable::equal_range`].
pub struct EqualRange<'a, E> {
    inner: BucketIter<'a, E>,
}

impl<'a, E> Iterator for EqualRange<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E> ExactSizeIterator for EqualRange<'_, E> {}

/// Owning iterator over the entries of a [`HashTable`].
pub struct IntoIter<E> {
    slots: vec::IntoIter<Slot<E>>,
    remaining: usize,
}

impl<E> Iterator for IntoIter<E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(node) = slot {
                self.remaining -= 1;
                return Some(node.entry);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> ExactSizeIterator for IntoIter<E> {}

/// Draining iterator returned by [`HashTable::drain`].
pub struct Drain<'a, E> {
    inner: IntoIter<E>,
    marker: PhantomData<&'a mut E>,
}

impl<E> Iterator for Drain<'_, E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E> ExactSizeIterator for Drain<'_, E> {}
