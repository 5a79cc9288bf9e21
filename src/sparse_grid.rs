//! A sparse uniform grid for 2D proximity queries.
//!
//! The plane is divided into square tiles of a fixed side length. Every
//! tracked key is recorded in each tile its shape's bounding box overlaps, and
//! only tiles that hold at least one key are stored. A query visits the tiles
//! its own bounding box overlaps, gathers the keys found there and keeps those
//! whose stored shape truly intersects the query.
//!
//! Tile `(x, y)` covers `[x * side, (x + 1) * side) × [y * side, (y + 1) * side)`,
//! so a shape touching a tile boundary from below is also recorded in the
//! tile above that boundary.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use num_traits::Float;
use num_traits::Zero;

use crate::DefaultHashBuilder;
use crate::FlatSet;
use crate::HashMap;
use crate::HashSet;
use crate::geometry::Bounded;
use crate::geometry::Intersects;
use crate::geometry::Vector2;
use crate::hash_table::Unique;

/// Integer coordinates of one grid tile, ordered by `x` then `y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridPosition {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl GridPosition {
    /// Creates a position from its indices.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The keys stored in one tile, with each key's shape.
pub type Tile<K, B, S = DefaultHashBuilder> = HashMap<K, B, Unique, S>;

/// Maps keys to bounding shapes and answers "which keys overlap this shape"
/// by visiting only the tiles the query spans.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use chain_hash::SparseGrid;
/// use chain_hash::geometry::Circle;
/// use chain_hash::geometry::Vector2;
///
/// let mut grid: SparseGrid<&str, Circle<f32>> = SparseGrid::new(1.0);
/// assert!(!grid.insert("ship", Circle::new(Vector2::new(0.5, 0.5), 0.25)));
/// assert!(!grid.insert("rock", Circle::new(Vector2::new(4.0, 4.0), 1.0)));
///
/// let hits = grid.find(&Circle::new(Vector2::new(0.0, 0.0), 0.5));
/// assert!(hits.contains("ship"));
/// assert!(!hits.contains("rock"));
///
/// // Moving a key is an insert of its new shape.
/// assert!(grid.insert("ship", Circle::new(Vector2::new(4.5, 4.5), 0.25)));
/// assert_eq!(grid.find(&Vector2::new(4.5, 4.5)).len(), 2);
/// # }
/// ```
pub struct SparseGrid<K, B: Bounded, S = DefaultHashBuilder> {
    tile_side: B::Scalar,
    tiles: HashMap<GridPosition, Tile<K, B, S>, Unique, S>,
    memberships: HashMap<K, FlatSet<GridPosition>, Unique, S>,
}

impl<K, B, S> Clone for SparseGrid<K, B, S>
where
    K: Clone,
    B: Bounded + Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            tile_side: self.tile_side,
            tiles: self.tiles.clone(),
            memberships: self.memberships.clone(),
        }
    }
}

impl<K, B, S> Debug for SparseGrid<K, B, S>
where
    K: Debug,
    B: Bounded + Debug,
    B::Scalar: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SparseGrid")
            .field("tile_side", &self.tile_side)
            .field("tiles", &self.tiles)
            .field("memberships", &self.memberships)
            .finish()
    }
}

/// Tile index of one coordinate, saturating at the `i32` range.
fn tile_index<T: Float>(coord: T, tile_side: T) -> i32 {
    let tile = (coord / tile_side).floor();
    tile.to_i32()
        .unwrap_or(if tile < T::zero() { i32::MIN } else { i32::MAX })
}

impl<K, B, S> SparseGrid<K, B, S>
where
    B: Bounded,
    S: Clone + Default,
{
    /// Creates an empty grid with the default hasher.
    ///
    /// The absolute value of `tile_side` is used.
    ///
    /// # Panics
    ///
    /// Panics if `tile_side` is zero, infinite or NaN.
    pub fn new(tile_side: B::Scalar) -> Self {
        Self::with_hasher(tile_side, S::default())
    }
}

impl<K, B, S> SparseGrid<K, B, S>
where
    B: Bounded,
    S: Clone,
{
    /// Creates an empty grid whose maps hash with `hash_builder`.
    ///
    /// The absolute value of `tile_side` is used.
    ///
    /// # Panics
    ///
    /// Panics if `tile_side` is zero, infinite or NaN.
    pub fn with_hasher(tile_side: B::Scalar, hash_builder: S) -> Self {
        let tile_side = tile_side.abs();
        assert!(
            tile_side.is_finite() && tile_side > B::Scalar::zero(),
            "tile side must be finite and non-zero"
        );
        Self {
            tile_side,
            tiles: HashMap::with_hasher(hash_builder.clone()),
            memberships: HashMap::with_hasher(hash_builder),
        }
    }
}

impl<K, B: Bounded, S> SparseGrid<K, B, S> {
    /// Side length of every tile.
    pub fn tile_side(&self) -> B::Scalar {
        self.tile_side
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.memberships.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.memberships.is_empty()
    }

    /// Number of tiles holding at least one key.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Iterates over the tracked keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.memberships.keys()
    }

    /// Forgets every key and tile.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.memberships.clear();
    }

    /// The tile containing `point`.
    pub fn grid_position(&self, point: Vector2<B::Scalar>) -> GridPosition {
        GridPosition::new(
            tile_index(point.x, self.tile_side),
            tile_index(point.y, self.tile_side),
        )
    }

    /// Lowest and highest tiles overlapped by a shape's bounding box.
    fn tile_span<Q>(&self, shape: &Q) -> (GridPosition, GridPosition)
    where
        Q: Bounded<Scalar = B::Scalar> + ?Sized,
    {
        let bounds = shape.bounding_box();
        (
            self.grid_position(bounds.min()),
            self.grid_position(bounds.max()),
        )
    }

    /// Every tile a shape's bounding box overlaps, whether stored or not.
    ///
    /// Each axis spans from the tile of the box's minimum to the tile of its
    /// maximum on that same axis, inclusive.
    pub fn tile_positions<Q>(&self, shape: &Q) -> FlatSet<GridPosition>
    where
        Q: Bounded<Scalar = B::Scalar> + ?Sized,
    {
        let (min, max) = self.tile_span(shape);
        let mut positions = Vec::new();
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                positions.push(GridPosition::new(x, y));
            }
        }
        FlatSet::from_sorted_vec(positions)
    }
}

impl<K, B, S> SparseGrid<K, B, S>
where
    K: Hash + Eq + Clone,
    B: Bounded + Clone,
    S: BuildHasher + Clone,
{
    /// Returns `true` if `key` is tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.memberships.contains_key(key)
    }

    /// Tiles currently holding `key`.
    pub fn positions(&self, key: &K) -> Option<&FlatSet<GridPosition>> {
        self.memberships.get(key)
    }

    /// The stored shape of `key`.
    pub fn get(&self, key: &K) -> Option<&B> {
        let first = self.memberships.get(key)?.first()?;
        self.tiles.get(first)?.get(key)
    }

    /// Contents of the tile at `position`, if any key occupies it.
    pub fn tile(&self, position: GridPosition) -> Option<&Tile<K, B, S>> {
        self.tiles.get(&position)
    }

    /// Starts tracking `key` with `shape`, or moves it if already tracked.
    ///
    /// Returns `true` if the key was already tracked.
    pub fn insert(&mut self, key: K, shape: B) -> bool {
        self.update(key, shape)
    }

    /// Moves `key` to `shape`, starting to track it if needed.
    ///
    /// Only the tiles that differ between the old and new shape are touched
    /// structurally; tiles covered by both get the new shape. Tiles left empty
    /// are dropped. Returns `true` if the key was already tracked.
    pub fn update(&mut self, key: K, shape: B) -> bool {
        let positions = self.tile_positions(&shape);

        let (existed, left) = match self.memberships.get(&key) {
            Some(old) => (true, old.difference(&positions).copied().collect()),
            None => (false, Vec::new()),
        };
        for &position in &left {
            self.leave(&key, position);
        }

        let hasher = self.tiles.hasher().clone();
        let mut entered = 0usize;
        for &position in &positions {
            let tile = self
                .tiles
                .get_or_insert_with(position, || HashMap::with_hasher(hasher.clone()));
            if tile.insert_or_assign(key.clone(), shape.clone()).is_none() {
                entered += 1;
            }
        }

        log::trace!(
            "grid membership changed: left {} tiles, entered {}, now in {}",
            left.len(),
            entered,
            positions.len()
        );

        self.memberships.insert_or_assign(key, positions);
        existed
    }

    /// Stops tracking `key`. Returns `false` if it was not tracked.
    pub fn erase(&mut self, key: &K) -> bool {
        let Some(positions) = self.memberships.remove(key) else {
            return false;
        };
        for &position in &positions {
            self.leave(key, position);
        }
        true
    }

    fn leave(&mut self, key: &K, position: GridPosition) {
        debug_assert!(
            self.tiles.contains_key(&position),
            "membership refers to a missing tile"
        );
        let emptied = self.tiles.get_mut(&position).is_some_and(|tile| {
            tile.erase(key);
            tile.is_empty()
        });
        if emptied {
            self.tiles.erase(&position);
        }
    }

    /// Iterates over every tracked key with its shape.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &B)> {
        self.memberships.iter().filter_map(|(key, positions)| {
            let shape = self.tiles.get(positions.first()?)?.get(key)?;
            Some((key, shape))
        })
    }

    /// Keys whose shapes intersect `query`.
    ///
    /// Every key sharing a tile with the query's bounding box is a candidate;
    /// each candidate's stored shape is tested against `query` exactly once.
    pub fn find<Q>(&self, query: &Q) -> HashSet<K, Unique, S>
    where
        Q: Bounded<Scalar = B::Scalar> + Intersects<B> + ?Sized,
    {
        let hasher = self.tiles.hasher().clone();
        let mut found = HashSet::with_hasher(hasher.clone());
        let mut seen: HashSet<&K, Unique, S> = HashSet::with_hasher(hasher);

        let (min, max) = self.tile_span(query);
        let span = (i64::from(max.x) - i64::from(min.x) + 1)
            .saturating_mul(i64::from(max.y) - i64::from(min.y) + 1);
        let mut candidates: Vec<&Tile<K, B, S>> = Vec::new();
        if span > self.tiles.len() as i64 {
            // Fewer stored tiles than spanned ones: scan what is stored.
            candidates.extend(self.tiles.iter().filter_map(|(position, tile)| {
                let inside = (min.x..=max.x).contains(&position.x)
                    && (min.y..=max.y).contains(&position.y);
                inside.then_some(tile)
            }));
        } else {
            for x in min.x..=max.x {
                for y in min.y..=max.y {
                    candidates.extend(self.tiles.get(&GridPosition::new(x, y)));
                }
            }
        }

        for tile in candidates {
            for (key, shape) in tile.iter() {
                if seen.insert(key).1 && query.intersects(shape) {
                    found.insert(key.clone());
                }
            }
        }

        found
    }
}
