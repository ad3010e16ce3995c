//! The [`SafeMap`][crate::SafeMap] type and its helpers.

use std::borrow::Borrow;
use std::collections::hash_map::{Entry, HashMap, RandomState};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::hash::{BuildHasher, Hash};
use std::iter::FromIterator;
use std::vec;

use parking_lot::RwLock;

#[cfg(feature = "rayon")]
use rayon::iter::{FromParallelIterator, IntoParallelIterator, ParallelExtend, ParallelIterator};

use crate::found_or_created::FoundOrCreated;

/// The iterator of the [`SafeMap`].
///
/// See the [`iter`][SafeMap::iter] method for details.
pub struct Iter<K, V> {
    inner: vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for Iter<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        // The snapshot is already materialized, so the length is exact.
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<K, V> {}

/// A map shareable between threads, guarded by one read-write lock.
///
/// The map hands out clones of the stored values, never references into its own storage, which
/// makes it suitable for keys and values that are cheap to clone (or wrapped in an
/// [`Arc`][std::sync::Arc]). In exchange nothing a caller holds can ever dangle: results of
/// lookups and [snapshots][SafeMap::iter] stay valid through any later mutation, including
/// [`clear`][SafeMap::clear].
///
/// All methods take `&self` and may be called from any number of threads at once. Lookups
/// ([`get`][SafeMap::get], [`contains_key`][SafeMap::contains_key], [`len`][SafeMap::len],
/// [`iter`][SafeMap::iter]) share the lock and run in parallel with each other. Mutations
/// ([`insert`][SafeMap::insert], [`get_or_insert_with`][SafeMap::get_or_insert_with],
/// [`remove`][SafeMap::remove], [`clear`][SafeMap::clear]) hold it exclusively, so writes
/// serialize. Every method is atomic: it observes and produces only complete states of the map.
///
/// Iteration yields a snapshot taken at the moment of the call. The [`FromIterator`] and
/// [`Extend`] traits accept `(K, V)` tuples. Furthermore, [`Extend`] is also implemented for
/// shared references, to allow extending the same map concurrently from multiple threads.
/// Extending inserts the elements one by one: each insertion is atomic, the whole batch is not,
/// and the lock is never held while the supplied iterator runs.
///
/// # Examples
///
/// ```rust
/// use safemap::SafeMap;
/// use crossbeam_utils::thread;
///
/// let map = SafeMap::new();
///
/// thread::scope(|s| {
///     s.spawn(|_| {
///         map.insert("hello", 1);
///     });
///     s.spawn(|_| {
///         map.insert("world", 2);
///     });
/// }).unwrap();
/// assert_eq!(Some(1), map.get("hello"));
/// assert_eq!(Some(2), map.get("world"));
/// ```
///
/// ```rust
/// use safemap::SafeMap;
///
/// let map_1: SafeMap<usize, Vec<usize>> = SafeMap::new();
///
/// map_1.insert(42, vec![1, 2, 3]);
/// map_1.insert(43, vec![1, 2, 3, 4]);
///
/// assert_eq!(3, map_1.get(&42).unwrap().len());
/// assert_eq!(4, map_1.get(&43).unwrap().len());
/// assert_eq!(None, map_1.get(&44));
///
/// let map_2 = SafeMap::new();
/// map_2.insert(44, map_1.get(&43).unwrap());
/// assert_eq!(4, map_2.get(&44).unwrap().len());
/// ```
pub struct SafeMap<K, V, S = RandomState> {
    inner: RwLock<HashMap<K, V, S>>,
}

impl<K, V> SafeMap<K, V> {
    /// Creates a new empty map.
    pub fn new() -> Self {
        Self::with_hasher(RandomState::default())
    }

    /// Creates a new empty map, pre-sized for at least `capacity` elements.
    ///
    /// The capacity is a hint, not a limit. The map starts empty either way and grows past the
    /// hint as needed; `0` is a valid value.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::default())
    }
}

impl<K, V, S> SafeMap<K, V, S> {
    /// Creates a new empty map, but with the provided hasher implementation.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            inner: RwLock::new(HashMap::with_hasher(hasher)),
        }
    }

    /// Creates a new empty map with both a capacity hint and a hasher.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            inner: RwLock::new(HashMap::with_capacity_and_hasher(capacity, hasher)),
        }
    }

    /// Returns the number of elements currently in the map.
    ///
    /// Like everything else about a map shared between threads, the answer may be outdated by
    /// the time the caller acts on it ‒ another thread can insert or remove in between.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Checks if the map is currently empty.
    ///
    /// The same staleness caveat as with [`len`][SafeMap::len] applies.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Removes all elements from the map.
    ///
    /// This is atomic too: a concurrent lookup sees either the full old content or nothing,
    /// never a half-emptied map. Snapshots taken before the call keep their elements.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Returns an iterator over a snapshot of the map.
    ///
    /// The whole content is copied out under a single read-lock acquisition, so the snapshot is
    /// consistent: it holds exactly the bindings that were present at one instant, in no
    /// particular order. Later mutations of the map don't reach into it. This also means taking
    /// a snapshot of a big map is not free.
    pub fn iter(&self) -> Iter<K, V>
    where
        K: Clone,
        V: Clone,
    {
        let map = self.inner.read();
        let pairs = map
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Vec<_>>();
        Iter {
            inner: pairs.into_iter(),
        }
    }
}

impl<K, V, S> SafeMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts a new element, replacing any previous one with the same key.
    ///
    /// The replaced value is returned.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.write().insert(key, value)
    }

    /// Looks up an element, returning a clone of the value.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: ?Sized + Eq + Hash,
        K: Borrow<Q>,
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    /// Checks if the key is currently bound, without touching the value.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Eq + Hash,
        K: Borrow<Q>,
    {
        self.inner.read().contains_key(key)
    }

    /// Looks up or inserts an element.
    ///
    /// It looks up an element. If it isn't present, the provided one is inserted instead. Either
    /// way, an element is returned.
    pub fn get_or_insert(&self, key: K, value: V) -> FoundOrCreated<V>
    where
        V: Clone,
    {
        self.get_or_insert_with(key, || value)
    }

    /// Looks up or inserts a newly created element.
    ///
    /// It looks up an element. If it isn't present, the closure is used to create a new one and
    /// insert it. Either way, an element is returned.
    ///
    /// The whole check-create-insert sequence happens inside one exclusive critical section.
    /// Therefore, unlike a `get` followed by an `insert`, the closure runs at most once per
    /// missing key even when many threads race on it: one caller creates the value and everyone
    /// else gets that same value back, flagged as [`Found`][FoundOrCreated::Found].
    ///
    /// # Deadlocks
    ///
    /// The closure runs while the exclusive lock is held. It must not call back into the same
    /// map (not even for a lookup) ‒ the lock is not reentrant and such a call deadlocks. It
    /// also stalls every other thread using the map for as long as it runs, so it should be
    /// cheap and must not block.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use safemap::SafeMap;
    ///
    /// let map = SafeMap::new();
    /// let val = map.get_or_insert_with("hello", || 42);
    /// assert!(val.is_created());
    /// let val = map.get_or_insert_with("hello", || unreachable!("already present"));
    /// assert_eq!(42, *val);
    /// assert!(!val.is_created());
    /// ```
    pub fn get_or_insert_with<F>(&self, key: K, create: F) -> FoundOrCreated<V>
    where
        V: Clone,
        F: FnOnce() -> V,
    {
        let mut map = self.inner.write();
        match map.entry(key) {
            Entry::Occupied(entry) => FoundOrCreated::Found(entry.get().clone()),
            Entry::Vacant(entry) => FoundOrCreated::Created(entry.insert(create()).clone()),
        }
    }

    /// Looks up or inserts a default value of an element.
    ///
    /// This is like [`get_or_insert_with`][SafeMap::get_or_insert_with], but a default value is
    /// used instead of manually providing a closure.
    pub fn get_or_insert_default(&self, key: K) -> FoundOrCreated<V>
    where
        V: Clone + Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Removes an element identified by the given key, returning it.
    ///
    /// Removing a key that isn't there does nothing and returns `None`.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        Q: ?Sized + Eq + Hash,
        K: Borrow<Q>,
    {
        self.inner.write().remove(key)
    }
}

impl<K, V, S: Default> Default for SafeMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> Debug for SafeMap<K, V, S>
where
    K: Debug + Clone,
    V: Debug + Clone,
{
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        fmt.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Clone for SafeMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: RwLock::new(self.inner.read().clone()),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a SafeMap<K, V, S>
where
    K: Clone,
    V: Clone,
{
    type Item = (K, V);
    type IntoIter = Iter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> Extend<(K, V)> for &'a SafeMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T>(&mut self, iter: T)
    where
        T: IntoIterator<Item = (K, V)>,
    {
        // One element at a time. The lock must not be held while the caller's iterator runs,
        // so the batch as a whole is not atomic.
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> Extend<(K, V)> for SafeMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T>(&mut self, iter: T)
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let mut me: &SafeMap<_, _, _> = self;
        me.extend(iter);
    }
}

impl<K, V> FromIterator<(K, V)> for SafeMap<K, V>
where
    K: Hash + Eq,
{
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let mut me = SafeMap::new();
        me.extend(iter);
        me
    }
}

#[cfg(feature = "rayon")]
impl<K, V, S> ParallelExtend<(K, V)> for SafeMap<K, V, S>
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
    S: BuildHasher + Send + Sync,
{
    fn par_extend<T>(&mut self, par_iter: T)
    where
        T: IntoParallelIterator<Item = (K, V)>,
    {
        par_iter.into_par_iter().for_each(|(k, v)| {
            self.insert(k, v);
        });
    }
}

#[cfg(feature = "rayon")]
impl<'a, K, V, S> ParallelExtend<(K, V)> for &'a SafeMap<K, V, S>
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
    S: BuildHasher + Send + Sync,
{
    fn par_extend<T>(&mut self, par_iter: T)
    where
        T: IntoParallelIterator<Item = (K, V)>,
    {
        par_iter.into_par_iter().for_each(|(k, v)| {
            self.insert(k, v);
        });
    }
}

#[cfg(feature = "rayon")]
impl<K, V> FromParallelIterator<(K, V)> for SafeMap<K, V>
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
{
    fn from_par_iter<T>(par_iter: T) -> Self
    where
        T: IntoParallelIterator<Item = (K, V)>,
    {
        let mut me = SafeMap::new();
        me.par_extend(par_iter);
        me
    }
}
