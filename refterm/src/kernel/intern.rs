//! Hash-consed values with constant-time cloning, hashing and equality checking.

use super::Rc;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Deref;
use fnv::{FnvHashMap, FnvHasher};

/// Shared value together with its structural hash.
///
/// Cloning copies a pointer and hashing writes the precomputed hash.
/// Two handles are equal if they point to the same value, or
/// if their hashes and their values are equal.
/// Handles obtained from the same [`Interner`] are thus equal
/// if and only if they point to the same value.
pub struct Interned<T: ?Sized> {
    ptr: Rc<T>,
    hash: u64,
}

/// Interned slice.
pub type List<T> = Interned<[T]>;

fn structural_hash<T: ?Sized + Hash>(x: &T) -> u64 {
    let mut hasher = FnvHasher::default();
    x.hash(&mut hasher);
    hasher.finish()
}

impl<T: ?Sized> Interned<T> {
    /// Return true if both handles point to the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.ptr, &other.ptr)
    }

    /// Return the structural hash of the value.
    pub fn hash_value(&self) -> u64 {
        self.hash
    }

    fn strong_count(&self) -> usize {
        Rc::strong_count(&self.ptr)
    }
}

impl<T: ?Sized> Clone for Interned<T> {
    fn clone(&self) -> Self {
        Self {
            ptr: self.ptr.clone(),
            hash: self.hash,
        }
    }
}

impl<T: ?Sized> Deref for Interned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.ptr
    }
}

impl<T: ?Sized> Hash for Interned<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash)
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Interned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.hash == other.hash && *self.ptr == *other.ptr)
    }
}

impl<T: ?Sized + Eq> Eq for Interned<T> {}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Interned<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (**self).fmt(f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Interned<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (**self).fmt(f)
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Counters of an interner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InternStats {
    /// number of values currently stored
    pub values: usize,
    /// number of requests answered by a stored value
    pub hits: usize,
    /// number of requests that stored a new value
    pub misses: usize,
}

impl core::ops::Add for InternStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            values: self.values + rhs.values,
            hits: self.hits + rhs.hits,
            misses: self.misses + rhs.misses,
        }
    }
}

/// Table of interned values, organised in buckets of equal hash.
///
/// ~~~
/// # use refterm::rc::Interner;
/// let mut strings = Interner::<str>::default();
/// let mut numbers = Interner::<[u32]>::default();
///
/// let a = strings.intern_from("hello", |s| s.into());
/// let b = strings.intern_from(&*String::from("hello"), |s| s.into());
/// assert!(a.ptr_eq(&b));
///
/// let xs = numbers.intern_slice(vec![1, 2, 3]);
/// let ys = numbers.intern_slice(vec![1, 2, 3]);
/// assert!(xs.ptr_eq(&ys));
/// assert_eq!(numbers.len(), 1);
///
/// drop((xs, ys));
/// assert_eq!(numbers.sweep(), 1);
/// assert!(numbers.is_empty());
/// ~~~
pub struct Interner<T: ?Sized> {
    buckets: FnvHashMap<u64, Vec<Interned<T>>>,
    stats: InternStats,
}

impl<T: ?Sized> Default for Interner<T> {
    fn default() -> Self {
        Self {
            buckets: Default::default(),
            stats: Default::default(),
        }
    }
}

impl<T: ?Sized + Hash + Eq> Interner<T> {
    /// Create an interner that can hold `n` hashes without reallocating.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            buckets: FnvHashMap::with_capacity_and_hasher(n, Default::default()),
            stats: Default::default(),
        }
    }

    /// Return a handle to a stored value equal to `x`, or
    /// store `alloc(x)` if there is no such value.
    pub fn intern_from<B: Borrow<T>>(&mut self, x: B, alloc: impl FnOnce(B) -> Rc<T>) -> Interned<T> {
        let hash = structural_hash(x.borrow());
        let bucket = self.buckets.entry(hash).or_default();
        if let Some(found) = bucket.iter().find(|y| &*y.ptr == x.borrow()) {
            self.stats.hits += 1;
            return found.clone();
        }
        self.stats.misses += 1;
        self.stats.values += 1;
        let interned = Interned {
            ptr: alloc(x),
            hash,
        };
        bucket.push(interned.clone());
        interned
    }

    /// Return the number of stored values.
    pub fn len(&self) -> usize {
        self.stats.values
    }

    /// Return true if no value is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the number of hashes that can be held without reallocating.
    pub fn capacity(&self) -> usize {
        self.buckets.capacity()
    }

    pub fn stats(&self) -> InternStats {
        self.stats
    }

    /// Remove all values that are referenced only by the interner.
    ///
    /// Return the number of removed values.
    pub fn sweep(&mut self) -> usize {
        let before = self.stats.values;
        self.buckets.retain(|_, bucket| {
            bucket.retain(|x| x.strong_count() > 1);
            !bucket.is_empty()
        });
        self.stats.values = self.buckets.values().map(|b| b.len()).sum();
        before - self.stats.values
    }
}

impl<T: Hash + Eq> Interner<T> {
    pub fn intern(&mut self, x: T) -> Interned<T> {
        self.intern_from(x, Rc::new)
    }
}

impl<T: Hash + Eq> Interner<[T]> {
    pub fn intern_slice(&mut self, xs: Vec<T>) -> List<T> {
        self.intern_from(xs, Rc::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality() {
        let mut i1 = Interner::default();
        let mut i2 = Interner::default();
        let a = i1.intern((1, 2));
        let b = i2.intern((1, 2));
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
        assert_ne!(a, i1.intern((2, 1)));
        assert_eq!(i1.stats(), InternStats { values: 2, hits: 0, misses: 2 });
    }

    #[test]
    fn hits() {
        let mut i = Interner::default();
        let xs: Vec<_> = (0..10).map(|n| i.intern(n % 3)).collect();
        assert!(xs[0].ptr_eq(&xs[3]));
        assert_eq!(i.len(), 3);
        assert_eq!(i.stats().hits, 7);
    }

    #[test]
    fn sweep_keeps_referenced() {
        let mut i = Interner::default();
        let kept = i.intern_slice(Vec::from([1, 2]));
        i.intern_slice(Vec::from([3]));
        assert_eq!(i.sweep(), 1);
        assert_eq!(i.sweep(), 0);
        assert!(kept.ptr_eq(&i.intern_slice(Vec::from([1, 2]))));
    }
}
