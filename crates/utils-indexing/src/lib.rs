//! Dense, type-safe tables keyed by `u32`-backed identifiers.
//!
//! Automaton tables (goto rows, fail links, depths, outputs) are all keyed by state identifiers.
//! Wrapping the key in a newtype keeps state ids, pattern ids and raw counters apart, and the
//! [`DenseIdMap`] type expresses renumberings (such as the final-state normalization) as a
//! single value which can be applied to every table at once.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use alloc::vec::Vec;
use core::{fmt::Debug, marker::PhantomData, ops};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod csr;
pub use csr::CsrMatrix;

// ERRORS
// ================================================================================================

/// Errors raised by the indexed containers in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexedVecError {
    /// The number of items exceeds what the identifier type can address.
    #[error("indexed table already holds the maximum number of items")]
    TooManyItems,
    /// A renumbering does not map every source identifier to a distinct target.
    #[error("id map is not a permutation: {0} has no unique image")]
    NotAPermutation(u32),
}

// IDENTIFIERS
// ================================================================================================

/// A `u32`-backed, 0-based identifier.
pub trait Idx: Copy + Eq + Ord + Debug + From<u32> + Into<u32> {
    /// Returns this identifier as a `usize` offset.
    #[inline]
    fn to_usize(self) -> usize {
        self.into() as usize
    }

    /// Returns the identifier at the given offset.
    ///
    /// # Panics
    /// Panics if `index` does not fit into a `u32`.
    #[inline]
    fn from_usize(index: usize) -> Self {
        Self::from(u32::try_from(index).expect("identifier offset exceeds u32::MAX"))
    }
}

/// Declares a newtyped identifier implementing [`Idx`].
#[macro_export]
macro_rules! newtype_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(
            feature = "serde",
            derive(::serde::Serialize, ::serde::Deserialize),
            serde(transparent)
        )]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Returns the raw numeric value of this identifier.
            pub const fn as_u32(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                Self(v)
            }
        }

        impl From<$name> for u32 {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl $crate::Idx for $name {}
    };
}

// INDEX VEC
// ================================================================================================

/// A dense vector addressed by an identifier type instead of `usize`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent, bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>")))]
pub struct IndexVec<I: Idx, T> {
    raw: Vec<T>,
    #[cfg_attr(feature = "serde", serde(skip))]
    _m: PhantomData<I>,
}

impl<I: Idx, T> Default for IndexVec<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Idx, T> IndexVec<I, T> {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Returns a new empty table.
    #[inline]
    pub fn new() -> Self {
        Self { raw: Vec::new(), _m: PhantomData }
    }

    /// Returns a new empty table with room for `n` entries.
    #[inline]
    pub fn with_capacity(n: usize) -> Self {
        Self { raw: Vec::with_capacity(n), _m: PhantomData }
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the table has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the entry for `idx`, or `None` if it is out of bounds.
    #[inline]
    pub fn get(&self, idx: I) -> Option<&T> {
        self.raw.get(idx.to_usize())
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.raw
    }

    #[inline]
    pub fn into_inner(self) -> Vec<T> {
        self.raw
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.raw.iter()
    }

    /// Returns an iterator over `(id, &entry)` pairs in identifier order.
    pub fn iter_enumerated(&self) -> impl DoubleEndedIterator<Item = (I, &T)> + ExactSizeIterator {
        self.raw.iter().enumerate().map(|(i, v)| (I::from_usize(i), v))
    }

    /// Returns an iterator over all identifiers of this table.
    pub fn indices(&self) -> impl DoubleEndedIterator<Item = I> + ExactSizeIterator + use<I, T> {
        (0..self.raw.len()).map(I::from_usize)
    }

    // MUTATION
    // --------------------------------------------------------------------------------------------

    /// Appends an entry and returns its identifier.
    ///
    /// Returns an error if the identifier type cannot address another entry.
    #[inline]
    pub fn push(&mut self, v: T) -> Result<I, IndexedVecError> {
        if self.raw.len() >= u32::MAX as usize {
            return Err(IndexedVecError::TooManyItems);
        }
        let id = I::from_usize(self.raw.len());
        self.raw.push(v);
        Ok(id)
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.raw.iter_mut()
    }

    /// Returns a new table where the entry of `old` is stored under `map[old]`.
    ///
    /// `map` must be a permutation of this table's identifiers.
    pub fn permuted(self, map: &DenseIdMap<I, I>) -> Result<Self, IndexedVecError> {
        let mut slots: Vec<Option<T>> = (0..self.raw.len()).map(|_| None).collect();
        for (old, value) in self.raw.into_iter().enumerate() {
            let old = I::from_usize(old);
            let new = map.get(old).ok_or(IndexedVecError::NotAPermutation(old.into()))?;
            let slot = slots
                .get_mut(new.to_usize())
                .ok_or(IndexedVecError::NotAPermutation(old.into()))?;
            if slot.replace(value).is_some() {
                return Err(IndexedVecError::NotAPermutation(old.into()));
            }
        }
        // every slot is filled: n distinct targets below n
        let raw = slots.into_iter().map(|v| v.expect("permutation covers every slot")).collect();
        Ok(Self { raw, _m: PhantomData })
    }
}

impl<I: Idx, T> TryFrom<Vec<T>> for IndexVec<I, T> {
    type Error = IndexedVecError;

    fn try_from(raw: Vec<T>) -> Result<Self, Self::Error> {
        if raw.len() > u32::MAX as usize {
            return Err(IndexedVecError::TooManyItems);
        }
        Ok(Self { raw, _m: PhantomData })
    }
}

impl<I: Idx, T> ops::Index<I> for IndexVec<I, T> {
    type Output = T;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        &self.raw[index.to_usize()]
    }
}

impl<I: Idx, T> ops::IndexMut<I> for IndexVec<I, T> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.raw[index.to_usize()]
    }
}

impl<I: Idx, T> IntoIterator for IndexVec<I, T> {
    type Item = T;
    type IntoIter = alloc::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.raw.into_iter()
    }
}

// DENSE ID MAP
// ================================================================================================

/// A dense mapping from one identifier space into another.
///
/// Unmapped source identifiers return `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseIdMap<From: Idx, To: Idx> {
    inner: IndexVec<From, Option<To>>,
}

impl<From: Idx, To: Idx> DenseIdMap<From, To> {
    /// Returns a map with `num_from` unmapped source identifiers.
    #[inline]
    pub fn new(num_from: usize) -> Self {
        let mut raw = Vec::with_capacity(num_from);
        raw.resize(num_from, None);
        Self { inner: IndexVec { raw, _m: PhantomData } }
    }

    /// Maps `k` to `v`, growing the source space if needed.
    #[inline]
    pub fn insert(&mut self, k: From, v: To) {
        let idx = k.to_usize();
        if idx >= self.inner.len() {
            self.inner.raw.resize(idx + 1, None);
        }
        self.inner[k] = Some(v);
    }

    #[inline]
    pub fn get(&self, k: From) -> Option<To> {
        self.inner.get(k).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec, vec::Vec};

    use super::*;

    newtype_id!(TestId);
    newtype_id!(OtherId);

    #[test]
    fn index_vec_push_and_lookup() {
        let mut table = IndexVec::<TestId, &str>::new();
        let a = table.push("root").unwrap();
        let b = table.push("leaf").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table[a], "root");
        assert_eq!(table[b], "leaf");
        assert_eq!(table.get(TestId::from(2)), None);
    }

    #[test]
    fn index_vec_enumerates_in_id_order() {
        let table = IndexVec::<TestId, u8>::try_from(vec![0, 10, 20]).unwrap();
        let pairs: Vec<_> = table.iter_enumerated().map(|(id, v)| (id.as_u32(), *v)).collect();
        assert_eq!(pairs, vec![(0, 0), (1, 10), (2, 20)]);
        assert_eq!(table.indices().rev().next(), Some(TestId::from(2)));
    }

    #[test]
    fn permuted_moves_entries_to_their_images() {
        let table = IndexVec::<TestId, String>::try_from(vec![
            String::from("a"),
            String::from("b"),
            String::from("c"),
        ])
        .unwrap();
        let mut map = DenseIdMap::<TestId, TestId>::new(3);
        map.insert(TestId::from(0), TestId::from(2));
        map.insert(TestId::from(1), TestId::from(0));
        map.insert(TestId::from(2), TestId::from(1));

        let permuted = table.permuted(&map).unwrap();
        assert_eq!(permuted.as_slice(), &["b", "c", "a"]);
    }

    #[test]
    fn permuted_rejects_colliding_images() {
        let table = IndexVec::<TestId, u8>::try_from(vec![1, 2]).unwrap();
        let mut map = DenseIdMap::<TestId, TestId>::new(2);
        map.insert(TestId::from(0), TestId::from(1));
        map.insert(TestId::from(1), TestId::from(1));

        assert_eq!(table.permuted(&map), Err(IndexedVecError::NotAPermutation(1)));
    }

    #[test]
    fn dense_id_map_tracks_unmapped_ids() {
        let mut map = DenseIdMap::<TestId, OtherId>::new(2);
        map.insert(TestId::from(1), OtherId::from(7));
        map.insert(TestId::from(3), OtherId::from(9));

        assert_eq!(map.get(TestId::from(0)), None);
        assert_eq!(map.get(TestId::from(1)), Some(OtherId::from(7)));
        assert_eq!(map.get(TestId::from(2)), None);
        assert_eq!(map.get(TestId::from(3)), Some(OtherId::from(9)));
        assert_eq!(map.get(TestId::from(4)), None);
    }
}
