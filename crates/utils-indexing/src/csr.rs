//! Compressed Sparse Row (CSR) storage for variable-length rows.
//!
//! Used for frozen goto tables: row `s` holds the `(symbol, target)` edges of state `s`, sorted
//! by symbol, so that the whole table lives in two flat vectors.

use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Idx, IndexVec, IndexedVecError};

/// Compressed Sparse Row matrix mapping row identifiers to variable-length data.
///
/// For row `i`, its data is at `data[indptr[i]..indptr[i+1]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound(serialize = "D: Serialize", deserialize = "D: Deserialize<'de>")))]
pub struct CsrMatrix<I: Idx, D> {
    data: Vec<D>,
    indptr: IndexVec<I, usize>,
}

impl<I: Idx, D> CsrMatrix<I, D> {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Creates an empty matrix with room for `rows` rows holding `data` values in total.
    pub fn with_capacity(rows: usize, data: usize) -> Self {
        Self {
            data: Vec::with_capacity(data),
            indptr: IndexVec::with_capacity(rows + 1),
        }
    }

    // MUTATION
    // --------------------------------------------------------------------------------------------

    /// Appends a row and returns its identifier.
    ///
    /// # Errors
    /// Returns an error if the number of rows would exceed `u32::MAX`.
    pub fn push_row(&mut self, values: impl IntoIterator<Item = D>) -> Result<I, IndexedVecError> {
        if self.indptr.is_empty() {
            self.indptr.push(0)?;
        }
        let row = I::from_usize(self.num_rows());
        self.data.extend(values);
        self.indptr.push(self.data.len())?;
        Ok(row)
    }

    // ACCESSORS
    // --------------------------------------------------------------------------------------------

    pub fn num_rows(&self) -> usize {
        self.indptr.len().saturating_sub(1)
    }

    /// Returns the values of `row`, or `None` if the row doesn't exist.
    #[inline]
    pub fn row(&self, row: I) -> Option<&[D]> {
        let row_idx = row.to_usize();
        if row_idx >= self.num_rows() {
            return None;
        }
        let ptrs = self.indptr.as_slice();
        Some(&self.data[ptrs[row_idx]..ptrs[row_idx + 1]])
    }
}
