use crate::core::error::QuboError;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A square matrix stored in a single row-major buffer.
///
/// Every matrix in the crate (capacities, weights, arc flows and the QUBO
/// coefficients) uses this layout so that row scans stay contiguous.
///
/// # Examples
///
/// ```
/// use cycle_qubo::core::matrix::Matrix;
///
/// let mut m = Matrix::<u64>::zeros(3);
/// m[(0, 1)] = 4;
/// assert_eq!(m.row(0), &[0, 4, 0]);
/// assert_eq!(m.row_sum(0), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "RawMatrix<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct Matrix<T> {
    size: usize,
    data: Vec<T>,
}

/// Unchecked wire form of [`Matrix`].
#[derive(Deserialize)]
struct RawMatrix<T> {
    size: usize,
    data: Vec<T>,
}

impl<T> TryFrom<RawMatrix<T>> for Matrix<T> {
    type Error = QuboError;

    fn try_from(raw: RawMatrix<T>) -> Result<Self, Self::Error> {
        let expected = raw.size.checked_mul(raw.size);
        if expected != Some(raw.data.len()) {
            return Err(QuboError::MatrixLength {
                size: raw.size,
                found: raw.data.len(),
            });
        }
        Ok(Self {
            size: raw.size,
            data: raw.data,
        })
    }
}

impl<T: Copy + Default> Matrix<T> {
    /// An `size`×`size` matrix filled with `T::default()`.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![T::default(); size * size],
        }
    }

    /// Build a matrix from nested rows, rejecting non-square input.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, QuboError> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(QuboError::RaggedRow {
                    row,
                    expected: size,
                    found: values.len(),
                });
            }
            data.extend(values);
        }
        Ok(Self { size, data })
    }

    /// Keep only the listed rows/columns, in the given order.
    pub fn select(&self, keep: &[usize]) -> Self {
        let mut out = Self::zeros(keep.len());
        for (p, &i) in keep.iter().enumerate() {
            for (q, &j) in keep.iter().enumerate() {
                out[(p, q)] = self[(i, j)];
            }
        }
        out
    }
}

impl<T> Matrix<T> {
    /// Number of rows (equal to the number of columns).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        let size = self.size;
        &mut self.data[i * size..(i + 1) * size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        // chunks_exact(0) panics, an empty matrix simply has no rows
        self.data.chunks_exact(self.size.max(1))
    }

    /// The whole buffer in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl Matrix<u64> {
    /// Sum of row `i` (outgoing total for vertex `i`).
    pub fn row_sum(&self, i: usize) -> u64 {
        self.row(i).iter().sum()
    }

    /// Sum of column `j` (incoming total for vertex `j`).
    pub fn column_sum(&self, j: usize) -> u64 {
        (0..self.size).map(|i| self[(i, j)]).sum()
    }

    /// Iterate `(i, j, value)` over strictly positive entries in row-major order.
    pub fn positive_entries(&self) -> impl Iterator<Item = (usize, usize, u64)> + '_ {
        let size = self.size;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0)
            .map(move |(k, &v)| (k / size, k % size, v))
    }

    /// Total of all entries.
    pub fn total(&self) -> u64 {
        self.data.iter().sum()
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.data[i * self.size + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        &mut self.data[i * self.size + j]
    }
}
