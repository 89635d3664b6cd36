use crate::error::MatrixError;
use serde::{Deserialize, Serialize};

/// The element type of a [`Matrix`].
///
/// Arithmetic on elements wraps on overflow,
/// like native fixed-width integer arithmetic.
pub type Element = i32;

/// A dense square matrix of [`Element`].
///
/// Storage is a single row-major buffer of
/// `size * size` elements owned by the matrix.
/// Cloning a matrix deep-copies that buffer.
///
/// # Invariants
///
/// * `size() >= 1`
/// * every row has exactly `size()` elements
///
/// There is no way to construct a value violating them.
///
/// # Examples
///
/// ## From the text encoding
///
/// ```
/// let m: sqmat::Matrix = "1 2;3 4".parse().unwrap();
/// assert_eq!(m.size(), 2);
/// assert_eq!(m[(1, 0)], 3);
/// ```
///
/// ## Using rust code
///
/// ```
/// let m = sqmat::Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
/// assert_eq!(m.row(0), &[1, 2]);
///
/// let z = sqmat::Matrix::new(3).unwrap();
/// assert!(z.as_slice().iter().all(|&x| x == 0));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Element>>", into = "Vec<Vec<Element>>")]
pub struct Matrix {
    data: Vec<Element>,
    size: usize,
}

// Number of elements in a size x size buffer.
// The byte length must also fit in isize::MAX for a Vec to hold it.
fn element_count(size: usize) -> Result<usize, MatrixError> {
    if size == 0 {
        return Err(MatrixError::InvalidSize(size));
    }
    size.checked_mul(size)
        .filter(|&count| {
            count
                .checked_mul(std::mem::size_of::<Element>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or(MatrixError::InvalidSize(size))
}

impl Matrix {
    /// Create a zero-filled `size x size` matrix.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidSize`] if `size` is zero, or if
    /// `size * size` elements cannot be addressed in memory.
    pub fn new(size: usize) -> Result<Self, MatrixError> {
        element_count(size)?;
        Ok(Self::zeros(size))
    }

    /// Create a matrix whose element `(row, column)`
    /// is `f(row, column)`.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidSize`] if `size` is zero.
    pub fn from_fn<F>(size: usize, mut f: F) -> Result<Self, MatrixError>
    where
        F: FnMut(usize, usize) -> Element,
    {
        let mut rv = Self::new(size)?;
        for row in 0..size {
            for (column, value) in rv.row_mut(row).iter_mut().enumerate() {
                *value = f(row, column);
            }
        }
        Ok(rv)
    }

    /// The identity matrix of the given size.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidSize`] if `size` is zero.
    pub fn identity(size: usize) -> Result<Self, MatrixError> {
        Self::from_fn(size, |row, column| Element::from(row == column))
    }

    /// Build a matrix from a vector of rows.
    ///
    /// # Errors
    ///
    /// * [`MatrixError::InvalidSize`] if `rows` is empty or too long
    ///   to be squared.
    /// * [`MatrixError::MalformedInput`] if any row's length
    ///   differs from the number of rows.
    pub fn from_rows(rows: Vec<Vec<Element>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        let mut data = Vec::with_capacity(element_count(size)?);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(MatrixError::MalformedInput(format!(
                    "row {i} has {} values, expected {size}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self { data, size })
    }

    // Callers guarantee size > 0 and that element_count(size) is Ok.
    pub(crate) fn zeros(size: usize) -> Self {
        debug_assert!(size > 0);
        Self {
            data: vec![0; size * size],
            size,
        }
    }

    /// The number of rows, which is also the number of columns.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of bytes held by the element buffer.
    pub fn byte_len(&self) -> usize {
        self.data.len() * std::mem::size_of::<Element>()
    }

    /// Return the element at `(row, column)`, or `None`
    /// if either index is out of range.
    pub fn get(&self, row: usize, column: usize) -> Option<Element> {
        if row < self.size && column < self.size {
            Some(self.data[row * self.size + column])
        } else {
            None
        }
    }

    fn get_element_mut(&mut self, row: usize, column: usize) -> &mut Element {
        &mut self.data[row * self.size + column]
    }

    /// Set the element at `(row, column)`.
    ///
    /// # Panics
    ///
    /// If either index is out of range.
    pub fn set(&mut self, row: usize, column: usize, value: Element) {
        assert!(row < self.size && column < self.size);
        *self.get_element_mut(row, column) = value;
    }

    /// # Panics
    ///
    /// If `row >= self.size()`.
    pub fn row(&self, row: usize) -> &[Element] {
        let start = row * self.size;
        let end = start + self.size;
        &self.data[start..end]
    }

    /// # Panics
    ///
    /// If `row >= self.size()`.
    pub fn row_mut(&mut self, row: usize) -> &mut [Element] {
        let start = row * self.size;
        let end = start + self.size;
        &mut self.data[start..end]
    }

    /// Iterate over the rows in order.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, Element> {
        self.data.chunks_exact(self.size)
    }

    /// The row-major element buffer.
    pub fn as_slice(&self) -> &[Element] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Element] {
        &mut self.data
    }

    /// Copy the elements out into a vector of rows.
    pub fn to_rows(&self) -> Vec<Vec<Element>> {
        self.rows().map(|row| row.to_vec()).collect()
    }
}

impl std::ops::Index<(usize, usize)> for Matrix {
    type Output = Element;

    fn index(&self, (row, column): (usize, usize)) -> &Self::Output {
        assert!(row < self.size && column < self.size);
        &self.data[row * self.size + column]
    }
}

impl std::ops::IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut Self::Output {
        assert!(row < self.size && column < self.size);
        self.get_element_mut(row, column)
    }
}

impl TryFrom<Vec<Vec<Element>>> for Matrix {
    type Error = MatrixError;

    fn try_from(value: Vec<Vec<Element>>) -> Result<Self, Self::Error> {
        Self::from_rows(value)
    }
}

impl From<Matrix> for Vec<Vec<Element>> {
    fn from(value: Matrix) -> Self {
        value.to_rows()
    }
}

#[cfg(test)]
mod matrix_tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(Matrix::new(0), Err(MatrixError::InvalidSize(0))));
        assert!(matches!(
            Matrix::from_rows(vec![]),
            Err(MatrixError::InvalidSize(0))
        ));
    }

    #[test]
    fn unaddressable_size_is_rejected() {
        // size * size overflows usize
        let size = 1usize << (usize::BITS / 2);
        assert!(matches!(
            Matrix::new(size),
            Err(MatrixError::InvalidSize(s)) if s == size
        ));
        assert!(matches!(
            Matrix::new(usize::MAX),
            Err(MatrixError::InvalidSize(_))
        ));
        assert!(Matrix::from_fn(size, |_, _| 1).is_err());
        assert!(Matrix::identity(size).is_err());
        // the element count fits but the byte count does not
        let size = 1usize << (usize::BITS / 2 - 1);
        assert!(matches!(
            Matrix::new(size),
            Err(MatrixError::InvalidSize(s)) if s == size
        ));
    }

    #[test]
    fn new_is_zero_filled() {
        let m = Matrix::new(4).unwrap();
        assert_eq!(m.size(), 4);
        assert_eq!(m.as_slice().len(), 16);
        assert!(m.as_slice().iter().all(|&x| x == 0));
        assert_eq!(m.byte_len(), 16 * std::mem::size_of::<Element>());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = Matrix::from_rows(vec![vec![1, 2], vec![3]]);
        assert!(matches!(result, Err(MatrixError::MalformedInput(_))));
        let result = Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert!(matches!(result, Err(MatrixError::MalformedInput(_))));
    }

    #[test]
    fn row_major_layout() {
        let m = Matrix::from_fn(3, |r, c| (10 * r + c) as Element).unwrap();
        assert_eq!(m.row(1), &[10, 11, 12]);
        assert_eq!(m[(2, 1)], 21);
        assert_eq!(m.get(2, 2), Some(22));
        assert_eq!(m.get(3, 0), None);
        assert_eq!(m.get(0, 3), None);
        assert_eq!(
            m.to_rows(),
            vec![vec![0, 1, 2], vec![10, 11, 12], vec![20, 21, 22]]
        );
    }

    #[test]
    fn clone_is_deep() {
        let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let mut b = a.clone();
        b.set(0, 0, 100);
        b[(1, 1)] = -4;
        assert_eq!(a[(0, 0)], 1);
        assert_eq!(a[(1, 1)], 4);
        assert_eq!(b.to_rows(), vec![vec![100, 2], vec![3, -4]]);
    }

    #[test]
    fn identity() {
        let i = Matrix::identity(3).unwrap();
        assert_eq!(i.to_rows(), vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]]);
    }

    #[test]
    #[should_panic]
    fn index_out_of_range_panics() {
        let m = Matrix::new(2).unwrap();
        let _ = m[(0, 2)];
    }
}
