use crate::error::MatrixError;
use crate::matrix::Matrix;
use crate::tracking::{AllocHook, Tracked};

/// A selection of row or column indexes.
///
/// The order of the indexes does not matter to
/// [`Matrix::submatrix`]: output rows and columns always
/// follow ascending source order.
/// Repeated indexes select a row or column once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexSet(Vec<usize>);

impl IndexSet {
    /// The contiguous indexes `lo..hi`.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidIndexSet`] if `hi <= lo`.
    pub fn range(lo: usize, hi: usize) -> Result<Self, MatrixError> {
        if hi <= lo {
            return Err(MatrixError::InvalidIndexSet(format!(
                "empty range {lo}..{hi}"
            )));
        }
        Ok(Self((lo..hi).collect()))
    }

    /// Number of indexes, counting repeats.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if there are no indexes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for IndexSet {
    fn from(value: Vec<usize>) -> Self {
        Self(value)
    }
}

impl From<std::ops::Range<usize>> for IndexSet {
    fn from(value: std::ops::Range<usize>) -> Self {
        Self(value.collect())
    }
}

impl std::ops::Deref for IndexSet {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Membership mask over 0..size; validates range and distinct count.
fn selection_mask(
    indexes: &[usize],
    size: usize,
    count: usize,
    what: &str,
) -> Result<Vec<bool>, MatrixError> {
    let mut mask = vec![false; size];
    for &index in indexes {
        if index >= size {
            return Err(MatrixError::InvalidIndexSet(format!(
                "{what} index {index} out of range for matrix size {size}"
            )));
        }
        mask[index] = true;
    }
    let selected = mask.iter().filter(|&&m| m).count();
    if selected != count {
        return Err(MatrixError::InvalidIndexSet(format!(
            "{what} indexes select {selected} distinct values, expected {count}"
        )));
    }
    Ok(mask)
}

impl Matrix {
    /// Extract the rows in `rows` and the columns in `columns`
    /// into a new `count x count` matrix.
    ///
    /// Rows are visited in ascending source order and each selected
    /// row contributes the next output row; the same holds for columns.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidIndexSet`] if
    ///
    /// * `count` is zero or larger than `self.size()`,
    /// * any index is `>= self.size()`,
    /// * either selection does not contain exactly `count`
    ///   distinct indexes.
    ///
    /// # Example
    ///
    /// ```
    /// let m: sqmat::Matrix = "1 2 3;4 5 6;7 8 9".parse().unwrap();
    /// let s = m.submatrix(&[2, 0], &[1, 2], 2).unwrap();
    /// assert_eq!(s.encode(), "2 3\n8 9\n");
    /// ```
    pub fn submatrix(
        &self,
        rows: &[usize],
        columns: &[usize],
        count: usize,
    ) -> Result<Matrix, MatrixError> {
        self.submatrix_tracked(rows, columns, count, &())
            .map(Tracked::into_inner)
    }

    /// Same as [`Matrix::submatrix`], reporting the allocation
    /// of the result to `hook`.
    pub fn submatrix_tracked<'h, H>(
        &self,
        rows: &[usize],
        columns: &[usize],
        count: usize,
        hook: &'h H,
    ) -> Result<Tracked<'h, H>, MatrixError>
    where
        H: AllocHook + ?Sized,
    {
        if count == 0 || count > self.size() {
            return Err(MatrixError::InvalidIndexSet(format!(
                "count {count} must be in 1..={}",
                self.size()
            )));
        }
        let row_mask = selection_mask(rows, self.size(), count, "row")?;
        let column_mask = selection_mask(columns, self.size(), count, "column")?;

        tracing::debug!(count, source_size = self.size(), "submatrix");

        let mut rv = Matrix::zeros(count);
        let selected_rows = self
            .rows()
            .zip(row_mask.iter())
            .filter_map(|(row, &keep)| keep.then_some(row));
        for (out_row, row) in selected_rows.enumerate() {
            let selected = row
                .iter()
                .zip(column_mask.iter())
                .filter_map(|(value, &keep)| keep.then_some(*value));
            for (out, value) in rv.row_mut(out_row).iter_mut().zip(selected) {
                tracing::trace!(value, "submatrix: adding");
                *out = value;
            }
        }
        Ok(Tracked::new(rv, hook))
    }
}
