use crate::error::MatrixError;
use crate::matrix::{Element, Matrix};
use crate::submatrix::IndexSet;
use crate::tracking::{AllocHook, Tracked};

/// `true` if `value` is a (nonzero) power of two.
pub fn is_power_of_two(value: usize) -> bool {
    value != 0 && (value & (value - 1)) == 0
}

// A block larger than the matrix cannot divide it.
fn validate_block_size(block_size: usize, size: usize) -> Result<(), MatrixError> {
    if !is_power_of_two(block_size) || size % block_size != 0 {
        return Err(MatrixError::NotPowerOfTwo { block_size, size });
    }
    Ok(())
}

impl Matrix {
    /// Mean of all elements, truncated toward zero.
    pub fn average(&self) -> Element {
        let sum: i64 = self.as_slice().iter().map(|&x| i64::from(x)).sum();
        let count = (self.size() * self.size()) as i64;
        tracing::trace!(sum, count, "average");
        // The mean of i32 values is always within the i32 range.
        (sum / count) as Element
    }

    /// Downsample by averaging disjoint `block_size x block_size` tiles.
    ///
    /// Output element `(i, j)` is the truncated mean of the tile
    /// covering rows `i * block_size..(i + 1) * block_size` and
    /// the same range of columns.
    ///
    /// # Errors
    ///
    /// [`MatrixError::NotPowerOfTwo`] if `block_size` is not a power
    /// of two or does not divide `self.size()`.
    /// This includes any `block_size` larger than `self.size()`.
    ///
    /// # Example
    ///
    /// ```
    /// let m: sqmat::Matrix = "1 2 3 4;5 6 7 8;9 10 11 12;13 14 15 16".parse().unwrap();
    /// assert_eq!(m.block_average(2).unwrap().encode(), "3 5\n11 13\n");
    /// assert_eq!(m.block_average(4).unwrap().encode(), "8\n");
    /// ```
    pub fn block_average(&self, block_size: usize) -> Result<Matrix, MatrixError> {
        self.block_average_tracked(block_size, &())
            .map(Tracked::into_inner)
    }

    /// Same as [`Matrix::block_average`], reporting the result
    /// and every intermediate tile to `hook`.
    pub fn block_average_tracked<'h, H>(
        &self,
        block_size: usize,
        hook: &'h H,
    ) -> Result<Tracked<'h, H>, MatrixError>
    where
        H: AllocHook + ?Sized,
    {
        validate_block_size(block_size, self.size())?;
        let tiles = self.size() / block_size;
        tracing::debug!(block_size, tiles, "block average");

        let mut rv = Tracked::new(Matrix::zeros(tiles), hook);
        for i in 0..tiles {
            let rows = IndexSet::range(i * block_size, (i + 1) * block_size)?;
            for j in 0..tiles {
                let columns = IndexSet::range(j * block_size, (j + 1) * block_size)?;
                let tile = self.submatrix_tracked(&rows, &columns, block_size, hook)?;
                rv[(i, j)] = tile.average();
                tracing::debug!(i, j, average = rv[(i, j)], "tile");
            }
        }
        Ok(rv)
    }
}
