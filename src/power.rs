use crate::error::MatrixError;
use crate::matrix::Matrix;
use crate::tracking::{AllocHook, Tracked};

fn power_recursive<'h, H>(
    base: &Matrix,
    n: u64,
    hook: &'h H,
) -> Result<Tracked<'h, H>, MatrixError>
where
    H: AllocHook + ?Sized,
{
    tracing::debug!(n, size = base.size(), "power");
    if n == 1 {
        return Ok(Tracked::new(base.clone(), hook));
    }
    let squared = base.product_tracked(base, hook)?;
    let half = power_recursive(&squared, n / 2, hook)?;
    if n % 2 == 0 {
        Ok(half)
    } else {
        base.product_tracked(&half, hook)
    }
}

impl Matrix {
    /// Raise the matrix to the `n`-th power by repeated squaring.
    ///
    /// Uses `O(log n)` matrix products.
    ///
    /// # Errors
    ///
    /// [`MatrixError::UnsupportedExponent`] if `n == 0`.
    /// A zeroth power is not defined by this operation;
    /// use [`Matrix::identity`] explicitly if that is what you want.
    ///
    /// # Example
    ///
    /// ```
    /// let m: sqmat::Matrix = "1 1;1 0".parse().unwrap();
    /// assert_eq!(m.power(5).unwrap().encode(), "8 5\n5 3\n");
    /// assert!(m.power(0).is_err());
    /// ```
    pub fn power(&self, n: u64) -> Result<Matrix, MatrixError> {
        self.power_tracked(n, &()).map(Tracked::into_inner)
    }

    /// Same as [`Matrix::power`], reporting the result and every
    /// intermediate product to `hook`.
    pub fn power_tracked<'h, H>(
        &self,
        n: u64,
        hook: &'h H,
    ) -> Result<Tracked<'h, H>, MatrixError>
    where
        H: AllocHook + ?Sized,
    {
        if n == 0 {
            return Err(MatrixError::UnsupportedExponent(n));
        }
        power_recursive(self, n, hook)
    }
}

#[cfg(test)]
mod power_tests {
    use super::*;
    use crate::tracking::AllocTracker;

    fn sample() -> Matrix {
        Matrix::from_rows(vec![vec![1, 2, 0], vec![-1, 3, 1], vec![2, 0, -2]]).unwrap()
    }

    fn naive_power(base: &Matrix, n: u64) -> Matrix {
        let mut rv = base.clone();
        for _ in 1..n {
            rv = rv.product(base).unwrap();
        }
        rv
    }

    #[test]
    fn first_power_is_a_copy() {
        let m = sample();
        assert_eq!(m.power(1).unwrap(), m);
    }

    #[test]
    fn fourth_power_is_square_of_square() {
        let m = sample();
        let sq = m.product(&m).unwrap();
        assert_eq!(m.power(4).unwrap(), sq.product(&sq).unwrap());
    }

    #[test]
    fn matches_repeated_multiplication() {
        let m = sample();
        for n in 1..=17 {
            assert_eq!(m.power(n).unwrap(), naive_power(&m, n), "n = {n}");
        }
    }

    #[test]
    fn zero_exponent_is_unsupported() {
        assert!(matches!(
            sample().power(0),
            Err(MatrixError::UnsupportedExponent(0))
        ));
    }

    #[test]
    fn large_exponent_of_identity() {
        let i = Matrix::identity(5).unwrap();
        assert_eq!(i.power(u64::MAX).unwrap(), i);
    }

    #[test]
    fn tracked_power_releases_intermediates() {
        let tracker = AllocTracker::new();
        let m = sample();
        let p = m.power_tracked(20, &tracker).unwrap();
        let stats = tracker.stats();
        assert_eq!(stats.bytes_allocated, m.byte_len());
        assert_eq!(stats.allocation_count, stats.release_count + 1);
        assert!(stats.peak_bytes > m.byte_len());
        assert_eq!(*p, naive_power(&m, 20));
        drop(p);
        assert_eq!(tracker.stats().bytes_allocated, 0);
    }
}
