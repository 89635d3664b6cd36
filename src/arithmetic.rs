use crate::error::MatrixError;
use crate::matrix::{Element, Matrix};
use crate::tracking::{AllocHook, Tracked};

fn check_same_size(left: &Matrix, right: &Matrix) -> Result<(), MatrixError> {
    if left.size() == right.size() {
        Ok(())
    } else {
        Err(MatrixError::ShapeMismatch {
            left: left.size(),
            right: right.size(),
        })
    }
}

fn zip_in_place<F>(lhs: &mut Matrix, rhs: &Matrix, f: F) -> Result<(), MatrixError>
where
    F: Fn(Element, Element) -> Element,
{
    check_same_size(lhs, rhs)?;
    lhs.as_mut_slice()
        .iter_mut()
        .zip(rhs.as_slice().iter())
        .for_each(|(a, b)| *a = f(*a, *b));
    Ok(())
}

/// # Overflow
///
/// All arithmetic wraps around on overflow
/// (two's complement), as native `i32` arithmetic
/// does in release builds.
impl Matrix {
    /// Add `other` to `self`, elementwise.
    ///
    /// # Errors
    ///
    /// [`MatrixError::ShapeMismatch`] if the sizes differ.
    /// `self` is unchanged in that case.
    pub fn add_matrix(&mut self, other: &Matrix) -> Result<(), MatrixError> {
        zip_in_place(self, other, Element::wrapping_add)
    }

    /// Subtract `other` from `self`, elementwise.
    ///
    /// # Errors
    ///
    /// [`MatrixError::ShapeMismatch`] if the sizes differ.
    /// `self` is unchanged in that case.
    pub fn sub_matrix(&mut self, other: &Matrix) -> Result<(), MatrixError> {
        zip_in_place(self, other, Element::wrapping_sub)
    }

    /// Multiply every element by `k`.
    pub fn scale(&mut self, k: Element) {
        self.as_mut_slice()
            .iter_mut()
            .for_each(|x| *x = x.wrapping_mul(k));
    }

    /// The matrix product `self * other` as a new matrix.
    ///
    /// # Errors
    ///
    /// [`MatrixError::ShapeMismatch`] if the sizes differ.
    ///
    /// # Example
    ///
    /// ```
    /// let a: sqmat::Matrix = "1 2;3 4".parse().unwrap();
    /// let b: sqmat::Matrix = "5 6;7 8".parse().unwrap();
    /// assert_eq!(a.product(&b).unwrap().encode(), "19 22\n43 50\n");
    /// ```
    pub fn product(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        self.product_tracked(other, &()).map(Tracked::into_inner)
    }

    /// Same as [`Matrix::product`], reporting the allocation
    /// of the result to `hook`.
    pub fn product_tracked<'h, H>(
        &self,
        other: &Matrix,
        hook: &'h H,
    ) -> Result<Tracked<'h, H>, MatrixError>
    where
        H: AllocHook + ?Sized,
    {
        check_same_size(self, other)?;
        let n = self.size();
        let mut rv = Matrix::zeros(n);
        for i in 0..n {
            let lhs_row = self.row(i);
            let out_row = rv.row_mut(i);
            for (k, &a) in lhs_row.iter().enumerate() {
                for (out, &b) in out_row.iter_mut().zip(other.row(k).iter()) {
                    *out = out.wrapping_add(a.wrapping_mul(b));
                }
            }
        }
        Ok(Tracked::new(rv, hook))
    }

    /// Replace `self` with `self * other`.
    ///
    /// The product is accumulated in a separate buffer,
    /// so `other` may hold the same values as `self`.
    ///
    /// # Errors
    ///
    /// [`MatrixError::ShapeMismatch`] if the sizes differ.
    /// `self` is unchanged in that case.
    pub fn product_in_place(&mut self, other: &Matrix) -> Result<(), MatrixError> {
        *self = self.product(other)?;
        Ok(())
    }

    impl_elementwise_method!(sum, add_matrix);
    impl_elementwise_method!(difference, sub_matrix);
}

impl_fallible_matrix_op!(Add, add, sum);
impl_fallible_matrix_op!(Sub, sub, difference);
impl_fallible_matrix_op!(Mul, mul, product);

impl std::ops::Mul<Element> for &Matrix {
    type Output = Matrix;
    fn mul(self, k: Element) -> Self::Output {
        let mut rv = self.clone();
        rv.scale(k);
        rv
    }
}

impl std::ops::MulAssign<Element> for Matrix {
    fn mul_assign(&mut self, k: Element) {
        self.scale(k)
    }
}
