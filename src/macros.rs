#![macro_use]

// Binary operators between two matrices are fallible,
// so their Output is a Result.
macro_rules! impl_fallible_matrix_op {
    ($op: ident, $fn: ident, $method: ident) => {
        impl std::ops::$op<&Matrix> for &Matrix {
            type Output = Result<Matrix, MatrixError>;
            fn $fn(self, rhs: &Matrix) -> Self::Output {
                self.$method(rhs)
            }
        }

        impl std::ops::$op<Matrix> for Matrix {
            type Output = Result<Matrix, MatrixError>;
            fn $fn(self, rhs: Matrix) -> Self::Output {
                (&self).$method(&rhs)
            }
        }
    };
}

macro_rules! impl_elementwise_method {
    ($name: ident, $assign: ident) => {
        pub(crate) fn $name(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
            let mut rv = self.clone();
            rv.$assign(rhs)?;
            Ok(rv)
        }
    };
}
