use thiserror::Error;

/// Error type for this crate.
///
/// Every variant describes invalid input from the caller.
/// None of the operations in this crate abort the process
/// when handed bad input.
///
/// # Example
///
/// The second row has three values but the first row has two.
///
/// ```
/// let result = "1 2;3 4 5".parse::<sqmat::Matrix>();
/// assert!(matches!(result, Err(sqmat::MatrixError::MalformedInput(_))));
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MatrixError {
    /// A matrix of this size cannot be created.
    #[error("invalid matrix size: {0}")]
    InvalidSize(usize),
    /// The operands of a binary operation differ in size.
    #[error("shape mismatch: {left}x{left} vs {right}x{right}")]
    ShapeMismatch {
        /// Size of the left-hand operand.
        left: usize,
        /// Size of the right-hand operand.
        right: usize,
    },
    /// Errors related to row/column selections.
    #[error("invalid index set: {0}")]
    InvalidIndexSet(String),
    /// The block size is not a power of two dividing the matrix size.
    #[error("block size {block_size} is not a power of two dividing matrix size {size}")]
    NotPowerOfTwo {
        /// The requested block size.
        block_size: usize,
        /// The size of the source matrix.
        size: usize,
    },
    /// Errors decoding the text representation.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// Raising a matrix to this power is not supported.
    #[error("unsupported exponent: {0}")]
    UnsupportedExponent(u64),
    #[error(transparent)]
    /// Errors coming from `serde_yaml`.
    YamlError(#[from] serde_yaml::Error),
    #[cfg(feature = "json")]
    #[cfg_attr(doc_cfg, doc(cfg(feature = "json")))]
    #[error(transparent)]
    /// Errors coming from `serde_json`.
    JsonError(#[from] serde_json::Error),
}
