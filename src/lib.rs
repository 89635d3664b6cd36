//! # Dense integer square matrices.
//!
//! A [`Matrix`] owns an `N x N` grid of [`Element`] (`i32`)
//! and supports:
//!
//! * elementwise addition and subtraction, scaling,
//!   and matrix products ([`Matrix::add_matrix`], [`Matrix::product`], ...),
//! * extraction of arbitrary row/column selections
//!   ([`Matrix::submatrix`]),
//! * downsampling by averaging power-of-two tiles
//!   ([`Matrix::block_average`]),
//! * exponentiation by repeated squaring ([`Matrix::power`]).
//!
//! Derived matrices are always new, independently owned values.
//! Invalid input is reported through [`MatrixError`].
//!
//! ```
//! let m = sqmat::loads("1 2 3 4;5 6 7 8;9 10 11 12;13 14 15 16").unwrap();
//! let b = m.block_average(2).unwrap();
//! assert_eq!(b.encode(), "3 5\n11 13\n");
//! let p = b.power(2).unwrap();
//! assert_eq!(p.encode(), "64 80\n176 224\n");
//! ```
//!
//! ## Allocation tracking
//!
//! The `_tracked` variants of the derivations report the
//! storage they allocate and release to an [`AllocHook`],
//! such as [`AllocTracker`].

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

mod macros;

mod arithmetic;
mod block_average;
mod codec;
mod error;
mod matrix;
mod power;
mod submatrix;
mod tracking;

pub use block_average::is_power_of_two;
pub use codec::{load_yaml, loads, loads_yaml};
#[cfg(feature = "json")]
pub use codec::{load_json, loads_json};
pub use error::MatrixError;
pub use matrix::{Element, Matrix};
pub use submatrix::IndexSet;
pub use tracking::{AllocHook, AllocStats, AllocTracker, Tracked};
