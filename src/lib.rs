//! Sparse matrices over arbitrary fields, with a Gaussian elimination engine that
//! exposes its work as a replayable sequence of elementary row operations.
//!
//! For example:
//!
//! ```
//! use fieldmat::{
//!     domains::finite_field::FiniteField,
//!     tensors::matrix::Matrix,
//! };
//!
//! let f = FiniteField::new(11).unwrap();
//! let a = Matrix::from_nested_vec(
//!     vec![
//!         vec![f.to_element(3), f.to_element(5)],
//!         vec![f.to_element(1), f.to_element(2)],
//!     ],
//!     f,
//! )
//! .unwrap();
//!
//! let inv = a.inv().unwrap();
//! assert_eq!(&a * &inv, Matrix::identity(2, f));
//! println!("{}", inv);
//! ```
//!
//! The element types and their arithmetic are described by the [Ring](domains::Ring) and
//! [Field](domains::Field) traits in [domains]. Matrices live in [tensors].

pub mod domains;
pub mod printer;
pub mod tensors;
