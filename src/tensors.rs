//! Sparse matrices over a field and the row reduction engine built on them.

pub mod elimination;
pub mod matrix;
