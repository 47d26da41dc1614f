use std::{
    collections::{hash_map::Entry, BTreeMap, BTreeSet},
    fmt::Display,
    ops::{Index, Mul, Neg},
};

use ahash::HashMap;

use crate::{
    domains::Ring,
    printer::{MatrixPrinter, PrintMode},
};

/// The non-zero entries of a single row, indexed by column.
pub type SparseRow<E> = HashMap<u32, E>;

/// A sparse matrix with entries that are elements of a ring `F`.
///
/// Only entries that differ from zero are stored, as a map from row index to a
/// map from column index to value. A row without any entries is not stored at all.
/// Every enumeration visits the entries in row-major order.
/// The row and column indices are not checked against the dimensions of the matrix;
/// only the operations that enumerate the dense view, such as [Matrix::values] and
/// printing, are limited to the declared dimensions.
#[derive(Clone, Debug)]
pub struct Matrix<F: Ring> {
    pub(crate) rows: BTreeMap<u32, SparseRow<F::Element>>,
    /// The rows that have a stored entry, per column.
    columns: HashMap<u32, BTreeSet<u32>>,
    pub(crate) nrows: u32,
    pub(crate) ncols: u32,
    pub(crate) field: F,
    zero: F::Element,
}

/// Errors that can occur when constructing or combining matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    NotSquare,
    ShapeMismatch,
    DataLength { len: usize, nrows: u32, ncols: u32 },
}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixError::NotSquare => write!(f, "The matrix is not square"),
            MatrixError::ShapeMismatch => write!(f, "The shape of the matrix is not compatible"),
            MatrixError::DataLength { len, nrows, ncols } => write!(
                f,
                "Data length does not match matrix dimensions: {} vs ({},{})",
                len, nrows, ncols
            ),
        }
    }
}

impl std::error::Error for MatrixError {}

fn link(columns: &mut HashMap<u32, BTreeSet<u32>>, row: u32, col: u32) {
    columns.entry(col).or_default().insert(row);
}

fn unlink(columns: &mut HashMap<u32, BTreeSet<u32>>, row: u32, col: u32) {
    if let Some(rows) = columns.get_mut(&col) {
        rows.remove(&row);
        if rows.is_empty() {
            columns.remove(&col);
        }
    }
}

/// The entries of `row` in increasing column order.
fn sorted_entries<E>(row: &SparseRow<E>) -> impl Iterator<Item = (u32, &E)> {
    let mut entries: Vec<_> = row.iter().map(|(c, v)| (*c, v)).collect();
    entries.sort_unstable_by_key(|(c, _)| *c);
    entries.into_iter()
}

impl<F: Ring> Matrix<F> {
    /// Create a new zeroed matrix with `nrows` rows and `ncols` columns.
    pub fn new(nrows: u32, ncols: u32, field: F) -> Matrix<F> {
        Matrix {
            rows: BTreeMap::new(),
            columns: HashMap::default(),
            nrows,
            ncols,
            zero: field.zero(),
            field,
        }
    }

    /// Create a new square matrix with `nrows` rows and ones on the main diagonal and zeroes elsewhere.
    pub fn identity(nrows: u32, field: F) -> Matrix<F> {
        let mut m = Matrix::new(nrows, nrows, field);
        for i in 0..nrows {
            let one = m.field.one();
            m.set(i, i, one);
        }
        m
    }

    /// Convert a row-major linear representation of a matrix to a `Matrix`.
    pub fn from_linear(
        data: Vec<F::Element>,
        nrows: u32,
        ncols: u32,
        field: F,
    ) -> Result<Matrix<F>, MatrixError> {
        if data.len() != nrows as usize * ncols as usize {
            return Err(MatrixError::DataLength {
                len: data.len(),
                nrows,
                ncols,
            });
        }

        let mut m = Matrix::new(nrows, ncols, field);
        for (i, e) in data.into_iter().enumerate() {
            m.set(i as u32 / ncols, i as u32 % ncols, e);
        }
        Ok(m)
    }

    /// Create a new matrix from a 2-dimensional vector of scalars.
    pub fn from_nested_vec(matrix: Vec<Vec<F::Element>>, field: F) -> Result<Matrix<F>, MatrixError> {
        let cols = matrix.first().map(|r| r.len()).unwrap_or(0);
        if matrix.iter().any(|r| r.len() != cols) {
            return Err(MatrixError::ShapeMismatch);
        }

        let mut m = Matrix::new(matrix.len() as u32, cols as u32, field);
        for (r, row) in matrix.into_iter().enumerate() {
            for (c, e) in row.into_iter().enumerate() {
                m.set(r as u32, c as u32, e);
            }
        }
        Ok(m)
    }

    /// Return the number of rows.
    pub fn nrows(&self) -> u32 {
        self.nrows
    }

    /// Return the number of columns.
    pub fn ncols(&self) -> u32 {
        self.ncols
    }

    /// Return the field of the matrix entries.
    pub fn field(&self) -> &F {
        &self.field
    }

    /// Get the entry at `(row, col)`, which is zero if it is not stored.
    pub fn get(&self, row: u32, col: u32) -> F::Element {
        self[(row, col)].clone()
    }

    /// Set the entry at `(row, col)`. Setting an entry to zero removes it.
    pub fn set(&mut self, row: u32, col: u32, value: F::Element) {
        if self.field.is_zero(&value) {
            if let Some(r) = self.rows.get_mut(&row) {
                if r.remove(&col).is_some() {
                    unlink(&mut self.columns, row, col);
                }
                if r.is_empty() {
                    self.rows.remove(&row);
                }
            }
        } else if self.rows.entry(row).or_default().insert(col, value).is_none() {
            link(&mut self.columns, row, col);
        }
    }

    /// Iterate over all stored `(row, col, value)` triples in row-major order.
    pub fn nonzero_entries(&self) -> impl Iterator<Item = (u32, u32, &F::Element)> + '_ {
        self.rows
            .iter()
            .flat_map(|(r, row)| sorted_entries(row).map(move |(c, v)| (*r, c, v)))
    }

    /// Iterate over the stored `(col, value)` pairs of row `row` in column order.
    pub fn row_entries(&self, row: u32) -> impl Iterator<Item = (u32, &F::Element)> + '_ {
        self.rows.get(&row).into_iter().flat_map(|r| sorted_entries(r))
    }

    /// The first row in `from..to` that has a stored entry in column `col`.
    pub(crate) fn first_row_in_column(&self, col: u32, from: u32, to: u32) -> Option<u32> {
        if from >= to {
            return None;
        }

        self.columns.get(&col)?.range(from..to).next().copied()
    }

    /// Return the number of stored entries.
    pub fn nonzero_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Return true iff every entry in the matrix is zero.
    pub fn is_zero(&self) -> bool {
        self.rows.is_empty()
    }

    /// Return true iff the matrix is square.
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Swap rows `r1` and `r2`. Only the stored entries are moved.
    pub fn swap_rows(&mut self, r1: u32, r2: u32) {
        if r1 == r2 {
            return;
        }

        let a = self.rows.remove(&r1);
        let b = self.rows.remove(&r2);
        for c in a.iter().flat_map(|r| r.keys()) {
            unlink(&mut self.columns, r1, *c);
        }
        for c in b.iter().flat_map(|r| r.keys()) {
            unlink(&mut self.columns, r2, *c);
        }

        if let Some(a) = a {
            for c in a.keys() {
                link(&mut self.columns, r2, *c);
            }
            self.rows.insert(r2, a);
        }
        if let Some(b) = b {
            for c in b.keys() {
                link(&mut self.columns, r1, *c);
            }
            self.rows.insert(r1, b);
        }
    }

    /// Multiply every entry of row `row` by `scalar`.
    ///
    /// Multiplying by zero removes the row, which cannot be undone.
    pub fn multiply_row(&mut self, row: u32, scalar: &F::Element) {
        if self.field.is_zero(scalar) {
            if let Some(r) = self.rows.remove(&row) {
                for c in r.keys() {
                    unlink(&mut self.columns, row, *c);
                }
            }
            return;
        }

        if let Some(r) = self.rows.get_mut(&row) {
            for v in r.values_mut() {
                self.field.mul_assign(v, scalar);
            }

            // the product of non-zero floats may still underflow
            let (field, columns) = (&self.field, &mut self.columns);
            r.retain(|c, v| {
                let keep = !field.is_zero(v);
                if !keep {
                    unlink(columns, row, *c);
                }
                keep
            });
            if r.is_empty() {
                self.rows.remove(&row);
            }
        }
    }

    /// Add `scalar` times row `source` to row `destination`.
    pub fn add_scaled_row(&mut self, source: u32, destination: u32, scalar: &F::Element) {
        if self.field.is_zero(scalar) {
            return;
        }

        let source_entries: Vec<(u32, F::Element)> = match self.rows.get(&source) {
            Some(r) => r.iter().map(|(c, v)| (*c, v.clone())).collect(),
            None => return,
        };

        let dest = self.rows.entry(destination).or_default();
        for (c, v) in source_entries {
            let t = self.field.mul(&v, scalar);
            match dest.entry(c) {
                Entry::Occupied(mut o) => {
                    self.field.add_assign(o.get_mut(), &t);
                    if self.field.is_zero(o.get()) {
                        o.remove();
                        unlink(&mut self.columns, destination, c);
                    }
                }
                Entry::Vacant(e) => {
                    if !self.field.is_zero(&t) {
                        e.insert(t);
                        link(&mut self.columns, destination, c);
                    }
                }
            }
        }

        if dest.is_empty() {
            self.rows.remove(&destination);
        }
    }

    /// Return the dense `nrows x ncols` view of the matrix.
    pub fn values(&self) -> Vec<Vec<F::Element>> {
        (0..self.nrows)
            .map(|r| (0..self.ncols).map(|c| self.get(r, c)).collect())
            .collect()
    }

    /// Transpose the matrix.
    pub fn transpose(&self) -> Matrix<F> {
        let mut m = Matrix::new(self.ncols, self.nrows, self.field.clone());
        for (r, c, v) in self.nonzero_entries() {
            m.set(c, r, v.clone());
        }
        m
    }

    /// Multiply the scalar `e` to each entry of the matrix.
    pub fn mul_scalar(&self, e: &F::Element) -> Matrix<F> {
        let mut m = self.clone();
        for r in self.rows.keys() {
            m.multiply_row(*r, e);
        }
        m
    }

    /// Apply a function `f` to each stored entry of the matrix. Entries that
    /// map to zero in the new field are dropped.
    pub fn map<G: Ring>(&self, f: impl Fn(&F::Element) -> G::Element, field: G) -> Matrix<G> {
        let mut m = Matrix::new(self.nrows, self.ncols, field);
        for (r, c, v) in self.nonzero_entries() {
            m.set(r, c, f(v));
        }
        m
    }

    /// Create a printer with a custom print mode.
    pub fn printer(&self, print_mode: PrintMode) -> MatrixPrinter<'_, F> {
        MatrixPrinter::new_with_mode(self, print_mode)
    }
}

impl<F: Ring> Index<(u32, u32)> for Matrix<F> {
    type Output = F::Element;

    /// Get the `i`th row and `j`th column of the matrix, where `index=(i,j)`.
    #[inline]
    fn index(&self, index: (u32, u32)) -> &Self::Output {
        self.rows
            .get(&index.0)
            .and_then(|r| r.get(&index.1))
            .unwrap_or(&self.zero)
    }
}

impl<F: Ring> PartialEq for Matrix<F> {
    /// Two matrices are equal when they have the same dimensions and agree
    /// on every cell inside those dimensions.
    fn eq(&self, other: &Self) -> bool {
        if self.nrows != other.nrows || self.ncols != other.ncols {
            return false;
        }

        let in_bounds = |r: u32, c: u32| r < self.nrows && c < self.ncols;

        self.nonzero_entries()
            .filter(|(r, c, _)| in_bounds(*r, *c))
            .all(|(r, c, v)| self.field.is_equal(v, &other[(r, c)]))
            && other
                .nonzero_entries()
                .filter(|(r, c, _)| in_bounds(*r, *c))
                .all(|(r, c, v)| self.field.is_equal(v, &self[(r, c)]))
    }
}

impl<F: Ring> Display for Matrix<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        MatrixPrinter::new(self).fmt(f)
    }
}

impl<F: Ring> Mul<&Matrix<F>> for &Matrix<F> {
    type Output = Matrix<F>;

    /// Multiply two matrices, visiting only the stored entries. Every cell is
    /// accumulated in increasing order of the inner index.
    fn mul(self, rhs: &Matrix<F>) -> Self::Output {
        if self.ncols != rhs.nrows {
            panic!(
                "Cannot multiply matrices because of a dimension mismatch: ({},{}) vs ({},{})",
                self.nrows, self.ncols, rhs.nrows, rhs.ncols
            );
        }

        let mut m = Matrix::new(self.nrows, rhs.ncols, self.field.clone());
        for (i, row) in &self.rows {
            let mut acc: SparseRow<F::Element> = HashMap::default();
            for (k, a) in sorted_entries(row) {
                for (j, b) in rhs.row_entries(k) {
                    match acc.entry(j) {
                        Entry::Occupied(mut o) => self.field.add_mul_assign(o.get_mut(), a, b),
                        Entry::Vacant(e) => {
                            e.insert(self.field.mul(a, b));
                        }
                    }
                }
            }

            for (j, v) in acc {
                m.set(*i, j, v);
            }
        }

        m
    }
}

impl<F: Ring> Neg for Matrix<F> {
    type Output = Matrix<F>;

    /// Negate each entry of the matrix.
    fn neg(mut self) -> Self::Output {
        for row in self.rows.values_mut() {
            for e in row.values_mut() {
                *e = self.field.neg(e);
            }
        }

        self
    }
}
