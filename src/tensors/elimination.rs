//! Gaussian elimination as a lazy sequence of elementary row operations.
//!
//! A [RowReduction] owns a copy of the matrix it reduces and yields one [RowStep]
//! at a time, after applying it to its copy. The yielded operations can be replayed
//! on any other matrix with the same number of rows, which is how [Matrix::inv]
//! and [Matrix::solve] obtain their result without multiplying matrices.

use std::{fmt::Display, iter::FusedIterator};

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::domains::{Field, Ring};

use super::matrix::{Matrix, MatrixError};

/// An elementary row operation.
#[derive(Clone, Debug, PartialEq)]
pub enum RowOperation<E> {
    /// Exchange two rows.
    Swap { row1: u32, row2: u32 },
    /// `destination += scalar * source`.
    ScaledAdd {
        source: u32,
        destination: u32,
        scalar: E,
    },
    /// `row *= scalar`.
    Multiply { row: u32, scalar: E },
}

impl<E: Clone> RowOperation<E> {
    /// Apply the operation to `matrix` in-place.
    pub fn apply<F: Ring<Element = E>>(&self, matrix: &mut Matrix<F>) {
        match self {
            RowOperation::Swap { row1, row2 } => matrix.swap_rows(*row1, *row2),
            RowOperation::ScaledAdd {
                source,
                destination,
                scalar,
            } => matrix.add_scaled_row(*source, *destination, scalar),
            RowOperation::Multiply { row, scalar } => matrix.multiply_row(*row, scalar),
        }
    }
}

impl<E: Display> Display for RowOperation<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowOperation::Swap { row1, row2 } => write!(f, "R{} <-> R{}", row1, row2),
            RowOperation::ScaledAdd {
                source,
                destination,
                scalar,
            } => write!(f, "R{} += ({})*R{}", destination, scalar, source),
            RowOperation::Multiply { row, scalar } => write!(f, "R{} *= {}", row, scalar),
        }
    }
}

/// The state of the working matrix directly before and after an operation.
#[derive(Clone, Debug)]
pub struct Snapshot<F: Ring> {
    pub before: Matrix<F>,
    pub after: Matrix<F>,
}

/// A single step of a [RowReduction].
#[derive(Clone, Debug)]
pub struct RowStep<F: Ring> {
    pub operation: RowOperation<F::Element>,
    /// Only recorded when the reduction was created with [RowReduction::with_snapshots].
    pub snapshot: Option<Snapshot<F>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Look for a pivot in `column`, or, if `next_row` is set, clear the entries
    /// below the current pivot starting at `next_row`.
    Forward { column: u32, next_row: Option<u32> },
    /// Normalize pivot `remaining - 1`, or, if `next_above` is set, clear the
    /// entries above it starting at `next_above`.
    Backward {
        remaining: usize,
        next_above: Option<u32>,
    },
    Done,
}

/// An iterator over the row operations that bring a matrix into (reduced) row echelon form.
///
/// Pivots are chosen as the first non-zero entry in a column, without looking at
/// their magnitude, so that the reduction is reproducible over every field.
/// Operations that would not change the matrix are never yielded.
///
/// The iterator can only be consumed once: start a new reduction from
/// [Matrix::row_operations] to see the sequence again.
pub struct RowReduction<F: Field> {
    matrix: Matrix<F>,
    reduced: bool,
    record_snapshots: bool,
    pivot_row: u32,
    pivots: SmallVec<[(u32, u32); 16]>,
    phase: Phase,
}

impl<F: Field> RowReduction<F> {
    /// Create a reduction of `matrix`, which will be modified by the reduction.
    /// If `reduced` is set, the reduced row echelon form is computed.
    pub fn new(matrix: Matrix<F>, reduced: bool) -> RowReduction<F> {
        RowReduction {
            matrix,
            reduced,
            record_snapshots: false,
            pivot_row: 0,
            pivots: SmallVec::new(),
            phase: Phase::Forward {
                column: 0,
                next_row: None,
            },
        }
    }

    /// Record the working matrix before and after every step.
    pub fn with_snapshots(mut self) -> RowReduction<F> {
        self.record_snapshots = true;
        self
    }

    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    /// The working matrix in its current state.
    pub fn matrix(&self) -> &Matrix<F> {
        &self.matrix
    }

    /// The working matrix in its current state.
    pub fn into_matrix(self) -> Matrix<F> {
        self.matrix
    }

    /// The `(column, row)` pairs of the pivots found so far.
    pub fn pivots(&self) -> &[(u32, u32)] {
        &self.pivots
    }

    /// Apply all remaining steps and return the final matrix.
    pub fn finish(mut self) -> Matrix<F> {
        self.record_snapshots = false;
        for _ in self.by_ref() {}
        self.matrix
    }

    /// The first row in `from..to` with a non-zero entry in `column`.
    fn first_nonzero_row(&self, column: u32, from: u32, to: u32) -> Option<u32> {
        self.matrix.first_row_in_column(column, from, to)
    }

    fn start_backward(&self) -> Phase {
        if self.reduced && !self.pivots.is_empty() {
            Phase::Backward {
                remaining: self.pivots.len(),
                next_above: None,
            }
        } else {
            Phase::Done
        }
    }

    fn next_operation(&mut self) -> Option<RowOperation<F::Element>> {
        let field = self.matrix.field.clone();

        loop {
            match self.phase {
                Phase::Forward {
                    column,
                    next_row: None,
                } => {
                    if column >= self.matrix.ncols || self.pivot_row >= self.matrix.nrows {
                        self.phase = self.start_backward();
                        continue;
                    }

                    match self.first_nonzero_row(column, self.pivot_row, self.matrix.nrows) {
                        None => {
                            debug!("Free column {}", column);
                            self.phase = Phase::Forward {
                                column: column + 1,
                                next_row: None,
                            };
                        }
                        Some(j) => {
                            debug!("Pivot for column {} found in row {}", column, j);
                            self.phase = Phase::Forward {
                                column,
                                next_row: Some(self.pivot_row + 1),
                            };

                            if j != self.pivot_row {
                                return Some(RowOperation::Swap {
                                    row1: self.pivot_row,
                                    row2: j,
                                });
                            }
                        }
                    }
                }
                Phase::Forward {
                    column,
                    next_row: Some(start),
                } => match self.first_nonzero_row(column, start, self.matrix.nrows) {
                    Some(k) => {
                        self.phase = Phase::Forward {
                            column,
                            next_row: Some(k + 1),
                        };

                        let scalar = field.div(
                            &field.neg(&self.matrix[(k, column)]),
                            &self.matrix[(self.pivot_row, column)],
                        );

                        // a quotient of floats may underflow
                        if !field.is_zero(&scalar) {
                            return Some(RowOperation::ScaledAdd {
                                source: self.pivot_row,
                                destination: k,
                                scalar,
                            });
                        }
                    }
                    None => {
                        self.pivots.push((column, self.pivot_row));
                        self.pivot_row += 1;
                        self.phase = Phase::Forward {
                            column: column + 1,
                            next_row: None,
                        };
                    }
                },
                Phase::Backward { remaining: 0, .. } => {
                    self.phase = Phase::Done;
                }
                Phase::Backward {
                    remaining,
                    next_above: None,
                } => {
                    let (column, row) = self.pivots[remaining - 1];
                    let scalar = field.inv(&self.matrix[(row, column)]);
                    self.phase = Phase::Backward {
                        remaining,
                        next_above: Some(0),
                    };

                    if !field.is_one(&scalar) {
                        return Some(RowOperation::Multiply { row, scalar });
                    }
                }
                Phase::Backward {
                    remaining,
                    next_above: Some(start),
                } => {
                    let (column, row) = self.pivots[remaining - 1];
                    match self.first_nonzero_row(column, start, row) {
                        Some(above) => {
                            self.phase = Phase::Backward {
                                remaining,
                                next_above: Some(above + 1),
                            };

                            return Some(RowOperation::ScaledAdd {
                                source: row,
                                destination: above,
                                scalar: field.neg(&self.matrix[(above, column)]),
                            });
                        }
                        None => {
                            self.phase = Phase::Backward {
                                remaining: remaining - 1,
                                next_above: None,
                            };
                        }
                    }
                }
                Phase::Done => return None,
            }
        }
    }
}

impl<F: Field> Iterator for RowReduction<F> {
    type Item = RowStep<F>;

    fn next(&mut self) -> Option<RowStep<F>> {
        let operation = self.next_operation()?;
        trace!("{}", operation);

        let before = self.record_snapshots.then(|| self.matrix.clone());
        operation.apply(&mut self.matrix);
        let snapshot = before.map(|before| Snapshot {
            before,
            after: self.matrix.clone(),
        });

        Some(RowStep {
            operation,
            snapshot,
        })
    }
}

impl<F: Field> FusedIterator for RowReduction<F> {}

impl<F: Field> Matrix<F> {
    /// Start a lazy reduction of a copy of this matrix to (reduced) row echelon form.
    pub fn row_operations(&self, reduced: bool) -> RowReduction<F> {
        RowReduction::new(self.clone(), reduced)
    }

    /// Compute the row echelon form, or the reduced row echelon form if `reduced` is set.
    pub fn row_echelon_form(&self, reduced: bool) -> Matrix<F> {
        self.row_operations(reduced).finish()
    }

    /// Get the rank of the matrix.
    pub fn rank(&self) -> u32 {
        let m = self.row_echelon_form(false);
        (0..m.nrows)
            .rev()
            .find(|r| (0..m.ncols).any(|c| !m.field.is_zero(&m[(*r, c)])))
            .map(|r| r + 1)
            .unwrap_or(0)
    }

    /// Get the dimension of the kernel of the matrix.
    pub fn nullity(&self) -> u32 {
        self.ncols.saturating_sub(self.rank())
    }

    /// Compute the inverse of a square matrix, if it exists.
    ///
    /// The row operations that reduce the matrix to the identity are replayed
    /// on the identity, which turns it into the inverse.
    pub fn inv(&self) -> Option<Matrix<F>> {
        if !self.is_square() {
            debug!(
                "A {}x{} matrix has no inverse",
                self.nrows, self.ncols
            );
            return None;
        }

        let identity = Matrix::identity(self.ncols, self.field.clone());
        let mut inverse = identity.clone();
        let mut reduction = self.row_operations(true);
        let mut steps = 0;
        for step in reduction.by_ref() {
            step.operation.apply(&mut inverse);
            steps += 1;
        }

        if steps == 0 {
            return if *self == identity {
                Some(self.clone())
            } else {
                None
            };
        }

        if *reduction.matrix() != identity {
            debug!(
                "Matrix is singular: rank {} < {}",
                reduction.pivots().len(),
                self.ncols
            );
            return None;
        }

        Some(inverse)
    }

    /// Compute the determinant of a square matrix from its row echelon form.
    pub fn det(&self) -> Result<F::Element, MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare);
        }

        let mut reduction = self.row_operations(false);
        let mut swaps = 0usize;
        for step in reduction.by_ref() {
            if let RowOperation::Swap { .. } = step.operation {
                swaps += 1;
            }
        }

        let m = reduction.into_matrix();
        let d = self.field.product((0..m.nrows).map(|i| &m[(i, i)]));
        Ok(if swaps % 2 == 1 { self.field.neg(&d) } else { d })
    }

    /// Solve `A * x = b` for a square, invertible matrix `A`, by replaying
    /// the reduction of `A` on `b`. Returns `None` if `A` is singular.
    pub fn solve(&self, b: &Matrix<F>) -> Result<Option<Matrix<F>>, MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare);
        }
        if b.nrows != self.nrows {
            return Err(MatrixError::ShapeMismatch);
        }

        let mut x = b.clone();
        let mut reduction = self.row_operations(true);
        for step in reduction.by_ref() {
            step.operation.apply(&mut x);
        }

        if *reduction.matrix() != Matrix::identity(self.ncols, self.field.clone()) {
            return Ok(None);
        }

        Ok(Some(x))
    }
}

#[cfg(test)]
mod test {
    use crate::{
        domains::{
            finite_field::FiniteField,
            float::{RealField, REALS},
            rational::{Rational, Q},
            Ring,
        },
        tensors::matrix::{Matrix, MatrixError},
    };

    use super::RowOperation;

    fn reals(rows: &[&[f64]]) -> Matrix<RealField> {
        Matrix::from_nested_vec(rows.iter().map(|r| r.to_vec()).collect(), REALS).unwrap()
    }

    #[test]
    fn operations() {
        let a = reals(&[&[0., 2., 0.], &[0., 0., 3.], &[1., 0., 0.]]);
        let ops: Vec<_> = a.row_operations(true).map(|s| s.operation).collect();

        assert_eq!(
            ops,
            vec![
                RowOperation::Swap { row1: 0, row2: 2 },
                RowOperation::Swap { row1: 1, row2: 2 },
                RowOperation::Multiply {
                    row: 2,
                    scalar: 1. / 3.
                },
                RowOperation::Multiply {
                    row: 1,
                    scalar: 0.5
                },
            ]
        );

        assert_eq!(a.row_echelon_form(true), Matrix::identity(3, REALS));
    }

    #[test]
    fn unreduced() {
        let a = Matrix::from_nested_vec(
            vec![
                vec![2.into(), 4.into(), 1.into()],
                vec![1.into(), 2.into(), 3.into()],
                vec![0.into(), 1.into(), 1.into()],
            ],
            Q,
        )
        .unwrap();

        let ops: Vec<_> = a.row_operations(false).map(|s| s.operation).collect();
        assert_eq!(
            ops,
            vec![
                RowOperation::ScaledAdd {
                    source: 0,
                    destination: 1,
                    scalar: Rational::new(-1, 2).unwrap()
                },
                RowOperation::Swap { row1: 1, row2: 2 },
            ]
        );

        let e = a.row_echelon_form(false);
        assert_eq!(
            e.values(),
            vec![
                vec![2.into(), 4.into(), 1.into()],
                vec![0.into(), 1.into(), 1.into()],
                vec![0.into(), 0.into(), Rational::new(5, 2).unwrap()],
            ]
        );
    }

    #[test]
    fn snapshots() {
        let a = reals(&[&[1., 2.], &[3., 4.]]);
        let steps: Vec<_> = a.row_operations(true).with_snapshots().collect();
        assert!(!steps.is_empty());

        let mut previous = a.clone();
        for step in &steps {
            let snapshot = step.snapshot.as_ref().unwrap();
            assert_eq!(snapshot.before, previous);

            let mut replayed = snapshot.before.clone();
            step.operation.apply(&mut replayed);
            assert_eq!(replayed, snapshot.after);
            previous = snapshot.after.clone();
        }

        assert_eq!(previous, Matrix::identity(2, REALS));
        assert!(a.row_operations(true).all(|s| s.snapshot.is_none()));
    }

    #[test]
    fn lazy() {
        let a = reals(&[&[0., 1.], &[1., 0.]]);
        let mut reduction = a.row_operations(true);
        let first = reduction.next().unwrap();
        assert_eq!(first.operation, RowOperation::Swap { row1: 0, row2: 1 });
        assert_eq!(reduction.matrix(), &Matrix::identity(2, REALS));
        assert!(reduction.next().is_none());
        assert!(reduction.next().is_none());

        // the original is untouched
        assert_eq!(a.get(0, 1), 1.);
    }

    #[test]
    fn no_op_steps_are_suppressed() {
        let i = Matrix::identity(4, Q);
        assert_eq!(i.row_operations(true).count(), 0);
        assert_eq!(Matrix::new(3, 3, Q).row_operations(true).count(), 0);

        let a = reals(&[&[1., 0.], &[0., 1.], &[0., 0.]]);
        assert_eq!(a.row_operations(true).count(), 0);
    }

    #[test]
    fn rank_and_nullity() {
        let a = reals(&[&[1., 2., 10.], &[3., 4., 30.], &[5., 6., 50.]]);
        assert_eq!(a.rank(), 2);
        assert_eq!(a.nullity(), 1);
        assert!(a.inv().is_none());

        let wide = Matrix::from_nested_vec(
            vec![
                vec![0.into(), 1.into(), 2.into(), 3.into()],
                vec![0.into(), 2.into(), 4.into(), 6.into()],
            ],
            Q,
        )
        .unwrap();
        assert_eq!(wide.rank(), 1);
        assert_eq!(wide.nullity(), 3);

        assert_eq!(Matrix::new(3, 3, Q).rank(), 0);
        assert_eq!(Matrix::identity(5, Q).rank(), 5);
    }

    #[test]
    fn inverse() {
        let f = FiniteField::new(11).unwrap();
        let a = Matrix::from_nested_vec(
            vec![
                vec![f.to_element(3), f.to_element(5)],
                vec![f.to_element(1), f.to_element(2)],
            ],
            f,
        )
        .unwrap();

        let inv = a.inv().unwrap();
        assert_eq!(
            inv.values(),
            vec![
                vec![f.to_element(2), f.to_element(6)],
                vec![f.to_element(10), f.to_element(3)],
            ]
        );
        assert_eq!(&a * &inv, Matrix::identity(2, f));

        let a = Matrix::from_linear(
            vec![
                1.into(),
                2.into(),
                3.into(),
                4.into(),
                5.into(),
                16.into(),
                7.into(),
                8.into(),
                9.into(),
            ],
            3,
            3,
            Q,
        )
        .unwrap();

        assert_eq!(
            a.inv().unwrap().values().concat(),
            vec![
                Rational::new(-83, 60).unwrap(),
                Rational::new(1, 10).unwrap(),
                Rational::new(17, 60).unwrap(),
                Rational::new(19, 15).unwrap(),
                Rational::new(-1, 5).unwrap(),
                Rational::new(-1, 15).unwrap(),
                Rational::new(-1, 20).unwrap(),
                Rational::new(1, 10).unwrap(),
                Rational::new(-1, 20).unwrap(),
            ]
        );

        assert!(Matrix::new(2, 3, Q).inv().is_none());
        assert_eq!(Matrix::identity(3, Q).inv(), Some(Matrix::identity(3, Q)));
    }

    #[test]
    fn inverse_of_reduced_non_identity() {
        // already in reduced form, so no operations are generated
        let a = reals(&[&[1., 0.], &[0., 0.]]);
        assert_eq!(a.row_operations(true).count(), 0);
        assert!(a.inv().is_none());
    }

    #[test]
    fn determinant() {
        let a = Matrix::from_linear(
            vec![
                1.into(),
                2.into(),
                3.into(),
                4.into(),
                5.into(),
                16.into(),
                7.into(),
                8.into(),
                9.into(),
            ],
            3,
            3,
            Q,
        )
        .unwrap();
        assert_eq!(a.det().unwrap(), 60.into());

        let swapped = reals(&[&[0., 1.], &[1., 0.]]);
        assert_eq!(swapped.det().unwrap(), -1.);

        let singular = reals(&[&[1., 2.], &[2., 4.]]);
        assert_eq!(singular.det().unwrap(), 0.);

        assert_eq!(Matrix::new(2, 3, Q).det(), Err(MatrixError::NotSquare));
    }

    #[test]
    fn solve() {
        let a = Matrix::from_linear(
            vec![
                1.into(),
                2.into(),
                3.into(),
                4.into(),
                5.into(),
                16.into(),
                7.into(),
                8.into(),
                9.into(),
            ],
            3,
            3,
            Q,
        )
        .unwrap();
        let b = Matrix::from_linear(vec![1.into(), 2.into(), 3.into()], 3, 1, Q).unwrap();

        let r = a.solve(&b).unwrap().unwrap();
        assert_eq!(
            r.values().concat(),
            vec![Rational::new(-1, 3).unwrap(), Rational::new(2, 3).unwrap(), Q.zero()]
        );

        let wrong = Matrix::new(2, 1, Q);
        assert_eq!(a.solve(&wrong), Err(MatrixError::ShapeMismatch));

        let singular = reals(&[&[1., 2.], &[2., 4.]]);
        assert_eq!(singular.solve(&reals(&[&[1.], &[1.]])), Ok(None));
    }
}
