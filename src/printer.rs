use std::fmt::{self, Write};

use crate::{domains::Ring, tensors::matrix::Matrix};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PrintMode {
    /// One row per line, with every column padded to its widest entry.
    #[default]
    Grid,
    /// Nested lists, such as `{{1,2},{3,4}}`.
    Mathematica,
}

/// Prints the dense view of a [Matrix]: only the cells inside the declared
/// dimensions are printed.
pub struct MatrixPrinter<'a, F: Ring> {
    pub matrix: &'a Matrix<F>,
    pub print_mode: PrintMode,
}

impl<'a, F: Ring> MatrixPrinter<'a, F> {
    pub fn new(matrix: &'a Matrix<F>) -> MatrixPrinter<'a, F> {
        MatrixPrinter {
            matrix,
            print_mode: PrintMode::Grid,
        }
    }

    pub fn new_with_mode(matrix: &'a Matrix<F>, print_mode: PrintMode) -> MatrixPrinter<'a, F> {
        MatrixPrinter { matrix, print_mode }
    }

    fn fmt_grid(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cells: Vec<Vec<String>> = (0..self.matrix.nrows)
            .map(|r| {
                (0..self.matrix.ncols)
                    .map(|c| self.matrix[(r, c)].to_string())
                    .collect()
            })
            .collect();

        let mut widths = vec![0; self.matrix.ncols as usize];
        for row in &cells {
            for (w, s) in widths.iter_mut().zip(row) {
                *w = (*w).max(s.chars().count());
            }
        }

        for (i, row) in cells.iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }

            for (j, (s, w)) in row.iter().zip(&widths).enumerate() {
                if j + 1 == row.len() {
                    f.write_str(s)?;
                } else {
                    write!(f, "{:<width$} ", s, width = w)?;
                }
            }
        }

        Ok(())
    }

    fn fmt_mathematica(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char('{')?;
        for r in 0..self.matrix.nrows {
            if r > 0 {
                f.write_char(',')?;
            }
            f.write_char('{')?;
            for c in 0..self.matrix.ncols {
                if c > 0 {
                    f.write_char(',')?;
                }
                write!(f, "{}", self.matrix[(r, c)])?;
            }
            f.write_char('}')?;
        }
        f.write_char('}')
    }
}

impl<'a, F: Ring> fmt::Display for MatrixPrinter<'a, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.print_mode {
            PrintMode::Grid => self.fmt_grid(f),
            PrintMode::Mathematica => self.fmt_mathematica(f),
        }
    }
}
