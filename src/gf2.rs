// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Dense matrix over GF(2) with just enough elimination to solve the LFSR113 system.
//! Rows are bit-packed into u64 words, column `c` lives in word `c / 64` at bit `c % 64`.
//! Addition is XOR, so row operations are word-wise XORs.

use std::fmt;

use crate::utils::xor_in_place;

#[derive(Clone, PartialEq, Eq)]
pub struct BitMatrix {
    nrows: usize,
    ncols: usize,
    words_per_row: usize,
    data: Vec<u64>,
}

impl BitMatrix {
    /// All-zero matrix.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        let words_per_row = ncols.div_ceil(64);
        BitMatrix {
            nrows,
            ncols,
            words_per_row,
            data: vec![0; nrows * words_per_row],
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        let word = self.data[row * self.words_per_row + col / 64];
        (word >> (col % 64)) & 1 == 1
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        let word = &mut self.data[row * self.words_per_row + col / 64];
        let mask = 1u64 << (col % 64);
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    fn row(&self, row: usize) -> &[u64] {
        &self.data[row * self.words_per_row..(row + 1) * self.words_per_row]
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for w in 0..self.words_per_row {
            self.data
                .swap(a * self.words_per_row + w, b * self.words_per_row + w);
        }
    }

    /// row[dst] ^= row[src]
    fn xor_row_into(&mut self, src: usize, dst: usize) {
        let n = self.words_per_row;
        if src < dst {
            let (head, tail) = self.data.split_at_mut(dst * n);
            xor_in_place(&mut tail[..n], &head[src * n..(src + 1) * n]);
        } else {
            let (head, tail) = self.data.split_at_mut(src * n);
            xor_in_place(&mut head[dst * n..(dst + 1) * n], &tail[..n]);
        }
    }

    /// Column of the leftmost 1 in `row`.
    fn leading_col(&self, row: usize) -> Option<usize> {
        self.row(row)
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
    }

    /// Number of non-zero rows.
    /// Only equals the rank once the matrix is in row echelon form.
    pub fn rank(&self) -> usize {
        (0..self.nrows)
            .filter(|&r| self.row(r).iter().any(|&w| w != 0))
            .count()
    }

    /// Gaussian elimination to row echelon form.
    /// `y` is the right hand side and receives every swap and XOR in lock-step.
    /// Panics unless `y` has one entry per row.
    pub fn row_reduce(&mut self, y: &mut [bool]) {
        assert_eq!(y.len(), self.nrows);
        let mut prow = 0;
        let mut pcol = 0;
        while prow < self.nrows && pcol < self.ncols {
            let Some(pivot) = (prow..self.nrows).find(|&r| self.get(r, pcol)) else {
                pcol += 1;
                continue;
            };
            self.swap_rows(prow, pivot);
            y.swap(prow, pivot);
            for r in prow + 1..self.nrows {
                if self.get(r, pcol) {
                    self.xor_row_into(prow, r);
                    y[r] ^= y[prow];
                }
            }
            prow += 1;
            pcol += 1;
        }
    }

    /// False if some all-zero row has a 1 on the right hand side.
    /// Expects a reduced matrix and `y` with one entry per row.
    pub fn is_consistent(&self, y: &[bool]) -> bool {
        (0..self.nrows).all(|r| self.leading_col(r).is_some() || !y[r])
    }

    /// Back-substitution of a row echelon matrix, solving `M * x = y` for x.
    /// Clears every pivot column above its pivot, working up from the lowest pivot.
    /// Columns without a pivot are returned as 0, so the result is only unique at full column rank.
    /// Panics unless `y` has one entry per row.
    pub fn solve(&mut self, y: &mut [bool]) -> Vec<bool> {
        assert_eq!(y.len(), self.nrows);
        let pivots: Vec<(usize, usize)> = (0..self.nrows)
            .filter_map(|r| self.leading_col(r).map(|c| (r, c)))
            .collect();
        for &(prow, pcol) in pivots.iter().rev() {
            for r in 0..prow {
                if self.get(r, pcol) {
                    self.xor_row_into(prow, r);
                    y[r] ^= y[prow];
                }
            }
        }
        let mut x = vec![false; self.ncols];
        for &(prow, pcol) in pivots.iter() {
            x[pcol] = y[prow];
        }
        x
    }
}

impl fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitMatrix {}x{}", self.nrows, self.ncols)?;
        for r in 0..self.nrows {
            let line: String = (0..self.ncols)
                .map(|c| if self.get(r, c) { '1' } else { '0' })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_rows(rows: &[&str]) -> BitMatrix {
        let mut m = BitMatrix::new(rows.len(), rows[0].len());
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().enumerate() {
                m.set(r, c, ch == '1');
            }
        }
        m
    }

    fn mul(m: &BitMatrix, x: &[bool]) -> Vec<bool> {
        (0..m.nrows())
            .map(|r| (0..m.ncols()).fold(false, |acc, c| acc ^ (m.get(r, c) & x[c])))
            .collect()
    }

    #[test]
    fn get_set_across_word_boundary() {
        let mut m = BitMatrix::new(2, 130);
        m.set(1, 63, true);
        m.set(1, 64, true);
        m.set(0, 129, true);
        assert!(m.get(1, 63) && m.get(1, 64) && m.get(0, 129));
        assert!(!m.get(0, 63));
        m.set(1, 64, false);
        assert!(!m.get(1, 64));
    }

    #[test]
    fn reduce_swaps_companion_vector() {
        let mut m = from_rows(&["011", "101", "110"]);
        let mut y = vec![true, false, false];
        m.row_reduce(&mut y);
        // Pivot for column 0 is row 1, swapped up with its y entry.
        assert!(m.get(0, 0));
        assert!(!y[0]);
        assert_eq!(m.leading_col(1), Some(1));
        // Rows sum to zero, so the last row vanishes.
        assert_eq!(m.rank(), 2);
        assert_eq!(m.leading_col(2), None);
    }

    #[test]
    fn reduce_skips_empty_columns() {
        let mut m = from_rows(&["0010", "0011", "0001"]);
        let mut y = vec![false, true, true];
        m.row_reduce(&mut y);
        assert_eq!(m.leading_col(0), Some(2));
        assert_eq!(m.leading_col(1), Some(3));
        assert_eq!(m.rank(), 2);
        assert!(m.is_consistent(&y));
    }

    #[test]
    fn solves_full_rank_system() {
        let m = from_rows(&["1101", "0111", "1011", "1110", "0110"]);
        let x = vec![true, false, true, true];
        let mut y = mul(&m, &x);
        let mut reduced = m.clone();
        reduced.row_reduce(&mut y);
        assert_eq!(reduced.rank(), 4);
        assert!(reduced.is_consistent(&y));
        assert_eq!(reduced.solve(&mut y), x);
    }

    #[test]
    fn solves_wide_packed_system() {
        // Upper triangular with a dense tail, spanning three words per row.
        let n = 150;
        let mut m = BitMatrix::new(n, n);
        for r in 0..n {
            m.set(r, r, true);
            for c in (r + 1..n).filter(|c| (c * 7 + r * 3) % 5 == 0) {
                m.set(r, c, true);
            }
        }
        let x: Vec<bool> = (0..n).map(|i| i % 3 == 0 || i % 7 == 1).collect();
        let mut y = mul(&m, &x);
        m.row_reduce(&mut y);
        assert_eq!(m.rank(), n);
        assert_eq!(m.solve(&mut y), x);
    }

    #[test]
    fn unused_columns_solve_to_zero() {
        let m = from_rows(&["1010", "0010", "1000"]);
        let x = vec![true, false, true, false];
        let mut y = mul(&m, &x);
        let mut reduced = m.clone();
        reduced.row_reduce(&mut y);
        assert_eq!(reduced.rank(), 2);
        assert!(reduced.is_consistent(&y));
        assert_eq!(reduced.solve(&mut y), x);
    }

    #[test]
    fn detects_inconsistent_system() {
        let mut m = from_rows(&["11", "11"]);
        let mut y = vec![true, false];
        m.row_reduce(&mut y);
        assert_eq!(m.rank(), 1);
        assert!(!m.is_consistent(&y));
    }

    #[test]
    #[should_panic]
    fn reduce_rejects_short_rhs() {
        let mut m = BitMatrix::new(3, 4);
        let mut y = vec![false; 2];
        m.row_reduce(&mut y);
    }
}
