// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Linear model of LFSR113 over GF(2).
//! Every output bit is the XOR of a fixed subset of the 128 seed bits, so the map
//! from seed to observed bits is recovered by running the generator once per
//! single-bit seed and recording which observed bits it flips.

use rayon::prelude::*;

use crate::conditioning::{significant, PortRange};
use crate::gf2::BitMatrix;
use crate::rngs::{Lfsr113, State};

/// Number of seed bits, one matrix column each.
pub const STATE_BITS: usize = 128;

/// Significant bit count for each sample, in sample order.
pub fn significance_profile(samples: &[u32], range: &PortRange) -> Vec<u32> {
    samples.iter().map(|&s| significant(s, range)).collect()
}

/// Seed with only the bit for matrix column `col` set.
/// Columns run MSB first through s1, then s2, s3, s4.
pub fn unit_seed(col: usize) -> State {
    assert!(col < STATE_BITS);
    let mut words = [0u32; 4];
    words[col / 32] = 1 << (31 - col % 32);
    State(words)
}

/// Rows of the observation vector flipped by the seed bit of column `col`.
fn column_rows(col: usize, bits_per_sample: &[u32]) -> Vec<usize> {
    let mut rng = Lfsr113::from_state(unit_seed(col));
    let mut rows = vec![];
    let mut row_offset = 0usize;
    for &sig in bits_per_sample {
        let sample = rng.next_sample();
        for j in 0..sig {
            if (sample >> (31 - j)) & 1 == 1 {
                rows.push(row_offset + j as usize);
            }
        }
        row_offset += sig as usize;
    }
    rows
}

/// Build the `sum(bits_per_sample) x 128` generator matrix.
/// Row `r` is the seed-bit combination producing observation bit `r`.
/// The per-column replays are independent and run on the rayon pool.
pub fn generator_matrix(bits_per_sample: &[u32]) -> BitMatrix {
    let total_bits: usize = bits_per_sample.iter().map(|&s| s as usize).sum();
    let columns: Vec<Vec<usize>> = (0..STATE_BITS)
        .into_par_iter()
        .map(|col| column_rows(col, bits_per_sample))
        .collect();
    let mut m = BitMatrix::new(total_bits, STATE_BITS);
    for (col, rows) in columns.iter().enumerate() {
        for &row in rows {
            m.set(row, col, true);
        }
    }
    m
}
