// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! State recovery and prediction.
//! Samples are turned into a linear system `M * x = y` over GF(2), where x are the
//! 128 seed bits. Only 113 of those bits influence any output, so a full rank
//! system pins down the canonical seed.

use log::{debug, error, warn};

use crate::conditioning::{deflate, marshal, unmarshal, PortRange};
use crate::error::{Error, Result};
use crate::linear_model::{generator_matrix, significance_profile};
use crate::rngs::{Lfsr113, State};

/// Rank of the LFSR113 system, 128 seed bits minus the 15 masked ones.
pub const REQUIRED_RANK: usize = 113;

/// Check every sample lies within the range.
pub fn validate_samples(samples: &[u32], range: &PortRange) -> Result<()> {
    match samples.iter().position(|&s| !range.contains(s)) {
        Some(index) => Err(Error::SampleOutOfRange {
            index,
            sample: samples[index],
            low: range.low(),
            high: range.high(),
        }),
        None => Ok(()),
    }
}

/// Recover the canonical seed that produced `samples`, in order, from the first one.
pub fn recover_state(samples: &[u32], range: &PortRange) -> Result<State> {
    validate_samples(samples, range)?;

    let mut y: Vec<bool> = samples.iter().flat_map(|&s| marshal(s, range)).collect();
    let profile = significance_profile(samples, range);
    let total_bits: usize = profile.iter().map(|&s| s as usize).sum();
    debug!(
        "{} samples, significant bits per sample {:?}, {} total",
        samples.len(),
        profile,
        total_bits
    );
    if total_bits < REQUIRED_RANK {
        return Err(Error::InsufficientInformation {
            bits: total_bits,
            required: REQUIRED_RANK,
        });
    }

    let mut m = generator_matrix(&profile);
    m.row_reduce(&mut y);
    let rank = m.rank();
    debug!("generator matrix {}x{} has rank {}", m.nrows(), m.ncols(), rank);
    if rank != REQUIRED_RANK {
        return Err(Error::RankMismatch {
            rank,
            expected: REQUIRED_RANK,
        });
    }
    if !m.is_consistent(&y) {
        return Err(Error::InconsistentSamples);
    }

    let x = m.solve(&mut y);
    let state = unmarshal(&x).inspect_err(|e| error!("internal error: {}", e))?;
    let degenerate = state.degenerate_words();
    if !degenerate.is_empty() {
        warn!(
            "recovered state {} has words {:?} stuck at zero",
            state, degenerate
        );
    }
    Ok(state)
}

/// The first `count` samples generated from `state`.
pub fn replay(state: &State, range: &PortRange, count: usize) -> Vec<u32> {
    predict_next(state, 0, range, count)
}

/// Samples `consumed..consumed + count` generated from `state`.
pub fn predict_next(state: &State, consumed: usize, range: &PortRange, count: usize) -> Vec<u32> {
    let mut rng = Lfsr113::from_state(*state);
    rng.skip_samples(consumed);
    (0..count)
        .map(|_| deflate(rng.next_sample(), range))
        .collect()
}
