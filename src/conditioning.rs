// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Methods to turn 32-bit generator outputs into range-constrained samples and back.
//! Narrowing a u32 into a small range destroys its low bits; only the leading
//! bits shared by every pre-image of a sample survive and can be used as equations.

use crate::error::{Error, Result};
use crate::rngs::State;

/// Largest valid port number.
pub const PORT_MAX: u32 = 65535;

/// Inclusive, validated port range `[low, high]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PortRange {
    low: u32,
    high: u32,
}

impl PortRange {
    /// Requires `low < high <= PORT_MAX`.
    pub fn new(low: u32, high: u32) -> Result<Self> {
        if high <= low || high > PORT_MAX {
            return Err(Error::InvalidRange { low, high });
        }
        Ok(PortRange { low, high })
    }

    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    /// Number of values in the range, `high - low + 1`.
    pub fn size(&self) -> u64 {
        (self.high - self.low) as u64 + 1
    }

    pub fn contains(&self, sample: u32) -> bool {
        self.low <= sample && sample <= self.high
    }

    /// Bits needed to index the range, `ceil(log2(size))`.
    pub fn bit_width(&self) -> u32 {
        64 - (self.size() - 1).leading_zeros()
    }
}

/// Maps a u32 into the range, port of the kernels `reciprocal_scale()`.
/// floor(x * size / 2**32) + low
pub fn deflate(x: u32, range: &PortRange) -> u32 {
    ((x as u64 * range.size()) >> 32) as u32 + range.low
}

/// Smallest u32 that deflates to `x`.
/// ceil((x - low) * 2**32 / size), truncated to 32 bits so that `high + 1` wraps to 0.
/// `x` must lie in `low..=high + 1`.
pub fn inflate(x: u32, range: &PortRange) -> u32 {
    debug_assert!(range.low <= x && x <= range.high + 1);
    let offset = (x - range.low) as u64;
    (offset << 32).div_ceil(range.size()) as u32
}

/// Number of leading bits every pre-image of `sample` agrees on.
/// Result is in 0..=32. `sample` must lie in the range.
pub fn significant(sample: u32, range: &PortRange) -> u32 {
    debug_assert!(range.contains(sample));
    let lower = inflate(sample, range);
    let upper = inflate(sample + 1, range).wrapping_sub(1);
    (lower ^ upper).leading_zeros()
}

/// Significant bits of a sample, most significant first.
/// `sample` must lie in the range, see `solver::validate_samples`.
pub fn marshal(sample: u32, range: &PortRange) -> Vec<bool> {
    let sig = significant(sample, range);
    let x = inflate(sample, range);
    (0..sig).map(|i| (x >> (31 - i)) & 1 == 1).collect()
}

/// Pack 128 solution bits into four state words, MSB first.
pub fn unmarshal(bits: &[bool]) -> Result<State> {
    if bits.len() != 128 {
        return Err(Error::MalformedSolution { bits: bits.len() });
    }
    let mut words = [0u32; 4];
    for (word, chunk) in words.iter_mut().zip(bits.chunks_exact(32)) {
        *word = chunk.iter().fold(0u32, |acc, &bit| (acc << 1) | bit as u32);
    }
    Ok(State(words))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn range_validation() {
        assert!(PortRange::new(0, 65535).is_ok());
        assert_eq!(
            PortRange::new(5, 5),
            Err(Error::InvalidRange { low: 5, high: 5 })
        );
        assert!(PortRange::new(10, 9).is_err());
        assert!(PortRange::new(0, 65536).is_err());
    }

    #[test]
    fn range_sizes() {
        let full = PortRange::new(0, 65535).unwrap();
        assert_eq!(full.size(), 65536);
        assert_eq!(full.bit_width(), 16);
        let linux = PortRange::new(32768, 60999).unwrap();
        assert_eq!(linux.size(), 28232);
        assert_eq!(linux.bit_width(), 15);
        assert!(linux.contains(32768) && linux.contains(60999));
        assert!(!linux.contains(61000));
    }

    #[test]
    fn deflate_bounds() {
        let range = PortRange::new(32768, 60999).unwrap();
        assert_eq!(deflate(0, &range), 32768);
        assert_eq!(deflate(u32::MAX, &range), 60999);
        let full = PortRange::new(0, 65535).unwrap();
        assert_eq!(deflate(0xabcd_1234, &full), 0xabcd);
    }

    #[test]
    fn inflate_wraps_past_high() {
        let range = PortRange::new(1024, 2047).unwrap();
        assert_eq!(inflate(1024, &range), 0);
        assert_eq!(inflate(2048, &range), 0);
        assert_eq!(inflate(1025, &range), 1 << 22);
    }

    #[test]
    fn deflate_inverts_inflate_small_range() {
        let range = PortRange::new(1000, 1999).unwrap();
        for sample in range.low()..=range.high() {
            assert_eq!(deflate(inflate(sample, &range), &range), sample);
        }
    }

    #[test]
    fn deflate_inverts_inflate_port_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for (low, high) in [(0, 65535), (32768, 60999), (49152, 65535), (1, 2)] {
            let range = PortRange::new(low, high).unwrap();
            for _ in 0..2000 {
                let sample = rng.random_range(low..=high);
                assert_eq!(deflate(inflate(sample, &range), &range), sample);
            }
        }
    }

    #[test]
    fn significance_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for (low, high) in [(0, 65535), (32768, 60999), (49152, 65535), (0, 1)] {
            let range = PortRange::new(low, high).unwrap();
            for _ in 0..2000 {
                let sample = rng.random_range(low..=high);
                let sig = significant(sample, &range);
                assert!(sig <= 32);
                // The pre-image interval spans at least 2**(32 - bit_width) values.
                assert!(sig <= range.bit_width(), "sig {} for {}", sig, sample);
            }
        }
    }

    #[test]
    fn straddling_sample_loses_all_bits() {
        // Pre-image of 0 is [0, 0x7fffffff], of 1 is [0x80000000, 0xffffffff].
        let range = PortRange::new(0, 1).unwrap();
        assert_eq!(significant(0, &range), 1);
        assert_eq!(significant(1, &range), 1);
        // 3 does not divide 2**32, so the middle interval crosses the top bit.
        let range = PortRange::new(0, 2).unwrap();
        assert_eq!(significant(1, &range), 0);
        assert!(marshal(1, &range).is_empty());
    }

    #[test]
    fn range_edges_are_valid_inputs() {
        let range = PortRange::new(32768, 60999).unwrap();
        assert_eq!(inflate(range.high() + 1, &range), 0);
        assert!(significant(range.low(), &range) <= range.bit_width());
        assert!(significant(range.high(), &range) <= range.bit_width());
        let top = PortRange::new(65534, 65535).unwrap();
        assert_eq!(marshal(65535, &top), vec![true]);
    }

    #[test]
    fn power_of_two_range_is_exact() {
        let range = PortRange::new(0, 65535).unwrap();
        for sample in [0, 1, 4242, 65535] {
            assert_eq!(significant(sample, &range), 16);
        }
    }

    #[test]
    fn significant_bits_shared_by_preimages() {
        let range = PortRange::new(32768, 60999).unwrap();
        for sample in [32768, 40000, 50001, 60999] {
            let sig = significant(sample, &range);
            let lower = inflate(sample, &range);
            let upper = inflate(sample + 1, &range).wrapping_sub(1);
            assert_eq!(deflate(lower, &range), sample);
            assert_eq!(deflate(upper, &range), sample);
            if sig > 0 {
                assert_eq!(lower >> (32 - sig), upper >> (32 - sig));
            }
        }
    }

    #[test]
    fn marshal_takes_leading_bits() {
        let range = PortRange::new(0, 65535).unwrap();
        let bits = marshal(0x8001, &range);
        assert_eq!(bits.len(), 16);
        assert!(bits[0]);
        assert!(bits[15]);
        assert!(bits[1..15].iter().all(|&b| !b));
    }

    #[test]
    fn unmarshal_packs_msb_first() {
        let mut bits = vec![false; 128];
        bits[0] = true;
        bits[63] = true;
        bits[64 + 28] = true;
        bits[127] = true;
        let state = unmarshal(&bits).unwrap();
        assert_eq!(state, State([0x8000_0000, 0x0000_0001, 0x0000_0008, 0x0000_0001]));
    }

    #[test]
    fn unmarshal_rejects_wrong_length() {
        assert_eq!(
            unmarshal(&[true; 127]),
            Err(Error::MalformedSolution { bits: 127 })
        );
    }
}
