// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! LFSR113 combined tausworthe generator (L'Ecuyer 1999).
//! Implements the rand crates RNG interface and additional methods like:
//! advance(delta: usize), skip_samples(count: usize)

use std::{fmt, str::FromStr};

use rand::{
    rand_core::impls::{fill_bytes_via_next, next_u64_via_u32},
    RngCore, SeedableRng,
};

/// Generator steps drawn per logical port sample. Only the second output is observed.
pub const STEPS_PER_SAMPLE: usize = 2;

/// Per word (a, b, c, d) tausworthe parameters.
const PARAMS: [(u32, u32, u32, u32); 4] = [
    (6, 13, 0xfffffffe, 18),
    (2, 27, 0xfffffff8, 2),
    (13, 21, 0xfffffff0, 7),
    (3, 12, 0xffffff80, 13),
];

/// Four word generator state (s1, s2, s3, s4).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct State(pub [u32; 4]);

impl State {
    /// Clear the low bits each word loses to its `c` mask before the first output.
    /// States with equal canonical form produce identical output streams.
    pub fn canonical(&self) -> State {
        let mut words = self.0;
        for (word, &(_, _, c, _)) in words.iter_mut().zip(PARAMS.iter()) {
            *word &= c;
        }
        State(words)
    }

    /// Indices of words that are stuck at zero forever.
    pub fn degenerate_words(&self) -> Vec<usize> {
        self.canonical()
            .0
            .iter()
            .enumerate()
            .filter(|(_, w)| **w == 0)
            .map(|(i, _)| i)
            .collect()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [s1, s2, s3, s4] = self.0;
        write!(f, "{:#010x} {:#010x} {:#010x} {:#010x}", s1, s2, s3, s4)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStateError(String);

impl fmt::Display for ParseStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid state: {}", self.0)
    }
}

impl std::error::Error for ParseStateError {}

impl FromStr for State {
    type Err = ParseStateError;

    /// Four hex words separated by whitespace or commas, `0x` prefix optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() != 4 {
            return Err(ParseStateError(format!(
                "expected 4 words, found {}",
                parts.len()
            )));
        }
        let mut words = [0u32; 4];
        for (word, part) in words.iter_mut().zip(parts) {
            let digits = part
                .strip_prefix("0x")
                .or_else(|| part.strip_prefix("0X"))
                .unwrap_or(part);
            *word = u32::from_str_radix(digits, 16)
                .map_err(|e| ParseStateError(format!("{:?}: {}", part, e)))?;
        }
        Ok(State(words))
    }
}

fn tausworthe(s: u32, (a, b, c, d): (u32, u32, u32, u32)) -> u32 {
    ((s & c) << d) ^ (((s << a) ^ s) >> b)
}

/// Restartable LFSR113 stream. Re-seed by constructing a new instance.
#[derive(Debug, Copy, Clone)]
pub struct Lfsr113 {
    state: [u32; 4],
}

impl Lfsr113 {
    pub fn from_state(state: State) -> Self {
        Lfsr113 { state: state.0 }
    }

    /// Current words, after the last generated output.
    pub fn state(&self) -> State {
        State(self.state)
    }

    /// Advance all four words one step and return their XOR.
    pub fn step(&mut self) -> u32 {
        for (word, &params) in self.state.iter_mut().zip(PARAMS.iter()) {
            *word = tausworthe(*word, params);
        }
        self.state[0] ^ self.state[1] ^ self.state[2] ^ self.state[3]
    }

    /// Raw output observed for the next logical port sample.
    pub fn next_sample(&mut self) -> u32 {
        self.advance(STEPS_PER_SAMPLE - 1);
        self.step()
    }

    /// Advance the generator state by the specified amount of steps.
    pub fn advance(&mut self, delta: usize) {
        for _ in 0..delta {
            let _ = self.step();
        }
    }

    /// Skip `count` logical samples.
    pub fn skip_samples(&mut self, count: usize) {
        self.advance(count * STEPS_PER_SAMPLE);
    }
}

impl RngCore for Lfsr113 {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        fill_bytes_via_next(self, dst)
    }
}

impl SeedableRng for Lfsr113 {
    /// Four big endian words.
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(seed.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Lfsr113::from_state(State(words))
    }
}
