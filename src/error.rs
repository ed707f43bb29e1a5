// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Error types returned by the recovery core and the configuration loader.

use thiserror::Error;

/// Result type alias for recovery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a recovery attempt can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Range bounds are reversed, equal, or outside the port domain.
    #[error("invalid port range [{low}, {high}]: need low < high <= 65535")]
    InvalidRange { low: u32, high: u32 },

    /// A sample does not lie within the range.
    #[error("sample {index} ({sample}) is not within port range [{low}, {high}]")]
    SampleOutOfRange {
        index: usize,
        sample: u32,
        low: u32,
        high: u32,
    },

    /// The samples carry too few significant bits to pin down the state.
    #[error("samples contain {bits} bits of information, but {required} are required; supply additional ports")]
    InsufficientInformation { bits: usize, required: usize },

    /// Row reduction left a rank other than the one LFSR113 yields.
    #[error("generator matrix rank is {rank}, expected {expected}")]
    RankMismatch { rank: usize, expected: usize },

    /// The reduced system has no solution.
    #[error("samples are not consistent with a single LFSR113 stream in this range")]
    InconsistentSamples,

    /// The solution vector could not be unpacked into four state words.
    #[error("malformed solution of {bits} bits, expected 128")]
    MalformedSolution { bits: usize },
}

/// Failures while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] Error),
}
