// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! State recovery for the LFSR113 generator from range-narrowed outputs,
//! such as ephemeral source ports, and prediction of its future outputs.

pub mod conditioning;
pub mod config;
pub mod error;
pub mod gf2;
pub mod linear_model;
pub mod rngs;
pub mod solver;
pub mod stats;
pub mod strings;
pub mod testdata;
pub mod trials;
pub mod utils;

pub use conditioning::PortRange;
pub use error::{Error, Result};
pub use rngs::{Lfsr113, State, STEPS_PER_SAMPLE};
pub use solver::{predict_next, recover_state};
