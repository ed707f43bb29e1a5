// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! End-to-end recovery trials against simulated hosts.

use std::time::{Duration, Instant};

use log::debug;
use rand::SeedableRng;

use crate::conditioning::PortRange;
use crate::error::Error;
use crate::rngs::{Lfsr113, State};
use crate::solver::{predict_next, recover_state, replay};
use crate::utils::{self, write_and_print};
use crate::{stats, strings};

const UNIFORMITY_SAMPLE_SIZE: usize = 1 << 16;
const UNIFORMITY_BINS: usize = 64;

/// Outcome of recovering one seed from its own ports.
#[derive(Debug, Clone)]
pub struct TrialResult {
    pub seed: State,
    /// Fewest leading samples that solved, None if `max_samples` never did.
    pub samples_needed: Option<usize>,
    pub recovered: Option<State>,
    pub predictions_matched: bool,
    pub time_used: Duration,
}

impl TrialResult {
    pub fn passed(&self) -> bool {
        self.recovered == Some(self.seed.canonical()) && self.predictions_matched
    }

    pub fn format(&self) -> String {
        format!(
            "{}  samples: {:>2}  time: {:>10}   - {}",
            self.seed,
            self.samples_needed
                .map_or_else(|| "--".to_owned(), |n| n.to_string()),
            utils::format_elapsed_time(self.time_used),
            if self.passed() {
                strings::PASS_STR
            } else {
                strings::FAIL_STR
            }
        )
    }
}

/// Feed a growing prefix of the seeds ports to the solver until it succeeds,
/// then check the next `predictions` ports against the real stream.
pub fn run_single_trial(
    seed: State,
    range: &PortRange,
    max_samples: usize,
    predictions: usize,
) -> TrialResult {
    let start = Instant::now();
    let ports = replay(&seed, range, max_samples + predictions);
    let mut result = TrialResult {
        seed,
        samples_needed: None,
        recovered: None,
        predictions_matched: false,
        time_used: Duration::ZERO,
    };
    for n in 1..=max_samples {
        match recover_state(&ports[..n], range) {
            Ok(state) => {
                result.samples_needed = Some(n);
                result.recovered = Some(state);
                result.predictions_matched =
                    predict_next(&state, n, range, predictions) == ports[n..n + predictions];
                break;
            }
            Err(Error::InsufficientInformation { .. }) => continue,
            Err(e) => debug!("seed {} with {} samples: {}", seed, n, e),
        }
    }
    result.time_used = start.elapsed();
    result
}

/// Format a vec of `TrialResult` and print a summary of the results.
fn format_trial_summary(results: &[TrialResult]) -> String {
    let passed = results.iter().filter(|r| r.passed()).count();
    let counts: Vec<usize> = results.iter().filter_map(|r| r.samples_needed).collect();
    let distribution = stats::summarize_sample_counts(&counts)
        .map_or_else(|| "No recoveries.".to_owned(), |s| s.format());
    format!(
        "{}\nOverall result: {}          ( {} / {} passed)",
        distribution,
        if passed == results.len() {
            strings::PASS_STR
        } else {
            strings::FAIL_STR
        },
        passed,
        results.len()
    )
}

/// Run trials for every seed in `seeds` (expanded with `Lfsr113::seed_from_u64`)
/// and write a report to `result_file_path`.
pub fn trial_suite(
    seeds: &[u64],
    range: &PortRange,
    max_samples: usize,
    predictions: usize,
    result_file_path: &str,
) -> std::io::Result<Vec<TrialResult>> {
    let full_start = Instant::now();
    write_and_print(
        format!(
            "\nTrials for port range [{}, {}]  ({})",
            range.low(),
            range.high(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
        result_file_path,
    )?;

    if let Some(&first) = seeds.first() {
        let mut rng = Lfsr113::seed_from_u64(first);
        let bins = UNIFORMITY_BINS.min(range.size() as usize);
        let line = match stats::port_distribution_test(
            &mut rng,
            range,
            UNIFORMITY_SAMPLE_SIZE,
            bins,
        ) {
            Some((chi_squared, p)) => format!(
                "Port uniformity: chi2 {:.2} over {} bins, p: {:.6}",
                chi_squared, bins, p
            ),
            None => "Port uniformity: skipped, range too small".to_owned(),
        };
        write_and_print(line, result_file_path)?;
    }

    let mut results = Vec::with_capacity(seeds.len());
    for &seed in seeds {
        let state = Lfsr113::seed_from_u64(seed).state();
        let result = run_single_trial(state, range, max_samples, predictions);
        write_and_print(result.format(), result_file_path)?;
        results.push(result);
    }
    write_and_print(format_trial_summary(&results), result_file_path)?;
    write_and_print(
        format!(
            "Total runtime: {}",
            utils::format_elapsed_time(full_start.elapsed())
        ),
        result_file_path,
    )?;
    Ok(results)
}
