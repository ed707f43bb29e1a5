// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Statistics over recovery trials and the generators deflated output.

use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::statistics::Statistics;

use crate::conditioning::{deflate, PortRange};
use crate::rngs::Lfsr113;

/// Distribution of the number of samples recoveries needed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SampleCountSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SampleCountSummary {
    pub fn format(&self) -> String {
        format!(
            "Samples needed over {} recoveries: mean {:.2}  sd {:.2}  min {}  max {}",
            self.count, self.mean, self.std_dev, self.min, self.max
        )
    }
}

/// Summarize sample counts, None if there are none.
pub fn summarize_sample_counts(counts: &[usize]) -> Option<SampleCountSummary> {
    if counts.is_empty() {
        return None;
    }
    let data: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    Some(SampleCountSummary {
        count: data.len(),
        mean: data.iter().mean(),
        std_dev: if data.len() > 1 {
            data.iter().std_dev()
        } else {
            0.0
        },
        min: Statistics::min(data.iter()),
        max: Statistics::max(data.iter()),
    })
}

/// Get p value for given degrees of freedom and chi squared value.
fn chi_squared_p_value(df: u32, chi_squared: f64) -> f64 {
    match ChiSquared::new(df as f64) {
        Ok(dist) => dist.cdf(chi_squared),
        Err(_) => f64::NAN,
    }
}

/// Draw `sample_size` port samples and measure how evenly they fall into `bins`
/// equal slices of the range.
/// Returns chi2 statistic, p value. None unless `2 <= bins <= range.size()`.
pub fn port_distribution_test(
    test_rng: &mut Lfsr113,
    range: &PortRange,
    sample_size: usize,
    bins: usize,
) -> Option<(f64, f64)> {
    if bins < 2 || bins as u64 > range.size() {
        return None;
    }
    let mut counts = vec![0usize; bins];
    for _ in 0..sample_size {
        let port = deflate(test_rng.next_sample(), range);
        let bin = ((port - range.low()) as u64 * bins as u64 / range.size()) as usize;
        counts[bin] += 1;
    }
    let mut chi_squared: f64 = 0.0;
    for (bin, &value) in counts.iter().enumerate() {
        // Bins are not all the same width when bins does not divide the range.
        let start = (bin as u64 * range.size()).div_ceil(bins as u64);
        let end = ((bin as u64 + 1) * range.size()).div_ceil(bins as u64);
        let expected = sample_size as f64 * (end - start) as f64 / range.size() as f64;
        chi_squared += (value as f64 - expected).powi(2) / expected;
    }
    let p = 1.0 - chi_squared_p_value(bins as u32 - 1, chi_squared);
    Some((chi_squared, p))
}
