//! Aggregate statistics over a node's accumulated samples.

use serde::{Deserialize, Serialize};

/// The five percentiles every summary reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

/// Mean, standard deviation, and percentile summary of a sample set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f64,
    pub std_dev: f64,
    pub percentiles: Percentiles,
}

/// Summarizes a sample set.
///
/// An empty input yields the all-zero summary rather than an error; it is
/// the caller's contract to treat an empty sample list as "no usable
/// result". Variance is the population variance (divide by n), and
/// percentiles use the nearest-rank method: the value at index
/// `floor(p/100 * n)` of the ascending sort, clamped to `n - 1`. No
/// interpolation between ranks.
pub fn summarize(samples: &[f64]) -> Summary {
    if samples.is_empty() {
        return Summary::default();
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let mut sorted = samples.to_vec();
    // Inputs are filtered to finite values upstream; an equal-ordering
    // fallback keeps a stray NaN from panicking the sort.
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let percentiles = Percentiles {
        p5: nearest_rank(&sorted, 5.0),
        p25: nearest_rank(&sorted, 25.0),
        p50: nearest_rank(&sorted, 50.0),
        p75: nearest_rank(&sorted, 75.0),
        p95: nearest_rank(&sorted, 95.0),
    };

    Summary { mean, std_dev, percentiles }
}

fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let index = ((p / 100.0) * sorted.len() as f64).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sample_set() {
        let samples: Vec<f64> = (1..=10).map(f64::from).collect();
        let summary = summarize(&samples);

        assert_eq!(summary.mean, 5.5);
        // Population standard deviation of 1..=10.
        assert!((summary.std_dev - 2.8722813232690143).abs() < 1e-12);
        // Nearest rank: index floor(0.5 * 10) = 5 -> value 6.
        assert_eq!(summary.percentiles.p50, 6.0);
        assert_eq!(summary.percentiles.p5, 1.0);
        assert_eq!(summary.percentiles.p95, 10.0);
    }

    #[test]
    fn test_empty_input_yields_zero_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.percentiles.p50, 0.0);
    }

    #[test]
    fn test_single_sample() {
        let summary = summarize(&[7.0]);
        assert_eq!(summary.mean, 7.0);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.percentiles.p5, 7.0);
        assert_eq!(summary.percentiles.p95, 7.0);
    }

    #[test]
    fn test_percentiles_respect_unsorted_input() {
        let summary = summarize(&[9.0, 1.0, 5.0, 3.0, 7.0]);
        // Sorted: [1,3,5,7,9]; index floor(0.5 * 5) = 2 -> 5.
        assert_eq!(summary.percentiles.p50, 5.0);
        // Index floor(0.95 * 5) = 4 -> 9, clamp not needed.
        assert_eq!(summary.percentiles.p95, 9.0);
    }
}
