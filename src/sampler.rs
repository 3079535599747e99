//! Draws single values from an assumption's distribution.
//!
//! All three kinds interpret `(min, max)` so that every draw lands inside
//! the closed interval: uniform by construction, normal by bounded
//! rejection resampling, lognormal by a single clamp after exponentiation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::graph::Distribution;

/// Floor applied to lognormal bounds before taking logs, guarding against
/// non-positive input.
const LOG_EPSILON: f64 = 1e-4;

/// Cap on normal rejection resampling before falling back to a clamp.
const MAX_REJECTION_ATTEMPTS: u32 = 100;

/// An uncertain scalar with bounds and a distribution, as used by the
/// legacy flat simulation path. Graph-based models carry the same
/// attributes on [`Node::Assumption`](crate::graph::Node::Assumption).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    pub name: String,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub distribution: Distribution,
}

impl Assumption {
    pub fn new(name: &str, min: f64, max: f64, distribution: Distribution) -> Self {
        Self { name: name.to_string(), min, max, distribution }
    }
}

/// Draws one value from `distribution` over the window `[min, max]`.
pub fn sample<R: Rng + ?Sized>(distribution: Distribution, min: f64, max: f64, rng: &mut R) -> f64 {
    match distribution {
        Distribution::Uniform => min + rng.gen::<f64>() * (max - min),
        Distribution::Normal => sample_normal(min, max, rng),
        Distribution::LogNormal => sample_log_normal(min, max, rng),
    }
}

/// Single draw from an assumption using thread-local randomness.
pub fn sample_assumption(assumption: &Assumption) -> f64 {
    sample_assumption_with(assumption, &mut rand::thread_rng())
}

/// Single draw from an assumption using the given generator. Seed the
/// generator for reproducible sequences.
pub fn sample_assumption_with<R: Rng + ?Sized>(assumption: &Assumption, rng: &mut R) -> f64 {
    sample(assumption.distribution, assumption.min, assumption.max, rng)
}

/// One standard-normal deviate via the Box-Muller transform.
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - u lies in (0, 1], keeping the log argument nonzero.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Truncated normal over `[min, max]`: mean at the window center, standard
/// deviation a quarter of the width, so the window covers roughly 95% of
/// the mass. Out-of-window draws are resampled up to
/// `MAX_REJECTION_ATTEMPTS` times, then clamped as a last resort.
fn sample_normal<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    let mean = (min + max) / 2.0;
    let std_dev = (max - min) / 4.0;

    let mut value = mean;
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        value = mean + std_dev * standard_normal(rng);
        if value >= min && value <= max {
            return value;
        }
    }
    clip(value, min, max)
}

/// Lognormal draw: a normal deviate in log-space over `[ln min, ln max]`
/// (bounds floored at `LOG_EPSILON`), exponentiated and clamped. No
/// rejection loop is needed since exp is monotonic.
fn sample_log_normal<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    let log_min = min.max(LOG_EPSILON).ln();
    let log_max = max.max(LOG_EPSILON).ln();
    let mean = (log_min + log_max) / 2.0;
    let std_dev = (log_max - log_min) / 4.0;

    let value = (mean + std_dev * standard_normal(rng)).exp();
    clip(value, min, max)
}

// Not `f64::clamp`: min > max is tolerated (the model is not validated
// against it) and must not panic.
fn clip(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    const DRAWS: usize = 10_000;

    #[rstest]
    #[case(Distribution::Uniform)]
    #[case(Distribution::Normal)]
    #[case(Distribution::LogNormal)]
    fn test_draws_stay_inside_bounds(#[case] distribution: Distribution) {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..DRAWS {
            let v = sample(distribution, 10.0, 50.0, &mut rng);
            assert!((10.0..=50.0).contains(&v), "{distribution:?} drew {v}");
        }
    }

    #[test]
    fn test_degenerate_window_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(sample(Distribution::Uniform, 10.0, 10.0, &mut rng), 10.0);
        }
    }

    #[test]
    fn test_lognormal_stays_positive_near_zero_min() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..DRAWS {
            let v = sample(Distribution::LogNormal, 1e-9, 5.0, &mut rng);
            assert!(v > 0.0, "lognormal drew non-positive {v}");
            assert!(v <= 5.0);
        }
    }

    #[test]
    fn test_uniform_mean_is_near_window_center() {
        let mut rng = StdRng::seed_from_u64(13);
        let total: f64 = (0..DRAWS)
            .map(|_| sample(Distribution::Uniform, 0.0, 1.0, &mut rng))
            .sum();
        let mean = total / DRAWS as f64;
        assert!((mean - 0.5).abs() < 0.02, "uniform mean drifted to {mean}");
    }

    #[test]
    fn test_sample_assumption_respects_attributes() {
        let a = Assumption::new("x", 3.0, 4.0, Distribution::Normal);
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..1_000 {
            let v = sample_assumption_with(&a, &mut rng);
            assert!((3.0..=4.0).contains(&v));
        }
    }
}
