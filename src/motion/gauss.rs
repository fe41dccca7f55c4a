//! Gaussian interval sampler.
//!
//! Re-randomises the behaviour timers: how long until the next pause, the
//! next rest, the end of an intermittent off-phase.  Each call is an
//! independent normal draw, floored so a timer can never come out as zero
//! or negative.

use log::trace;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Smallest value [`sample`] returns, in the caller's unit.
pub const SAMPLE_FLOOR: u32 = 2;

/// Draw from N(`mean`, `variance`), clamp to [`SAMPLE_FLOOR`] and round.
///
/// A negative or non-finite variance collapses to a point mass on `mean`.
pub fn sample<R: Rng + ?Sized>(rng: &mut R, mean: f64, variance: f64) -> u32 {
    let std_dev = if variance.is_finite() && variance > 0.0 {
        variance.sqrt()
    } else {
        0.0
    };

    let raw = match Normal::new(mean, std_dev) {
        Ok(normal) => normal.sample(rng),
        Err(_) => mean,
    };

    // NaN (from a NaN mean) fails the comparison and also floors.
    let floored = if raw >= f64::from(SAMPLE_FLOOR) {
        raw
    } else {
        f64::from(SAMPLE_FLOOR)
    };
    trace!("gauss: N({mean}, {variance}) -> {raw:.2}");

    // Saturating float-to-int cast.
    floored.round() as u32
}

/// [`sample`] in `unit_ms` units, returned as milliseconds.
pub fn sample_ms<R: Rng + ?Sized>(rng: &mut R, mean: f64, variance: f64, unit_ms: u32) -> u32 {
    sample(rng, mean, variance).saturating_mul(unit_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn never_below_floor() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..5_000 {
            assert!(sample(&mut rng, 1.0, 25.0) >= SAMPLE_FLOOR);
        }
    }

    #[test]
    fn mean_below_floor_is_floored() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(sample(&mut rng, -50.0, 0.0), SAMPLE_FLOOR);
        assert_eq!(sample(&mut rng, 0.0, 0.0), SAMPLE_FLOOR);
    }

    #[test]
    fn zero_variance_returns_mean() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(sample(&mut rng, 360.0, 0.0), 360);
    }

    #[test]
    fn bad_inputs_degrade() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(sample(&mut rng, 10.0, -4.0), 10);
        assert_eq!(sample(&mut rng, 10.0, f64::NAN), 10);
        assert_eq!(sample(&mut rng, f64::NAN, 1.0), SAMPLE_FLOOR);
    }

    #[test]
    fn sample_mean_tracks_distribution() {
        let mut rng = SmallRng::seed_from_u64(99);
        let n = 20_000;
        let total: u64 = (0..n).map(|_| u64::from(sample(&mut rng, 360.0, 60.0))).sum();
        let mean = total as f64 / f64::from(n);
        assert!((mean - 360.0).abs() < 1.0, "mean {mean}");
    }

    #[test]
    fn ms_scaling_saturates() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(sample_ms(&mut rng, 10.0, 0.0, 1000), 10_000);
        assert_eq!(sample_ms(&mut rng, 1.0e12, 0.0, 60_000), u32::MAX);
    }
}
