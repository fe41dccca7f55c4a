//! Stochastic motion model: the speed chain, the interval sampler and the
//! heading the dot travels along.

pub mod gauss;
pub mod markov;

use rand::Rng;

/// Direction of travel on each axis, always `+1` or `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading {
    pub pan: i8,
    pub tilt: i8,
}

impl Default for Heading {
    fn default() -> Self {
        Self { pan: 1, tilt: 1 }
    }
}

impl Heading {
    /// With `percent` % probability, reverse one randomly chosen axis.
    /// Returns whether the heading changed.
    pub fn maybe_turn<R: Rng + ?Sized>(&mut self, rng: &mut R, percent: u8) -> bool {
        if rng.gen_range(0..100u8) >= percent {
            return false;
        }
        if rng.gen_bool(0.5) {
            self.pan = -self.pan;
        } else {
            self.tilt = -self.tilt;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn zero_percent_never_turns() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut h = Heading::default();
        for _ in 0..1000 {
            assert!(!h.maybe_turn(&mut rng, 0));
        }
        assert_eq!(h, Heading::default());
    }

    #[test]
    fn hundred_percent_always_flips_one_axis() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut h = Heading::default();
        for _ in 0..100 {
            let before = h;
            assert!(h.maybe_turn(&mut rng, 100));
            let flipped = u8::from(before.pan != h.pan) + u8::from(before.tilt != h.tilt);
            assert_eq!(flipped, 1);
            assert!(h.pan.abs() == 1 && h.tilt.abs() == 1);
        }
    }
}
