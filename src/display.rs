//! Decorative "quantum state" numbers for the front end.
//!
//! These values are random. Nothing in `analysis` or `enrichment` reads
//! them, and they never influence which place is chosen or its probability.

use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayState {
    /// Percent, 70..=95.
    pub coherence: u8,
    /// Percent, 40..=85.
    pub entanglement: u8,
    /// Number of "superposed" states shown, 3..=8.
    pub superposition: u8,
}

impl DisplayState {
    pub fn random() -> Self {
        Self::sample(&mut rand::rng())
    }

    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            coherence: rng.random_range(70..=95),
            entanglement: rng.random_range(40..=85),
            superposition: rng.random_range(3..=8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn values_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let state = DisplayState::sample(&mut rng);
            assert!((70..=95).contains(&state.coherence));
            assert!((40..=85).contains(&state.entanglement));
            assert!((3..=8).contains(&state.superposition));
        }
    }
}
