//! Seedable random streams.
//!
//! Randomness is always passed explicitly. Work that runs
//! in parallel receives its own generator, forked from the
//! caller's generator before the parallel section starts,
//! so results do not depend on thread scheduling.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The generator driving an evolutionary run.
pub type EvoRng = ChaCha8Rng;

/// Returns a generator seeded with `seed`.
pub fn seeded(seed: u64) -> EvoRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Draws `count` independent generators from `rng`.
pub fn fork<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<EvoRng> {
    (0..count).map(|_| seeded(rng.gen())).collect()
}

/// Returns `true` with probability `p`.
/// Never succeeds for `p <= 0` and always succeeds for `p >= 1`.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f32) -> bool {
    rng.gen::<f32>() < p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forks_are_reproducible() {
        let a: Vec<u64> = fork(&mut seeded(1), 4).iter_mut().map(|r| r.gen()).collect();
        let b: Vec<u64> = fork(&mut seeded(1), 4).iter_mut().map(|r| r.gen()).collect();
        assert_eq!(a, b);
        assert_ne!(a[0], a[1]);
    }

    #[test]
    fn chance_bounds() {
        let mut rng = seeded(0);
        assert!((0..1000).all(|_| !chance(&mut rng, 0.0)));
        assert!((0..1000).all(|_| chance(&mut rng, 1.0)));
    }
}
