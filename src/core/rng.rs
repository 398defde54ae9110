//! Deterministic random number generation for matches and policies.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical shuffles and steals
//! - **Forkable**: Hand an independent stream to an automated opponent
//! - **Context streams**: Separate sequences for separate purposes
//!
//! The engine never touches an ambient generator. The opening shuffle uses
//! the `"shuffle"` context of the match seed; deal retries and steal targets
//! draw from the `GameRng` stored in the match state.
//!
//! ```
//! use dogs_cats_chickens::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let mut policy_rng = rng.fork();
//!
//! // Forks are deterministic: same parent seed, same fork sequence.
//! let mut rng2 = GameRng::new(42);
//! let mut policy_rng2 = rng2.fork();
//! assert_eq!(policy_rng.index(100), policy_rng2.index(100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hash::{Hash, Hasher};

/// Seedable, forkable RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Fork this RNG to create an independent, deterministic branch.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self
            .seed
            .wrapping_add(self.fork_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self {
            inner: ChaCha8Rng::seed_from_u64(fork_seed),
            seed: fork_seed,
            fork_counter: 0,
        }
    }

    /// Create an independent stream for a named context.
    ///
    /// The same context always produces the same stream from the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        let context_seed = hasher.finish();

        Self {
            inner: ChaCha8Rng::seed_from_u64(context_seed),
            seed: context_seed,
            fork_counter: 0,
        }
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    /// Choose a uniformly random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Seed this generator was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.index(1000), rng2.index(1000));
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        let seq1: Vec<_> = (0..10).map(|_| rng1.index(1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.index(1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_fork_is_deterministic_and_distinct() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        let mut forked1 = rng1.fork();
        let forked2 = rng2.fork();
        assert_eq!(forked1.seed(), forked2.seed());

        let parent: Vec<_> = (0..10).map(|_| rng1.index(1000)).collect();
        let child: Vec<_> = (0..10).map(|_| forked1.index(1000)).collect();
        assert_ne!(parent, child);
    }

    #[test]
    fn test_context_streams() {
        let rng = GameRng::new(42);
        let mut shuffle = rng.for_context("shuffle");
        let mut steal = rng.for_context("steal");
        let mut shuffle_again = GameRng::new(42).for_context("shuffle");

        let a: Vec<_> = (0..10).map(|_| shuffle.index(1000)).collect();
        let b: Vec<_> = (0..10).map(|_| steal.index(1000)).collect();
        let c: Vec<_> = (0..10).map(|_| shuffle_again.index(1000)).collect();

        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_choose() {
        let mut rng = GameRng::new(42);
        let items = [1, 2, 3, 4, 5];

        let chosen = rng.choose(&items).copied();
        assert!(matches!(chosen, Some(v) if items.contains(&v)));

        let empty: [i32; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }

    #[test]
    fn test_choose_follows_seed() {
        let items: Vec<u32> = (0..50).collect();
        let mut rng1 = GameRng::new(9);
        let mut rng2 = GameRng::new(9);

        let picks1: Vec<_> = (0..20).map(|_| rng1.choose(&items).copied()).collect();
        let picks2: Vec<_> = (0..20).map(|_| rng2.choose(&items).copied()).collect();
        assert_eq!(picks1, picks2);
        assert!(picks1.iter().any(|p| *p != picks1[0]));
    }
}
