//! Ammunition pool and deterministic target selection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The fixed pool of target URLs for a run.
#[derive(Debug, Clone)]
pub struct Ammunition {
    urls: Vec<String>,
}

impl Ammunition {
    /// Create a pool. The pool must be non-empty; config validation
    /// guarantees this before a run starts.
    pub fn new(urls: Vec<String>) -> Self {
        debug_assert!(!urls.is_empty());
        Self { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn get(&self, index: usize) -> &str {
        &self.urls[index]
    }
}

/// Deterministic index selector for the ammunition pool.
///
/// Each draw takes a value in `0..limit` from a seeded generator and
/// reduces it modulo the pool size, so the result is always in bounds
/// regardless of the draw's range. The same seed produces the same index
/// sequence on every run.
pub struct AmmoSelector {
    rng: StdRng,
    limit: u32,
    pool_len: usize,
}

impl AmmoSelector {
    pub fn new(seed: u64, limit: u32, pool_len: usize) -> Self {
        debug_assert!(limit > 0);
        debug_assert!(pool_len > 0);
        Self {
            rng: StdRng::seed_from_u64(seed),
            limit,
            pool_len,
        }
    }

    /// Draw the next ammunition index.
    pub fn next_index(&mut self) -> usize {
        self.rng.gen_range(0..self.limit) as usize % self.pool_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = AmmoSelector::new(123_456_789, 1000, 2);
        let mut b = AmmoSelector::new(123_456_789, 1000, 2);

        let seq_a: Vec<usize> = (0..100).map(|_| a.next_index()).collect();
        let seq_b: Vec<usize> = (0..100).map(|_| b.next_index()).collect();

        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_indices_always_in_bounds() {
        let mut selector = AmmoSelector::new(42, 1000, 2);
        for _ in 0..1000 {
            assert!(selector.next_index() < 2);
        }

        // A draw range smaller than the pool still stays in bounds
        let mut selector = AmmoSelector::new(42, 1, 5);
        for _ in 0..100 {
            assert_eq!(selector.next_index(), 0);
        }
    }

    #[test]
    fn test_pool_lookup() {
        let ammo = Ammunition::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(ammo.len(), 2);
        assert!(!ammo.is_empty());
        assert_eq!(ammo.get(0), "a");
        assert_eq!(ammo.get(1), "b");
    }
}
