//! Header-fixed random permutations.
//!
//! Index 0 always stays in front; indices `1..n` are shuffled with
//! Fisher–Yates (`SliceRandom::shuffle`), so every one of the `(n-1)!` tail
//! orderings is equally likely.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Build `[0, p(1), ..., p(n-1)]` where `p` is a uniform permutation of `1..n`.
///
/// Returns an empty vector for `n == 0` and `[0]` for `n == 1`.
pub fn header_fixed_permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    if n > 2 {
        order[1..].shuffle(rng);
    }
    order
}

/// A row order with the header pinned at position zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    order: Vec<usize>,
}

impl Permutation {
    /// Generate a permutation for `n` rows.
    ///
    /// With `Some(seed)` the result is reproducible; with `None` the RNG is
    /// seeded from OS entropy.
    #[must_use]
    pub fn generate(n: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::generate_with(n, &mut rng)
    }

    /// Generate a permutation for `n` rows from a caller-supplied RNG.
    pub fn generate_with<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        Self {
            order: header_fixed_permutation(n, rng),
        }
    }

    /// The identity order `0..n`.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self {
            order: (0..n).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<usize> {
        self.order
    }
}

impl<'a> IntoIterator for &'a Permutation {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_inputs_need_no_shuffle() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(header_fixed_permutation(0, &mut rng).is_empty());
        assert_eq!(header_fixed_permutation(1, &mut rng), vec![0]);
        assert_eq!(header_fixed_permutation(2, &mut rng), vec![0, 1]);
    }

    #[test]
    fn header_stays_first_and_tail_is_complete() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 3..40 {
            let p = header_fixed_permutation(n, &mut rng);
            assert_eq!(p.len(), n);
            assert_eq!(p[0], 0);
            let mut sorted = p.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn seed_is_reproducible() {
        let a = Permutation::generate(100, Some(7));
        let b = Permutation::generate(100, Some(7));
        let c = Permutation::generate(100, Some(8));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
