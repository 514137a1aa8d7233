//! Uniform Fisher-Yates shuffling.
//!
//! Every component that needs unbiased randomness (exam assembly, choice
//! re-ordering) goes through this module. Exam ordering is a security
//! property, not just statistical fairness, so the unseeded entry point
//! draws from the operating system's entropy source.

use rand::Rng;

/// Shuffles a slice in place using the Fisher-Yates algorithm.
///
/// Produces a uniformly random permutation in O(n) time and O(1) extra
/// space. Accepts any [`Rng`] so callers can pass a seeded generator for
/// deterministic tests.
///
/// # Examples
///
/// ```
/// use evaluar::shuffle::fisher_yates;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut items = vec![1, 2, 3, 4, 5];
/// let mut rng = StdRng::seed_from_u64(42);
/// fisher_yates(&mut items, &mut rng);
/// assert_eq!(items.len(), 5);
/// ```
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    let n = items.len();
    // Iterate from last to first, swapping with a uniform pick in [0, i].
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Shuffles a slice in place using OS entropy.
///
/// Convenience wrapper over [`fisher_yates`] with a cryptographically
/// strong random source, so exam orderings are not predictable.
pub fn shuffle<T>(items: &mut [T]) {
    fisher_yates(items, &mut rand::rngs::OsRng);
}
