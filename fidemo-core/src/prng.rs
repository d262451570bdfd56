//! Deterministic pseudo-random number generator
//!
//! [`SeededRng`] is seeded from a string and produces the same sequence of
//! draws for the same seed on every platform. All state updates use wrapping
//! 32-bit integer arithmetic, never floating point.
//!
//! Independent streams are derived from a parent seed by string suffix, e.g.
//! `"<seed>:session:<index>"` or `"<seed>:detail:<session_id>"`, so any single
//! stream can be replayed without replaying the others.

use crate::error::{Error, Result};

/// Additive constant of the mulberry32 step.
const STEP: u32 = 0x6D2B_79F5;

/// 2^32, used to normalize a `u32` draw into `[0, 1)`.
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Rolling string hash: `hash = (hash << 5) - hash + unit` over UTF-16 code
/// units, folded to 32 bits and read back as unsigned.
///
/// Used both to derive the PRNG state and as the manifest digest.
pub fn rolling_hash(input: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    hash as u32
}

/// Seedable mulberry32 generator.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: String,
    state: u32,
}

impl SeededRng {
    /// Create a generator whose state is the rolling hash of `seed`.
    pub fn new(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        let state = rolling_hash(&seed);
        Self { seed, state }
    }

    /// Derive an independent child generator seeded `"<seed>:<scope>"`.
    pub fn child(&self, scope: &str) -> Self {
        Self::new(format!("{}:{}", self.seed, scope))
    }

    /// Next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(STEP);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        f64::from(t ^ (t >> 14)) / TWO_POW_32
    }

    /// Uniform integer in `[min, max]`, both ends inclusive. Reversed
    /// bounds are swapped.
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        // Widened so the span of the full i64 range cannot overflow.
        let span = (i128::from(hi) - i128::from(lo) + 1) as f64;
        let offset = (self.next_f64() * span).floor() as i128;
        (i128::from(lo) + offset).min(i128::from(hi)) as i64
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniformly pick one element of `items`.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T> {
        if items.is_empty() {
            return Err(Error::EmptyChoice("pick"));
        }
        let idx = self.int(0, items.len() as i64 - 1) as usize;
        Ok(&items[idx])
    }

    /// Fisher-Yates shuffle into a new vector; `items` is left untouched.
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        for i in (1..out.len()).rev() {
            let j = self.int(0, i as i64) as usize;
            out.swap(i, j);
        }
        out
    }

    /// `len` lowercase hex digits, one draw per nibble.
    pub fn hex(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| {
                let nibble = self.int(0, 15) as u32;
                char::from_digit(nibble, 16).unwrap_or('0')
            })
            .collect()
    }

    /// UUID-shaped token (`8-4-4-4-12` hex groups).
    ///
    /// Not an RFC 4122 UUID: no version or variant bits are set.
    pub fn uuid(&mut self, prefix: &str) -> String {
        let body = [8, 4, 4, 4, 12]
            .iter()
            .map(|&len| self.hex(len))
            .collect::<Vec<_>>()
            .join("-");
        if prefix.is_empty() {
            body
        } else {
            format!("{}-{}", prefix, body)
        }
    }

    /// Restore the initial state so the sequence replays from the start.
    pub fn reset(&mut self) {
        self.state = rolling_hash(&self.seed);
    }

    /// The original seed string.
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draws(rng: &mut SeededRng, n: usize) -> Vec<f64> {
        (0..n).map(|_| rng.next_f64()).collect()
    }

    #[test]
    fn test_rolling_hash_known_values() {
        assert_eq!(rolling_hash(""), 0);
        assert_eq!(rolling_hash("a"), 97);
        // 97 * 31 + 98
        assert_eq!(rolling_hash("ab"), 3105);
    }

    #[test]
    fn test_rolling_hash_wraps_to_unsigned() {
        // Long inputs overflow i32 many times over; result must still be stable.
        let long = "fi-2025:detail:session-".repeat(40);
        assert_eq!(rolling_hash(&long), rolling_hash(&long));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRng::new("fi-2025");
        let mut b = SeededRng::new("fi-2025");
        assert_eq!(draws(&mut a, 100), draws(&mut b, 100));
    }

    #[test]
    fn test_distinct_seeds_diverge() {
        let mut a = SeededRng::new("fi-2025");
        let mut b = SeededRng::new("fi-2026");
        assert_ne!(draws(&mut a, 16), draws(&mut b, 16));
    }

    #[test]
    fn test_reset_replays() {
        let mut rng = SeededRng::new("replay");
        let first = draws(&mut rng, 32);
        rng.reset();
        assert_eq!(draws(&mut rng, 32), first);
        assert_eq!(rng.seed(), "replay");
    }

    #[test]
    fn test_next_in_unit_interval() {
        let mut rng = SeededRng::new("unit");
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_int_inclusive_bounds() {
        let mut rng = SeededRng::new("bounds");
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2_000 {
            let v = rng.int(1, 7);
            assert!((1..=7).contains(&v));
            seen_min |= v == 1;
            seen_max |= v == 7;
        }
        assert!(seen_min && seen_max);
        assert_eq!(rng.int(80, 80), 80);
    }

    #[test]
    fn test_int_extreme_and_reversed_bounds() {
        let mut rng = SeededRng::new("extremes");
        for _ in 0..100 {
            let _ = rng.int(i64::MIN, i64::MAX);
            let wide = rng.int(0, i64::MAX);
            assert!(wide >= 0);
            let reversed = rng.int(7, 1);
            assert!((1..=7).contains(&reversed));
        }
    }

    #[test]
    fn test_pick_empty_is_error() {
        let mut rng = SeededRng::new("empty");
        let empty: [&str; 0] = [];
        let err = rng.pick(&empty).unwrap_err();
        assert!(matches!(err, Error::EmptyChoice(_)));
        assert_eq!(err.to_string(), "cannot pick from an empty pool");
        assert_eq!(*rng.pick(&["only"]).unwrap(), "only");
    }

    #[test]
    fn test_shuffle_is_permutation_and_leaves_input() {
        let mut rng = SeededRng::new("shuffle");
        let input: Vec<u32> = (0..50).collect();
        let shuffled = rng.shuffle(&input);

        assert_eq!(input, (0..50).collect::<Vec<_>>());
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, input);
        assert_ne!(shuffled, input);
    }

    #[test]
    fn test_uuid_shape() {
        let mut rng = SeededRng::new("uuid");
        let id = rng.uuid("session");
        let body = id.strip_prefix("session-").unwrap();
        let groups: Vec<_> = body.split('-').map(str::len).collect();
        assert_eq!(groups, vec![8, 4, 4, 4, 12]);
        assert!(body.chars().all(|c| c == '-' || c.is_ascii_hexdigit()));

        let bare = rng.uuid("");
        assert_eq!(bare.len(), 36);
    }

    #[test]
    fn test_child_streams_are_independent() {
        let parent = SeededRng::new("fi-2025");
        let mut c0 = parent.child("session:0");
        let mut c0_again = SeededRng::new("fi-2025:session:0");
        assert_eq!(c0.uuid("s"), c0_again.uuid("s"));
    }
}
