//! Deterministic seeding and simulation RNG for DOCSim.
//!
//! Every stochastic decision in the simulation draws from a [`SimRng`]
//! seeded by a stable 64-bit key derived from labeled parts (the global
//! seed plus context like `"FIELD"`, the round number, the slot). A whole
//! career therefore replays identically from a single seed, and unrelated
//! subsystems never share an RNG stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use std::fmt::Display;

/// Builds a stable 64-bit stream key from labeled, displayable parts.
///
/// Each part is stringified and fed to SHA-256 with a 0x1F separator, so
/// `("AB", "C")` and `("A", "BC")` produce different keys. The first eight
/// digest bytes (big-endian) become the key.
#[derive(Clone)]
pub struct KeyHasher {
    hasher: Sha256,
}

impl KeyHasher {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Mix one part into the key.
    pub fn mix(mut self, part: impl Display) -> Self {
        self.hasher.update(part.to_string().as_bytes());
        self.hasher.update([0x1f]);
        self
    }

    /// Finish and return the 64-bit key.
    pub fn finish(self) -> u64 {
        let digest = self.hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(bytes)
    }
}

impl Default for KeyHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a stream key from a list of displayable parts.
///
/// `sim_key!(seed, "FIELD", round, slot)` is shorthand for chaining
/// [`KeyHasher::mix`] over each part.
#[macro_export]
macro_rules! sim_key {
    ($($part:expr),+ $(,)?) => {{
        let hasher = $crate::KeyHasher::new();
        $(let hasher = hasher.mix(&$part);)+
        hasher.finish()
    }};
}

/// Simulation random number generator.
///
/// Wraps `ChaCha8Rng` for reproducible draws. The drawing surface mirrors
/// what the simulation actually needs: uniform floats, inclusive integer
/// ranges, choice/shuffle/sample over slices, gaussians, and the
/// triangular-ish noise used by breeding.
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SimRng {
    /// Create a new RNG from a stream key.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The key this stream was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Uniform integer in `lo..=hi`. Returns `lo` when the range is empty.
    pub fn randint(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.random() < p
    }

    /// Uniform index in `0..len`. Returns 0 when `len` is 0.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }

    /// Choose a random element from a slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let i = self.index(items.len());
            items.get(i)
        }
    }

    /// Shuffle a slice in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }

    /// Sample `k` distinct elements (by index) from a slice.
    ///
    /// Clamped to the slice length; the relative order of the sample is
    /// random, not positional.
    pub fn sample<T: Clone>(&mut self, items: &[T], k: usize) -> Vec<T> {
        let mut indices: Vec<usize> = (0..items.len()).collect();
        self.shuffle(&mut indices);
        indices
            .into_iter()
            .take(k.min(items.len()))
            .map(|i| items[i].clone())
            .collect()
    }

    /// Gaussian draw via Box-Muller.
    pub fn gauss(&mut self, mu: f64, sigma: f64) -> f64 {
        let u1 = self.random().max(1e-12);
        let u2 = self.random();
        let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mu + sigma * z0
    }

    /// Triangular-ish noise centered on 0 in `[-1.5, 1.5]`.
    pub fn tri_centered(&mut self) -> f64 {
        self.random() + self.random() + self.random() - 1.5
    }
}
