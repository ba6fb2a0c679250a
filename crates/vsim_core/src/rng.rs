//! Deterministic, seedable RNG for every random draw of a simulation.
//!
//! ChaCha20 keyed from a 64-bit seed: `seed.to_le_bytes()` fills the first
//! 8 bytes of the 32-byte key, the rest are zero. One seed therefore pins
//! generation, delegation and poll drift across platforms.
//!
//! Floats are built from the top 53 bits of one word.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

#[derive(Debug, Clone)]
pub struct SimRng {
    rng: ChaCha20Rng,
    words_consumed: u128,
}

impl SimRng {
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self { rng: ChaCha20Rng::from_seed(seed32), words_consumed: 0 }
    }

    /// Number of 64-bit words drawn so far (saturating).
    #[inline]
    pub fn words_consumed(&self) -> u128 {
        self.words_consumed
    }

    // Only place the counter advances.
    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.words_consumed = self.words_consumed.saturating_add(1);
        self.rng.next_u64()
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// `true` with probability `p`; `p <= 0` never, `p >= 1` always.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Normal sample (Box-Muller). A non-positive `std_dev` returns `mean`
    /// without consuming randomness.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev.is_nan() || std_dev <= 0.0 {
            return mean;
        }
        // 1 - u keeps the log argument in (0, 1].
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Index drawn with probability proportional to `weights[i]`.
    ///
    /// Negative and NaN weights count as zero. `None` when nothing has
    /// positive weight.
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let w = |v: f64| if v > 0.0 { v } else { 0.0 };
        let total: f64 = weights.iter().copied().map(w).sum();
        if total.is_nan() || total <= 0.0 {
            return None;
        }
        let target = self.next_f64() * total;
        let mut acc = 0.0;
        let mut last_positive = None;
        for (i, v) in weights.iter().copied().map(w).enumerate() {
            if v == 0.0 {
                continue;
            }
            acc += v;
            last_positive = Some(i);
            if target < acc {
                return Some(i);
            }
        }
        // Rounding can leave target a hair above the final sum.
        last_positive
    }
}
