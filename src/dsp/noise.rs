//! Leakage noise: white noise held for four samples, scaled by dirt and
//! the current drawbar level.

/// A fresh noise value is drawn once every this many samples.
pub const NOISE_DOWNSAMPLE: u8 = 4;

/// Fixed attenuation applied on top of `dirt * amp_sum`.
const NOISE_SCALE: f32 = 0.01;

/// Host dirt units (0..=100) to coefficient.
const DIRT_SCALE: f32 = 0.01;

/// Xorshift32 white noise in [-1, 1].
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    seed: u32,
}

impl WhiteNoise {
    pub fn new(seed: u32) -> Self {
        // Xorshift is stuck at zero.
        WhiteNoise {
            seed: if seed == 0 { 12345 } else { seed },
        }
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        self.seed ^= self.seed << 13;
        self.seed ^= self.seed >> 17;
        self.seed ^= self.seed << 5;
        (self.seed as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

impl Default for WhiteNoise {
    fn default() -> Self {
        WhiteNoise::new(12345)
    }
}

/// Downsampled noise generator with a lazily refreshed level.
#[derive(Debug, Clone)]
pub struct NoiseStage {
    rng: WhiteNoise,
    counter: u8,
    value: f32,
    dirt: f32,
    level: f32,
    dirty: bool,
}

impl NoiseStage {
    pub fn new(seed: u32) -> Self {
        NoiseStage {
            rng: WhiteNoise::new(seed),
            counter: 0,
            value: 0.0,
            dirt: 0.0,
            level: 0.0,
            dirty: true,
        }
    }

    /// Set dirt from host units (0..=100).
    pub fn set_dirt(&mut self, raw: u16) {
        self.dirt = DIRT_SCALE * raw as f32;
        self.dirty = true;
    }

    pub fn dirt(&self) -> f32 {
        self.dirt
    }

    /// Mark the level stale after a drawbar change.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Recompute the level if anything it depends on changed.
    pub fn refresh(&mut self, amp_sum: f32) {
        if self.dirty {
            self.level = self.dirt * amp_sum * NOISE_SCALE;
            self.dirty = false;
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Held noise for this sample; a new draw replaces it on every
    /// fourth call.
    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.counter == NOISE_DOWNSAMPLE - 1 {
            self.counter = 0;
            self.value = self.level * self.rng.next();
        } else {
            self.counter += 1;
        }
        self.value
    }

    /// Reseed, restart the cadence and drop the held value. Dirt survives
    /// and the level is marked stale.
    pub fn reset(&mut self, seed: u32) {
        self.rng = WhiteNoise::new(seed);
        self.counter = 0;
        self.value = 0.0;
        self.dirty = true;
    }
}

impl Default for NoiseStage {
    fn default() -> Self {
        NoiseStage::new(12345)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn white_noise_range() {
        let mut rng = WhiteNoise::default();
        for _ in 0..100_000 {
            let n = rng.next();
            assert!((-1.0..=1.0).contains(&n), "Noise out of range: {n}");
        }
    }

    #[test]
    fn zero_seed_is_replaced() {
        let mut rng = WhiteNoise::new(0);
        assert_ne!(rng.next(), rng.next());
    }

    #[test]
    fn level_is_dirt_times_sum() {
        let mut noise = NoiseStage::default();
        noise.set_dirt(100);
        noise.refresh(0.6);
        assert_abs_diff_eq!(noise.level(), 1.0 * 0.6 * 0.01, epsilon = 1e-7);

        noise.set_dirt(50);
        noise.refresh(0.6);
        assert_abs_diff_eq!(noise.level(), 0.5 * 0.6 * 0.01, epsilon = 1e-7);
    }

    #[test]
    fn level_only_recomputed_when_stale() {
        let mut noise = NoiseStage::default();
        noise.set_dirt(100);
        noise.refresh(1.0);
        noise.refresh(2.0);
        assert_abs_diff_eq!(noise.level(), 0.01, epsilon = 1e-7);

        noise.invalidate();
        noise.refresh(2.0);
        assert_abs_diff_eq!(noise.level(), 0.02, epsilon = 1e-7);
    }

    #[test]
    fn first_draw_on_fourth_sample() {
        let mut noise = NoiseStage::default();
        noise.set_dirt(100);
        noise.refresh(1.0);
        assert_eq!(noise.next(), 0.0);
        assert_eq!(noise.next(), 0.0);
        assert_eq!(noise.next(), 0.0);
        assert_ne!(noise.next(), 0.0);
    }

    #[test]
    fn value_held_between_draws() {
        let mut noise = NoiseStage::default();
        noise.set_dirt(100);
        noise.refresh(1.8);
        let values: Vec<f32> = (0..400).map(|_| noise.next()).collect();
        for (n, pair) in values.windows(2).enumerate() {
            let changed = pair[0] != pair[1];
            // Draws land on samples 3, 7, 11, ...
            if changed {
                assert_eq!((n + 1) % 4, 3, "Noise changed off-cadence at sample {}", n + 1);
            }
        }
    }

    #[test]
    fn reset_restarts_the_sequence() {
        let mut noise = NoiseStage::new(99);
        noise.set_dirt(100);
        noise.refresh(1.0);
        let first: Vec<f32> = (0..40).map(|_| noise.next()).collect();

        noise.next();
        noise.reset(99);
        assert_eq!(noise.dirt(), 1.0);
        noise.refresh(1.0);
        let again: Vec<f32> = (0..40).map(|_| noise.next()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn silent_without_dirt() {
        let mut noise = NoiseStage::default();
        noise.refresh(1.8);
        assert!((0..100).all(|_| noise.next() == 0.0));
    }
}
