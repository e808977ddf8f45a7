//! Seeded normal sampler for jitter and synthetic data.
//!
//! An LCG drives Box-Muller, so a seed always yields the same sequence on
//! every platform. Not suitable for anything statistical beyond plotting.

/// Deterministic uniform and normal samples.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Start a sequence from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_mul(1_103_515_245).wrapping_add(12_345),
        }
    }

    /// Uniform sample in `(0, 1)`.
    pub fn uniform(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        // top 24 bits, shifted off zero so ln() stays finite
        ((self.state >> 40) as f32 + 0.5) / (1u64 << 24) as f32
    }

    /// Normal sample with mean `mu` and standard deviation `sigma`.
    pub fn normal(&mut self, mu: f32, sigma: f32) -> f32 {
        let (u1, u2) = (self.uniform(), self.uniform());
        let z = (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos();
        mu + sigma * z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        let xs: Vec<f32> = (0..16).map(|_| a.normal(0.0, 1.0)).collect();
        let ys: Vec<f32> = (0..16).map(|_| b.normal(0.0, 1.0)).collect();
        assert_eq!(xs, ys);
        assert_ne!(SeededRng::new(1).uniform(), SeededRng::new(2).uniform());
    }

    #[test]
    fn test_uniform_open_interval() {
        let mut rng = SeededRng::new(0);
        assert!((0..10_000).map(|_| rng.uniform()).all(|u| u > 0.0 && u < 1.0));
    }

    #[test]
    fn test_normal_moments() {
        let mut rng = SeededRng::new(7);
        let xs: Vec<f32> = (0..20_000).map(|_| rng.normal(3.0, 2.0)).collect();
        let n = xs.len() as f32;
        let mean = xs.iter().sum::<f32>() / n;
        let var = xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / n;
        assert!((mean - 3.0).abs() < 0.1);
        assert!((var.sqrt() - 2.0).abs() < 0.1);
    }
}
