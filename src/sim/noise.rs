//! Zero-mean Gaussian noise per sensor channel, per §3's "All numeric
//! fields may carry zero-mean Gaussian noise of configured per-channel
//! standard deviation". Grounded on
//! `original_source/src/simulation/noise_generator.py` (`random.gauss`)
//! for the distribution family, sampled here via `statrs`+`rand` rather
//! than the teacher's own sensors, which sample *uniform* noise
//! (`rand::random_range` in `component_a/sensor.rs`) — a deliberate
//! divergence required by the spec text itself.

use rand::distributions::Distribution;
use rand::Rng;
use statrs::distribution::{Continuous, Normal};

/// One independent Gaussian channel with a fixed standard deviation.
#[derive(Debug, Clone)]
pub struct NoiseChannel {
    std_dev: f64,
    normal: Normal,
}

impl NoiseChannel {
    pub fn new(std_dev: f64) -> Self {
        let std_dev = std_dev.max(1e-9);
        Self {
            std_dev,
            normal: Normal::new(0.0, std_dev).expect("std_dev must be finite and non-negative"),
        }
    }

    pub fn density_at(&self, x: f64) -> f64 {
        self.normal.pdf(x)
    }

    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        self.normal.sample(rng)
    }
}

/// Bundles the four noisy channels §6 names standard deviations for.
pub struct MultiChannelNoise {
    pub position: NoiseChannel,
    pub theta: NoiseChannel,
    pub velocity: NoiseChannel,
    pub temperature: NoiseChannel,
}

impl MultiChannelNoise {
    pub fn new(config: &crate::config::NoiseConfig) -> Self {
        Self {
            position: NoiseChannel::new(config.position),
            theta: NoiseChannel::new(config.theta),
            velocity: NoiseChannel::new(config.velocity),
            temperature: NoiseChannel::new(config.temperature),
        }
    }
}
