use anyhow::{ensure, Context};
use featcore::records::GriddedObservation;
use featcore::{Pass, ValueDomain};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration for generating synthetic soil-moisture swaths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SwathConfig {
    pub rows: usize,
    pub cols: usize,
    pub spacing_deg: f64,
    pub center_lat: Option<f64>,
    pub center_lon: Option<f64>,
    pub base_moisture: f64,
    pub amplitude: f64,
    pub noise: f64,
    pub fill_fraction: f64,
    pub degraded_fraction: f64,
    pub seed: u64,
}

impl Default for SwathConfig {
    fn default() -> Self {
        Self {
            rows: 40,
            cols: 40,
            spacing_deg: 0.03,
            center_lat: None,
            center_lon: None,
            base_moisture: 0.25,
            amplitude: 0.08,
            noise: 0.02,
            fill_fraction: 0.1,
            degraded_fraction: 0.3,
            seed: 0,
        }
    }
}

impl SwathConfig {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.rows > 0 && self.cols > 0, "swath must have at least one cell");
        ensure!(
            self.spacing_deg.is_finite() && self.spacing_deg > 0.0,
            "spacing_deg must be positive"
        );
        ensure!(
            (0.0..=1.0).contains(&self.fill_fraction)
                && (0.0..=1.0).contains(&self.degraded_fraction),
            "fractions must lie in [0, 1]"
        );
        Ok(())
    }
}

/// Builds one pass of a synthetic swath centered on `(center_lat, center_lon)`.
///
/// Values are clamped to `domain` and dropped cells carry its fill value.
/// `stream` decorrelates days and passes that share the configured seed.
pub fn build_swath(
    config: &SwathConfig,
    domain: ValueDomain,
    center_lat: f64,
    center_lon: f64,
    pass: Pass,
    stream: u64,
) -> anyhow::Result<GriddedObservation> {
    config.validate()?;
    let shape = (config.rows, config.cols);
    let row_offset = (config.rows as f64 - 1.0) / 2.0;
    let col_offset = (config.cols as f64 - 1.0) / 2.0;

    let mut rng = StdRng::seed_from_u64(config.seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    let phase = match pass {
        Pass::Am => 0.0,
        Pass::Pm => PI / 3.0,
    };

    let latitude = Array2::from_shape_fn(shape, |(r, _)| {
        center_lat + (r as f64 - row_offset) * config.spacing_deg
    });
    let longitude = Array2::from_shape_fn(shape, |(_, c)| {
        center_lon + (c as f64 - col_offset) * config.spacing_deg
    });

    let mut values = Array2::zeros(shape);
    let mut quality = Array2::zeros(shape);
    for ((r, c), value) in values.indexed_iter_mut() {
        if rng.gen_bool(config.fill_fraction) {
            *value = domain.fill;
            continue;
        }
        let wave = (2.0 * PI * r as f64 / config.rows as f64 + phase).sin()
            * (2.0 * PI * c as f64 / config.cols as f64).cos();
        let jitter = if config.noise > 0.0 {
            rng.gen_range(-config.noise..config.noise)
        } else {
            0.0
        };
        *value = (config.base_moisture + config.amplitude * wave + jitter).clamp(domain.min, domain.max);
        quality[[r, c]] = i32::from(rng.gen_bool(config.degraded_fraction));
    }

    GriddedObservation::new(values, quality, latitude, longitude, pass, domain)
        .context("assembling synthetic swath")
}
