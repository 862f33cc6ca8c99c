use crate::prelude::{FeatureError, FeatureResult};
use serde::{Deserialize, Serialize};

/// Maps a physical quantity into `[0, 1]`; missing values become 0.
#[inline]
pub fn normalize(value: f64, domain_min: f64, domain_max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    ((value - domain_min) / (domain_max - domain_min)).clamp(0.0, 1.0)
}

/// Validated normalization range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "NormalizerBounds", into = "NormalizerBounds")]
pub struct FeatureNormalizer {
    min: f64,
    max: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct NormalizerBounds {
    min: f64,
    max: f64,
}

impl TryFrom<NormalizerBounds> for FeatureNormalizer {
    type Error = FeatureError;

    fn try_from(bounds: NormalizerBounds) -> FeatureResult<Self> {
        FeatureNormalizer::new(bounds.min, bounds.max)
    }
}

impl From<FeatureNormalizer> for NormalizerBounds {
    fn from(normalizer: FeatureNormalizer) -> Self {
        Self {
            min: normalizer.min,
            max: normalizer.max,
        }
    }
}

impl FeatureNormalizer {
    pub fn new(min: f64, max: f64) -> FeatureResult<Self> {
        if !min.is_finite() || !max.is_finite() || max <= min {
            return Err(FeatureError::InvalidDomain(format!(
                "normalization range [{min}, {max}] is empty or not finite"
            )));
        }
        Ok(Self { min, max })
    }

    /// Volumetric soil moisture, which rarely exceeds 0.5 m³/m³.
    pub fn soil_moisture() -> Self {
        Self { min: 0.0, max: 0.5 }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn apply(&self, value: f64) -> f64 {
        normalize(value, self.min, self.max)
    }
}

impl Default for FeatureNormalizer {
    fn default() -> Self {
        Self::soil_moisture()
    }
}
