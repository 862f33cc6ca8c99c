use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of usable cells inside the search radius.
pub const MIN_USABLE_CELLS: usize = 3;

/// Shared configuration for radius-weighted extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub radius_km: f64,
    pub chunk_size: usize,
    pub best_quality: i32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            radius_km: 5.0,
            chunk_size: 50,
            best_quality: 0,
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> FeatureResult<()> {
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(FeatureError::InvalidConfig(format!(
                "radius_km must be positive, got {}",
                self.radius_km
            )));
        }
        if self.chunk_size == 0 {
            return Err(FeatureError::InvalidConfig(
                "chunk_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Valid physical range and fill sentinel of a gridded product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValueDomain {
    pub min: f64,
    pub max: f64,
    pub fill: f64,
}

impl Default for ValueDomain {
    /// Volumetric soil moisture fraction.
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            fill: -9999.0,
        }
    }
}

impl ValueDomain {
    /// NaN never satisfies the range comparison, so it is rejected here too.
    #[inline]
    pub fn accepts(&self, value: f64) -> bool {
        value != self.fill && value >= self.min && value <= self.max
    }
}

/// Daily overflight pass of a gridded observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Pass {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Pass {
    pub const BOTH: [Pass; 2] = [Pass::Am, Pass::Pm];

    pub fn label(&self) -> &'static str {
        match self {
            Pass::Am => "AM",
            Pass::Pm => "PM",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of extracting one station from one grid.
///
/// A NaN `value` means no usable data; the other fields then only describe
/// how many cells were found.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    pub value: f64,
    pub quality_score: f64,
    pub pixel_count: usize,
    /// Quality code of the dominant (highest distance weight) usable cell.
    pub quality_flag: i32,
}

impl ExtractionResult {
    pub fn insufficient(pixel_count: usize) -> Self {
        Self {
            value: f64::NAN,
            quality_score: 0.0,
            pixel_count,
            quality_flag: i32::MAX,
        }
    }

    pub fn is_usable(&self) -> bool {
        !self.value.is_nan()
    }
}

/// Common error type for contract violations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("shape mismatch for {field}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        field: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid station: {0}")]
    InvalidStation(String),
}

pub type FeatureResult<T> = Result<T, FeatureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_rejects_fill_nan_and_out_of_range() {
        let domain = ValueDomain::default();
        assert!(domain.accepts(0.0));
        assert!(domain.accepts(1.0));
        assert!(!domain.accepts(-9999.0));
        assert!(!domain.accepts(f64::NAN));
        assert!(!domain.accepts(1.01));
        assert!(!domain.accepts(-0.01));
    }

    #[test]
    fn config_rejects_zero_chunk_and_bad_radius() {
        let mut config = ExtractionConfig::default();
        assert!(config.validate().is_ok());
        config.chunk_size = 0;
        assert!(config.validate().is_err());
        config.chunk_size = 10;
        config.radius_km = -1.0;
        assert!(config.validate().is_err());
        config.radius_km = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn insufficient_result_is_not_usable() {
        let result = ExtractionResult::insufficient(2);
        assert!(!result.is_usable());
        assert_eq!(result.pixel_count, 2);
        assert_eq!(result.quality_score, 0.0);
    }
}
