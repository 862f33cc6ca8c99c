use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unix seconds at UTC midnight of `day`.
pub fn day_timestamp(day: NaiveDate) -> i64 {
    day.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().timestamp())
        .unwrap_or_default()
}

/// Which pass supplied a fused value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PassUsed {
    Am,
    Pm,
    Averaged,
}

/// Product family a fused observation was derived from.
///
/// Stored as `0` for the baseline (L3) product and `1` for the alternate (L4).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(into = "u8", try_from = "u8")]
pub enum ProductSource {
    #[default]
    Baseline,
    Alternate,
}

impl From<ProductSource> for u8 {
    fn from(source: ProductSource) -> Self {
        match source {
            ProductSource::Baseline => 0,
            ProductSource::Alternate => 1,
        }
    }
}

impl TryFrom<u8> for ProductSource {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ProductSource::Baseline),
            1 => Ok(ProductSource::Alternate),
            other => Err(format!("unknown product source {other}")),
        }
    }
}

/// One fused soil-moisture record per station per day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FusedObservation {
    pub timestamp: i64,
    pub station_id: String,
    pub soil_moisture: f64,
    pub quality_flag: i32,
    pub pass_used: PassUsed,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend3: Option<f64>,
    #[serde(default)]
    pub source: ProductSource,
}

impl FusedObservation {
    pub fn with_trend3(self, trend3: Option<f64>) -> Self {
        Self { trend3, ..self }
    }

    pub fn with_source(self, source: ProductSource) -> Self {
        Self { source, ..self }
    }

    pub fn map_value(self, f: impl FnOnce(f64) -> f64) -> Self {
        Self {
            soil_moisture: f(self.soil_moisture),
            ..self
        }
    }
}

/// Static terrain features for a station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerrainSample {
    pub station_id: String,
    pub elevation_m: f64,
    pub slope_deg: f64,
}

impl TerrainSample {
    /// Last-resort default when no tile offers a complete window.
    pub fn unavailable(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            elevation_m: 0.0,
            slope_deg: 0.0,
        }
    }
}

/// Class label used when a soil class raster has no value at a station.
pub const UNKNOWN_SOIL_CLASS: &str = "UNKNOWN";

/// Static soil properties for a station.
///
/// Percentages are by mass. Properties missing from every raster keep the
/// `UNKNOWN` class or a zero percentage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilSample {
    pub station_id: String,
    pub soil_type: String,
    pub soil_texture: String,
    pub clay_pct: f64,
    pub sand_pct: f64,
    pub organic_carbon_pct: f64,
}

impl SoilSample {
    pub fn unavailable(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            soil_type: UNKNOWN_SOIL_CLASS.to_string(),
            soil_texture: UNKNOWN_SOIL_CLASS.to_string(),
            clay_pct: 0.0,
            sand_pct: 0.0,
            organic_carbon_pct: 0.0,
        }
    }
}
