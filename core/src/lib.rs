//! Spatial feature-extraction and fusion core for ground-station features.
//!
//! The modules turn gridded remote-sensing products (soil-moisture swaths,
//! elevation tiles, soil-property rasters) into point-located, time-stamped
//! records through pure, synchronous computations over in-memory arrays.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod records;
pub mod telemetry;

pub use prelude::{
    ExtractionConfig, ExtractionResult, FeatureError, FeatureResult, Pass, ValueDomain,
};
