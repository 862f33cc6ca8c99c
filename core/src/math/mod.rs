pub mod geodesic;
pub mod normalize;
pub mod stats;

pub use geodesic::{distance_grid, haversine_km, EARTH_RADIUS_KM};
pub use normalize::FeatureNormalizer;
pub use stats::WeightedAccumulator;
