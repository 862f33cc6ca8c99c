pub mod feature;
pub mod grid;
pub mod station;

pub use feature::{
    day_timestamp, FusedObservation, PassUsed, ProductSource, SoilSample, TerrainSample,
    UNKNOWN_SOIL_CLASS,
};
pub use grid::{GridCell, GriddedObservation};
pub use station::Station;
