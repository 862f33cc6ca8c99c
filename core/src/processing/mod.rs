pub mod extractor;
pub mod fusion;
pub mod soil;
pub mod terrain;

pub use extractor::RadiusWeightedExtractor;
pub use fusion::{fuse, select_source};
pub use soil::{soil_sample, SoilRasters};
pub use terrain::{locate_terrain, slope, terrain_sample, GeoTransform, RasterTile};
