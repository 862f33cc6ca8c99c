use crate::math::geodesic::{distance_grid, haversine_km};
use crate::math::stats::WeightedAccumulator;
use crate::prelude::{ExtractionConfig, ExtractionResult, FeatureError, FeatureResult, ValueDomain};
use crate::records::grid::{GridCell, GriddedObservation};
use log::debug;

/// Radius search with distance- and quality-weighted averaging.
///
/// Grids smaller than `chunk_size` are evaluated in one pass over a full
/// distance array. Larger grids are streamed in row-major slices of
/// `chunk_size` cells so only one slice of distances is alive at a time.
/// Both strategies push cells into the same accumulator in the same order.
#[derive(Debug, Clone)]
pub struct RadiusWeightedExtractor {
    config: ExtractionConfig,
}

impl RadiusWeightedExtractor {
    pub fn new(config: ExtractionConfig) -> FeatureResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts a single weighted value for the target coordinate.
    ///
    /// Fewer than three usable cells inside the radius yields a NaN result,
    /// which is an expected outcome rather than an error.
    pub fn extract(
        &self,
        grid: &GriddedObservation,
        target_lat: f64,
        target_lon: f64,
    ) -> FeatureResult<ExtractionResult> {
        if !target_lat.is_finite() || !target_lon.is_finite() {
            return Err(FeatureError::MalformedInput(format!(
                "target coordinate ({target_lat}, {target_lon}) is not finite"
            )));
        }

        let mut acc = WeightedAccumulator::new(self.config.best_quality);
        if grid.len() < self.config.chunk_size {
            self.accumulate_whole(grid, target_lat, target_lon, &mut acc)?;
        } else {
            self.accumulate_chunked(grid, target_lat, target_lon, &mut acc);
        }

        let result = acc.finish();
        if result.is_usable() {
            debug!(
                "{} pass: {} usable pixels within {} km, mean distance {:.1} km",
                grid.pass(),
                acc.count(),
                self.config.radius_km,
                acc.mean_distance_km()
            );
        } else {
            debug!(
                "{} pass: only {} usable pixels within {} km, need at least 3",
                grid.pass(),
                acc.count(),
                self.config.radius_km
            );
        }
        Ok(result)
    }

    fn accumulate_whole(
        &self,
        grid: &GriddedObservation,
        target_lat: f64,
        target_lon: f64,
        acc: &mut WeightedAccumulator,
    ) -> FeatureResult<()> {
        let distances = distance_grid(target_lat, target_lon, grid.latitude(), grid.longitude())?;
        let domain = grid.domain();
        for (cell, &distance) in grid.cells().zip(distances.iter()) {
            self.admit(&cell, distance, &domain, acc);
        }
        Ok(())
    }

    fn accumulate_chunked(
        &self,
        grid: &GriddedObservation,
        target_lat: f64,
        target_lon: f64,
        acc: &mut WeightedAccumulator,
    ) {
        let chunk_size = self.config.chunk_size;
        let domain = grid.domain();
        let mut cells = grid.cells();
        let mut chunk: Vec<GridCell> = Vec::with_capacity(chunk_size);
        let mut distances: Vec<f64> = Vec::with_capacity(chunk_size);
        let mut chunk_count = 0usize;

        loop {
            chunk.clear();
            chunk.extend(cells.by_ref().take(chunk_size));
            if chunk.is_empty() {
                break;
            }

            distances.clear();
            distances.extend(
                chunk
                    .iter()
                    .map(|cell| haversine_km(target_lat, target_lon, cell.latitude, cell.longitude)),
            );

            for (cell, &distance) in chunk.iter().zip(distances.iter()) {
                self.admit(cell, distance, &domain, acc);
            }
            chunk_count += 1;
        }

        debug!(
            "streamed {} cells in {} chunks of {}",
            grid.len(),
            chunk_count,
            chunk_size
        );
    }

    #[inline]
    fn admit(
        &self,
        cell: &GridCell,
        distance_km: f64,
        domain: &ValueDomain,
        acc: &mut WeightedAccumulator,
    ) {
        if domain.accepts(cell.value) && distance_km <= self.config.radius_km {
            acc.push(cell.value, cell.quality, distance_km);
        }
    }
}
