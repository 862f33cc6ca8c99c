use crate::sources::GridSource;
use crate::workflow::config::WorkflowConfig;
use crate::workflow::history::StationHistory;
use anyhow::Context;
use chrono::NaiveDate;
use featcore::processing::{
    fuse, select_source, soil_sample, terrain_sample, RadiusWeightedExtractor, RasterTile,
    SoilRasters,
};
use featcore::records::{
    day_timestamp, FusedObservation, GriddedObservation, SoilSample, Station, TerrainSample,
};
use featcore::telemetry::{ExtractionMetrics, MetricsSnapshot};
use featcore::{ExtractionResult, Pass};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;

/// One JSON line of runner output.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputRecord<'a> {
    Soil(&'a FusedObservation),
    Terrain(&'a TerrainSample),
    SoilProperties(&'a SoilSample),
}

/// Rasters describing the fixed surroundings of each station.
#[derive(Debug, Clone, Default)]
pub struct StaticLayers {
    pub elevation: Vec<RasterTile>,
    pub soil: SoilRasters,
}

fn write_record<W: Write>(out: &mut W, record: &OutputRecord<'_>) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, record).context("serializing output record")?;
    out.write_all(b"\n").context("writing output record")?;
    Ok(())
}

/// Both passes of one product for one day.
struct DayGrids {
    am: Option<GriddedObservation>,
    pm: Option<GriddedObservation>,
}

impl DayGrids {
    fn load(source: &dyn GridSource, day: NaiveDate) -> anyhow::Result<Self> {
        let mut grids = Self { am: None, pm: None };
        for pass in Pass::BOTH {
            let grid = source
                .load_pass(day, pass)
                .with_context(|| format!("loading {} grid for {}", pass, day))?;
            if let Some(grid) = &grid {
                info!(
                    "{} {} grid: {:?} cells, {} valid",
                    day,
                    pass,
                    grid.dim(),
                    grid.valid_count()
                );
            }
            match pass {
                Pass::Am => grids.am = grid,
                Pass::Pm => grids.pm = grid,
            }
        }
        Ok(grids)
    }

    fn is_empty(&self) -> bool {
        self.am.is_none() && self.pm.is_none()
    }
}

pub struct Runner {
    config: WorkflowConfig,
    extractor: RadiusWeightedExtractor,
    metrics: ExtractionMetrics,
    history: StationHistory,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> anyhow::Result<Self> {
        let extractor = RadiusWeightedExtractor::new(config.extraction.clone())
            .context("configuring extractor")?;
        Ok(Self {
            config,
            extractor,
            metrics: ExtractionMetrics::new(),
            history: StationHistory::new(),
        })
    }

    /// Extracts one product for every station, AM and PM both finishing
    /// before the station's passes are fused.
    fn fuse_product(
        &self,
        grids: &DayGrids,
        timestamp: i64,
    ) -> anyhow::Result<Vec<Option<FusedObservation>>> {
        self.config
            .stations
            .par_iter()
            .map(|station| {
                let am = self.extract_pass(grids.am.as_ref(), station)?;
                let pm = self.extract_pass(grids.pm.as_ref(), station)?;
                Ok(fuse(timestamp, station.id(), am.as_ref(), pm.as_ref()))
            })
            .collect()
    }

    fn extract_pass(
        &self,
        grid: Option<&GriddedObservation>,
        station: &Station,
    ) -> anyhow::Result<Option<ExtractionResult>> {
        let Some(grid) = grid else {
            return Ok(None);
        };
        let result = self
            .extractor
            .extract(grid, station.latitude(), station.longitude())
            .with_context(|| format!("extracting {} pass for {}", grid.pass(), station.id()))?;
        self.metrics.record_pass(&result);
        if !result.is_usable() {
            warn!(
                "{}: no usable {} value ({} pixels in radius)",
                station.id(),
                grid.pass(),
                result.pixel_count
            );
        }
        Ok(Some(result))
    }

    /// Fused records for every station with data on `day`.
    pub fn process_day(
        &mut self,
        day: NaiveDate,
        baseline: &dyn GridSource,
        alternate: Option<&dyn GridSource>,
    ) -> anyhow::Result<Vec<FusedObservation>> {
        let timestamp = day_timestamp(day);
        let baseline_grids = DayGrids::load(baseline, day)?;
        let alternate_grids = alternate
            .map(|source| DayGrids::load(source, day))
            .transpose()?;

        let no_alternate = alternate_grids.as_ref().map_or(true, DayGrids::is_empty);
        if baseline_grids.is_empty() && no_alternate {
            warn!("no grids available for {}", day);
            return Ok(Vec::new());
        }

        let baseline_fused = self.fuse_product(&baseline_grids, timestamp)?;
        let mut alternate_fused = match &alternate_grids {
            Some(grids) => self.fuse_product(grids, timestamp)?,
            None => Vec::new(),
        }
        .into_iter();

        let best_quality = self.config.extraction.best_quality;
        let mut observations = Vec::new();
        for base in baseline_fused {
            let alt = alternate_fused.next().flatten();
            let Some(obs) = select_source(base, alt, best_quality) else {
                self.metrics.record_fused(None, best_quality);
                continue;
            };

            let obs = match &self.config.normalizer {
                Some(normalizer) => obs.map_value(|v| normalizer.apply(v)),
                None => obs,
            };
            self.metrics.record_fused(Some(&obs), best_quality);
            let trend3 = self.history.observe(&obs.station_id, obs.soil_moisture);
            observations.push(obs.with_trend3(trend3));
        }

        info!(
            "{}: {} of {} stations fused",
            day,
            observations.len(),
            self.config.stations.len()
        );
        Ok(observations)
    }

    /// Static terrain features for every station.
    pub fn terrain(&self, tiles: &[RasterTile]) -> Vec<TerrainSample> {
        self.config
            .stations
            .par_iter()
            .map(|station| terrain_sample(station, tiles, &self.metrics))
            .collect()
    }

    /// Static soil properties for every station.
    pub fn soil_properties(&self, rasters: &SoilRasters) -> Vec<SoilSample> {
        if rasters.is_empty() {
            warn!("no soil rasters configured, soil properties use defaults");
        }
        self.config
            .stations
            .par_iter()
            .map(|station| soil_sample(station, rasters))
            .collect()
    }

    /// Terrain and soil properties for every station, then fused records for
    /// each day in `start..=end`, written as JSON lines. Returns the number
    /// of days.
    pub fn run<W: Write>(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        baseline: &dyn GridSource,
        alternate: Option<&dyn GridSource>,
        statics: &StaticLayers,
        out: &mut W,
    ) -> anyhow::Result<usize> {
        info!(
            "processing {} stations from {} to {}",
            self.config.stations.len(),
            start,
            end
        );
        for sample in self.terrain(&statics.elevation) {
            write_record(out, &OutputRecord::Terrain(&sample))?;
        }
        for sample in self.soil_properties(&statics.soil) {
            write_record(out, &OutputRecord::SoilProperties(&sample))?;
        }

        let mut days = 0;
        for day in start.iter_days().take_while(|day| *day <= end) {
            for obs in self.process_day(day, baseline, alternate)? {
                write_record(out, &OutputRecord::Soil(&obs))?;
            }
            days += 1;
        }
        out.flush().context("flushing output")?;
        self.log_summary(days);
        Ok(days)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Logs a readout of the run so far.
    pub fn log_summary(&self, days: usize) {
        let snap = self.metrics();
        info!("Feature summary");
        info!("- days processed: {}", days);
        info!(
            "- stations with data: {}/{}",
            self.history.station_count(),
            self.config.stations.len()
        );
        info!("- fused records: {}", snap.fused);
        info!("- station-days without data: {}", snap.no_data);
        info!(
            "- passes usable/insufficient: {}/{}",
            snap.passes_usable, snap.passes_insufficient
        );
        if let (Some(mean), Some(pct)) = (snap.mean_moisture(), snap.best_quality_pct()) {
            info!("- mean soil moisture: {:.3}", mean);
            info!("- best-quality records: {:.1}%", pct);
        }
        if snap.terrain_fallbacks > 0 {
            info!("- terrain fallbacks: {}", snap.terrain_fallbacks);
        }
    }
}
