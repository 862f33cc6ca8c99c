use crate::generator::swath::SwathConfig;
use crate::sources::tile_file::SoilRasterPaths;
use anyhow::Context;
use chrono::NaiveDate;
use featcore::math::FeatureNormalizer;
use featcore::records::Station;
use featcore::{ExtractionConfig, ValueDomain};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub stations: Vec<Station>,
    pub extraction: ExtractionConfig,
    pub domain: ValueDomain,
    /// `null` keeps values in native physical units.
    pub normalizer: Option<FeatureNormalizer>,
    /// Directory of baseline (L3) grid files; synthetic swaths when absent.
    pub grid_dir: Option<PathBuf>,
    /// Directory of alternate (L4) grid files.
    pub alternate_grid_dir: Option<PathBuf>,
    pub terrain_tiles: Vec<PathBuf>,
    pub soil_rasters: SoilRasterPaths,
    pub synthetic: SwathConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            stations: Vec::new(),
            extraction: ExtractionConfig::default(),
            domain: ValueDomain::default(),
            normalizer: Some(FeatureNormalizer::soil_moisture()),
            grid_dir: None,
            alternate_grid_dir: None,
            terrain_tiles: Vec::new(),
            soil_rasters: SoilRasterPaths::default(),
            synthetic: SwathConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Two Front Range gauges over a single synthetic day.
    pub fn demo() -> anyhow::Result<Self> {
        let day = NaiveDate::from_ymd_opt(2024, 7, 29).context("building demo date")?;
        Ok(Self {
            start: Some(day),
            end: Some(day),
            stations: vec![
                Station::new("USGS:06730200", 40.0519, -105.1789)?,
                Station::new("DWR:BOCOROCO", 40.0186, -105.2217)?,
            ],
            ..Default::default()
        })
    }

    /// Inclusive date range, with command-line values taking precedence.
    pub fn date_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> anyhow::Result<(NaiveDate, NaiveDate)> {
        let start = start
            .or(self.start)
            .context("no start date in workflow or on the command line")?;
        let end = end.or(self.end).unwrap_or(start);
        anyhow::ensure!(end >= start, "end date {} precedes start date {}", end, start);
        Ok((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const WORKFLOW_YAML: &str = "\
start: 2024-07-01
end: 2024-07-03
stations:
  - id: USGS:06730200
    latitude: 40.05
    longitude: -105.18
extraction:
  radius_km: 9.0
normalizer: null
soil_rasters:
  clay_pct: data/static/wise_cac.json
";

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(WORKFLOW_YAML.as_bytes()).unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();

        assert_eq!(cfg.stations.len(), 1);
        assert_eq!(cfg.stations[0].source(), "USGS");
        assert_eq!(cfg.extraction.radius_km, 9.0);
        assert_eq!(cfg.extraction.chunk_size, 50);
        assert!(cfg.normalizer.is_none());
        assert_eq!(cfg.domain.fill, -9999.0);
        assert_eq!(cfg.start, NaiveDate::from_ymd_opt(2024, 7, 1));
        assert_eq!(
            cfg.soil_rasters.clay_pct,
            Some(PathBuf::from("data/static/wise_cac.json"))
        );
        assert!(cfg.soil_rasters.ph.is_none());
    }

    #[test]
    fn invalid_station_fails_to_load() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"stations:\n  - id: nocolon\n    latitude: 1.0\n    longitude: 2.0\n")
            .unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }

    #[test]
    fn command_line_dates_override_workflow() {
        let cfg = WorkflowConfig::demo().unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2024, 8, d);

        let (start, end) = cfg.date_range(day(1), day(3)).unwrap();
        assert_eq!((Some(start), Some(end)), (day(1), day(3)));

        let (start, end) = cfg.date_range(None, None).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 7, 29).unwrap());
        assert_eq!(end, start);

        assert!(cfg.date_range(day(3), day(1)).is_err());
        assert!(WorkflowConfig::default().date_range(None, None).is_err());
    }
}
