use crate::sources::{rows_to_array, GridSource};
use anyhow::Context;
use chrono::NaiveDate;
use featcore::records::GriddedObservation;
use featcore::{Pass, ValueDomain};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout of one pass: four equally shaped row-major arrays.
#[derive(Debug, Deserialize)]
struct GridFile {
    values: Vec<Vec<f64>>,
    quality: Vec<Vec<i32>>,
    latitude: Vec<Vec<f64>>,
    longitude: Vec<Vec<f64>>,
}

/// Reads `<dir>/<YYYY-MM-DD>_<AM|PM>.json` grids exported by the retrieval layer.
pub struct JsonGridSource {
    dir: PathBuf,
    domain: ValueDomain,
}

impl JsonGridSource {
    pub fn new(dir: impl Into<PathBuf>, domain: ValueDomain) -> Self {
        Self {
            dir: dir.into(),
            domain,
        }
    }

    pub fn path_for(&self, day: NaiveDate, pass: Pass) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", day.format("%Y-%m-%d"), pass.label()))
    }

    fn read(&self, path: &Path, pass: Pass) -> anyhow::Result<GriddedObservation> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading grid {}", path.display()))?;
        let file: GridFile = serde_json::from_str(&contents)
            .with_context(|| format!("parsing grid {}", path.display()))?;

        let grid = GriddedObservation::new(
            rows_to_array(file.values, "values")?,
            rows_to_array(file.quality, "quality")?,
            rows_to_array(file.latitude, "latitude")?,
            rows_to_array(file.longitude, "longitude")?,
            pass,
            self.domain,
        )
        .with_context(|| format!("validating grid {}", path.display()))?;
        Ok(grid)
    }
}

impl GridSource for JsonGridSource {
    fn load_pass(&self, day: NaiveDate, pass: Pass) -> anyhow::Result<Option<GriddedObservation>> {
        let path = self.path_for(day, pass);
        if !path.exists() {
            warn!("no {} grid for {} at {}", pass, day, path.display());
            return Ok(None);
        }
        self.read(&path, pass).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 29).unwrap()
    }

    #[test]
    fn missing_file_is_an_absent_pass() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonGridSource::new(dir.path(), ValueDomain::default());
        assert!(source.load_pass(day(), Pass::Am).unwrap().is_none());
    }

    #[test]
    fn grid_file_loads_into_observation() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonGridSource::new(dir.path(), ValueDomain::default());
        let mut file = fs::File::create(source.path_for(day(), Pass::Pm)).unwrap();
        file.write_all(
            br#"{"values":[[0.2,0.3],[-9999.0,0.4]],
                 "quality":[[0,1],[0,0]],
                 "latitude":[[40.0,40.0],[40.1,40.1]],
                 "longitude":[[-105.0,-104.9],[-105.0,-104.9]]}"#,
        )
        .unwrap();

        let grid = source.load_pass(day(), Pass::Pm).unwrap().unwrap();
        assert_eq!(grid.dim(), (2, 2));
        assert_eq!(grid.pass(), Pass::Pm);
        assert_eq!(grid.valid_count(), 3);
    }

    #[test]
    fn mismatched_shapes_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonGridSource::new(dir.path(), ValueDomain::default());
        fs::write(
            source.path_for(day(), Pass::Am),
            r#"{"values":[[0.2,0.3]],"quality":[[0]],
                "latitude":[[40.0,40.0]],"longitude":[[-105.0,-104.9]]}"#,
        )
        .unwrap();

        let err = source.load_pass(day(), Pass::Am).unwrap_err();
        assert!(format!("{:#}", err).contains("shape mismatch"));
    }
}
