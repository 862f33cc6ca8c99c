use crate::sources::rows_to_array;
use anyhow::Context;
use featcore::processing::terrain::DEFAULT_CELL_SIZE_M;
use featcore::processing::{GeoTransform, RasterTile, SoilRasters};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct TileFile {
    elevation: Vec<Vec<f64>>,
    transform: GeoTransform,
    #[serde(default)]
    nodata: Option<f64>,
    #[serde(default)]
    cell_size_m: Option<f64>,
}

/// Loads an elevation tile exported as JSON rows plus its affine transform.
pub fn load_tile(path: &Path) -> anyhow::Result<RasterTile> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading tile {}", path.display()))?;
    let file: TileFile = serde_json::from_str(&contents)
        .with_context(|| format!("parsing tile {}", path.display()))?;

    let data = rows_to_array(file.elevation, "elevation")?;
    RasterTile::new(
        data,
        file.transform,
        file.nodata,
        file.cell_size_m.unwrap_or(DEFAULT_CELL_SIZE_M),
    )
    .with_context(|| format!("validating tile {}", path.display()))
}

pub fn load_tiles<P: AsRef<Path>>(paths: &[P]) -> anyhow::Result<Vec<RasterTile>> {
    paths.iter().map(|p| load_tile(p.as_ref())).collect()
}

/// Tile files for each soil-property layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoilRasterPaths {
    pub soil_class: Option<PathBuf>,
    pub texture_class: Option<PathBuf>,
    pub clay_pct: Option<PathBuf>,
    pub ph: Option<PathBuf>,
    pub available_water: Option<PathBuf>,
}

fn load_optional(path: Option<&PathBuf>) -> anyhow::Result<Option<RasterTile>> {
    path.map(|p| load_tile(p)).transpose()
}

pub fn load_soil_rasters(paths: &SoilRasterPaths) -> anyhow::Result<SoilRasters> {
    Ok(SoilRasters {
        soil_class: load_optional(paths.soil_class.as_ref())?,
        texture_class: load_optional(paths.texture_class.as_ref())?,
        clay_pct: load_optional(paths.clay_pct.as_ref())?,
        ph: load_optional(paths.ph.as_ref())?,
        available_water: load_optional(paths.available_water.as_ref())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLAY_TILE: &str = r#"{"elevation":[[18,22],[25,-9999]],
        "transform":{"x0":-105.2,"dx":0.1,"rx":0.0,"y0":40.1,"ry":0.0,"dy":-0.1},
        "nodata":-9999}"#;

    #[test]
    fn soil_layers_load_only_when_listed() {
        let dir = tempfile::tempdir().unwrap();
        let clay = dir.path().join("wise_cac.json");
        fs::write(&clay, CLAY_TILE).unwrap();

        let rasters = load_soil_rasters(&SoilRasterPaths {
            clay_pct: Some(clay),
            ..Default::default()
        })
        .unwrap();
        assert!(rasters.soil_class.is_none());
        let clay = rasters.clay_pct.unwrap();
        assert_eq!(clay.value_at(40.05, -105.15), Some(18.0));
        assert_eq!(clay.value_at(39.95, -105.05), None);

        assert!(load_soil_rasters(&SoilRasterPaths::default())
            .unwrap()
            .is_empty());
        let missing = SoilRasterPaths {
            ph: Some(dir.path().join("absent.json")),
            ..Default::default()
        };
        assert!(load_soil_rasters(&missing).is_err());
    }

    #[test]
    fn tile_file_round_trips_into_raster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("n40w105.json");
        fs::write(
            &path,
            r#"{"elevation":[[1,2,3],[4,5,6],[7,8,9]],
                "transform":{"x0":-105.0,"dx":0.001,"rx":0.0,"y0":40.003,"ry":0.0,"dy":-0.001},
                "nodata":-32768}"#,
        )
        .unwrap();

        let tiles = load_tiles(&[path]).unwrap();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].dim(), (3, 3));
        assert_eq!(tiles[0].cell_size_m(), DEFAULT_CELL_SIZE_M);
        assert_eq!(tiles[0].value_at(40.0015, -104.9985), Some(5.0));
    }
}
