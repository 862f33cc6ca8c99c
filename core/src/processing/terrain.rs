use crate::prelude::{FeatureError, FeatureResult};
use crate::records::feature::TerrainSample;
use crate::records::station::Station;
use crate::telemetry::metrics::ExtractionMetrics;
use log::{debug, warn};
use ndarray::{s, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// SRTM 1 arc-second resolution in metres.
pub const DEFAULT_CELL_SIZE_M: f64 = 30.0;

/// Elevation and slope (degrees) at the center of a 3×3 window.
///
/// Gradients use the Horn weighting of the eight neighbours.
pub fn slope(window: ArrayView2<f64>, cell_size_m: f64) -> FeatureResult<(f64, f64)> {
    if window.dim() != (3, 3) {
        return Err(FeatureError::MalformedInput(format!(
            "slope window must be 3x3, got {:?}",
            window.dim()
        )));
    }
    if !cell_size_m.is_finite() || cell_size_m <= 0.0 {
        return Err(FeatureError::MalformedInput(format!(
            "cell size must be positive, got {cell_size_m}"
        )));
    }

    let z = |r: usize, c: usize| window[[r, c]];
    let (nw, n, ne) = (z(0, 0), z(0, 1), z(0, 2));
    let (w, center, e) = (z(1, 0), z(1, 1), z(1, 2));
    let (sw, south, se) = (z(2, 0), z(2, 1), z(2, 2));

    let dx = ((ne + 2.0 * e + se) - (nw + 2.0 * w + sw)) / (8.0 * cell_size_m);
    let dy = ((sw + 2.0 * south + se) - (nw + 2.0 * n + ne)) / (8.0 * cell_size_m);
    let slope_deg = (dx * dx + dy * dy).sqrt().atan().to_degrees();

    Ok((center, slope_deg))
}

/// Affine pixel transform in GDAL coefficient order.
///
/// `x = x0 + col * dx + row * rx`, `y = y0 + col * ry + row * dy`, with x as
/// longitude and y as latitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoTransform {
    pub x0: f64,
    pub dx: f64,
    pub rx: f64,
    pub y0: f64,
    pub ry: f64,
    pub dy: f64,
}

impl GeoTransform {
    pub fn north_up(west: f64, north: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            x0: west,
            dx: pixel_width,
            rx: 0.0,
            y0: north,
            ry: 0.0,
            dy: -pixel_height.abs(),
        }
    }

    fn determinant(&self) -> f64 {
        self.dx * self.dy - self.rx * self.ry
    }

    /// Fractional (row, col) of a coordinate.
    pub fn invert(&self, lat: f64, lon: f64) -> (f64, f64) {
        let det = self.determinant();
        let x = lon - self.x0;
        let y = lat - self.y0;
        let col = (self.dy * x - self.rx * y) / det;
        let row = (self.dx * y - self.ry * x) / det;
        (row, col)
    }
}

/// Single-band raster with its geolocation.
#[derive(Debug, Clone)]
pub struct RasterTile {
    data: Array2<f64>,
    transform: GeoTransform,
    nodata: Option<f64>,
    cell_size_m: f64,
}

impl RasterTile {
    pub fn new(
        data: Array2<f64>,
        transform: GeoTransform,
        nodata: Option<f64>,
        cell_size_m: f64,
    ) -> FeatureResult<Self> {
        if data.is_empty() {
            return Err(FeatureError::MalformedInput("raster tile is empty".into()));
        }
        let det = transform.determinant();
        if !det.is_finite() || det == 0.0 {
            return Err(FeatureError::MalformedInput(
                "raster transform is not invertible".into(),
            ));
        }
        if !cell_size_m.is_finite() || cell_size_m <= 0.0 {
            return Err(FeatureError::MalformedInput(format!(
                "cell size must be positive, got {cell_size_m}"
            )));
        }
        Ok(Self {
            data,
            transform,
            nodata,
            cell_size_m,
        })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn cell_size_m(&self) -> f64 {
        self.cell_size_m
    }

    /// Pixel containing the coordinate, if it lies on the tile.
    pub fn index(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        let (row, col) = self.transform.invert(lat, lon);
        if !row.is_finite() || !col.is_finite() {
            return None;
        }
        let (row, col) = (row.floor(), col.floor());
        let (height, width) = self.data.dim();
        if row < 0.0 || col < 0.0 || row >= height as f64 || col >= width as f64 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    fn is_nodata(&self, value: f64) -> bool {
        !value.is_finite() || self.nodata.map_or(false, |nd| value == nd)
    }

    /// Point sample, e.g. for soil-property rasters.
    pub fn value_at(&self, lat: f64, lon: f64) -> Option<f64> {
        let (row, col) = self.index(lat, lon)?;
        let value = self.data[[row, col]];
        (!self.is_nodata(value)).then_some(value)
    }

    /// Full 3×3 neighbourhood around the coordinate.
    ///
    /// `None` when the pixel is on the tile edge, off the tile, or any
    /// neighbour is nodata. Partial windows are never returned.
    pub fn window_3x3(&self, lat: f64, lon: f64) -> Option<ArrayView2<'_, f64>> {
        let (row, col) = self.index(lat, lon)?;
        let (height, width) = self.data.dim();
        if row < 1 || col < 1 || row + 1 >= height || col + 1 >= width {
            return None;
        }
        let window = self.data.slice(s![row - 1..row + 2, col - 1..col + 2]);
        if window.iter().any(|&v| self.is_nodata(v)) {
            return None;
        }
        Some(window)
    }
}

/// Elevation and slope for a station from the first tile with a complete window.
pub fn locate_terrain(station: &Station, tiles: &[RasterTile]) -> Option<TerrainSample> {
    for (idx, tile) in tiles.iter().enumerate() {
        let Some(window) = tile.window_3x3(station.latitude(), station.longitude()) else {
            debug!("tile {} has no complete window for {}", idx, station.id());
            continue;
        };
        match slope(window, tile.cell_size_m()) {
            Ok((elevation_m, slope_deg)) => {
                return Some(TerrainSample {
                    station_id: station.id().to_string(),
                    elevation_m,
                    slope_deg,
                });
            }
            Err(err) => warn!("tile {} rejected for {}: {}", idx, station.id(), err),
        }
    }
    None
}

/// Like [`locate_terrain`], falling back to the zeroed sentinel and counting
/// the fallback in `metrics`.
pub fn terrain_sample(
    station: &Station,
    tiles: &[RasterTile],
    metrics: &ExtractionMetrics,
) -> TerrainSample {
    locate_terrain(station, tiles).unwrap_or_else(|| {
        metrics.record_terrain_fallback();
        warn!(
            "no elevation window for {}, using zero elevation and slope",
            station.id()
        );
        TerrainSample::unavailable(station.id())
    })
}
