use crate::processing::terrain::RasterTile;
use crate::records::feature::SoilSample;
use crate::records::station::Station;
use log::debug;

/// Point-sampled soil-property rasters. Any layer may be missing.
#[derive(Debug, Clone, Default)]
pub struct SoilRasters {
    /// Dominant soil unit code.
    pub soil_class: Option<RasterTile>,
    /// Texture class code.
    pub texture_class: Option<RasterTile>,
    /// Clay content in percent.
    pub clay_pct: Option<RasterTile>,
    /// Topsoil pH.
    pub ph: Option<RasterTile>,
    /// Available water capacity class.
    pub available_water: Option<RasterTile>,
}

impl SoilRasters {
    pub fn is_empty(&self) -> bool {
        self.soil_class.is_none()
            && self.texture_class.is_none()
            && self.clay_pct.is_none()
            && self.ph.is_none()
            && self.available_water.is_none()
    }
}

/// Organic carbon (%) estimated from pH; neutral and alkaline soils give 0.
pub fn organic_carbon_from_ph(ph: f64) -> f64 {
    ((7.0 - ph) * 2.0).max(0.0)
}

/// Sand (%) left over once clay and the water-holding share are removed.
pub fn sand_from_awc(clay_pct: f64, awc: f64) -> f64 {
    (100.0 - clay_pct - awc * 10.0).max(0.0)
}

// Zero and negative cells are treated as missing.
fn positive_at(layer: Option<&RasterTile>, station: &Station) -> Option<f64> {
    layer?
        .value_at(station.latitude(), station.longitude())
        .filter(|value| *value > 0.0)
}

fn class_label(code: f64) -> String {
    format!("Class_{}", code.trunc() as i64)
}

/// Soil properties under a station, keeping defaults for missing layers.
pub fn soil_sample(station: &Station, rasters: &SoilRasters) -> SoilSample {
    let mut sample = SoilSample::unavailable(station.id());

    if let Some(code) = positive_at(rasters.soil_class.as_ref(), station) {
        sample.soil_type = class_label(code);
    }
    if let Some(code) = positive_at(rasters.texture_class.as_ref(), station) {
        sample.soil_texture = class_label(code);
    }
    if let Some(clay) = positive_at(rasters.clay_pct.as_ref(), station) {
        sample.clay_pct = clay;
    }
    if let Some(ph) = positive_at(rasters.ph.as_ref(), station) {
        sample.organic_carbon_pct = organic_carbon_from_ph(ph);
    }
    if let Some(awc) = positive_at(rasters.available_water.as_ref(), station) {
        sample.sand_pct = sand_from_awc(sample.clay_pct, awc);
    }

    debug!(
        "{}: soil {} / {}, clay {:.1}%, sand {:.1}%, organic carbon {:.1}%",
        station.id(),
        sample.soil_type,
        sample.soil_texture,
        sample.clay_pct,
        sample.sand_pct,
        sample.organic_carbon_pct
    );
    sample
}
