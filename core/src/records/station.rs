use crate::prelude::{FeatureError, FeatureResult};
use serde::{Deserialize, Serialize};

/// Ground station referenced by every extraction.
///
/// Identifiers take the form `SOURCE:SITE_ID`, e.g. `USGS:06730200`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StationEntry", into = "StationEntry")]
pub struct Station {
    id: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StationEntry {
    id: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<StationEntry> for Station {
    type Error = FeatureError;

    fn try_from(entry: StationEntry) -> FeatureResult<Self> {
        Station::new(entry.id, entry.latitude, entry.longitude)
    }
}

impl From<Station> for StationEntry {
    fn from(station: Station) -> Self {
        Self {
            id: station.id,
            latitude: station.latitude,
            longitude: station.longitude,
        }
    }
}

impl Station {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> FeatureResult<Self> {
        let id = id.into();
        match id.split_once(':') {
            Some((source, site)) if !source.is_empty() && !site.is_empty() && !site.contains(':') => {}
            _ => {
                return Err(FeatureError::InvalidStation(format!(
                    "identifier {id:?} is not SOURCE:SITE_ID"
                )))
            }
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(FeatureError::InvalidStation(format!(
                "{id} has coordinates out of range ({latitude}, {longitude})"
            )));
        }
        Ok(Self {
            id,
            latitude,
            longitude,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Agency prefix of the identifier, e.g. `USGS`.
    pub fn source(&self) -> &str {
        self.id.split_once(':').map(|(s, _)| s).unwrap_or_default()
    }

    pub fn site_id(&self) -> &str {
        self.id.split_once(':').map(|(_, s)| s).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_splits_identifier() {
        let station = Station::new("USGS:06730200", 40.05, -105.18).unwrap();
        assert_eq!(station.source(), "USGS");
        assert_eq!(station.site_id(), "06730200");
        assert_eq!(station.latitude(), 40.05);
    }

    #[test]
    fn malformed_identifiers_are_rejected() {
        for id in ["USGS06730200", ":123", "DWR:", "A:B:C"] {
            assert!(Station::new(id, 0.0, 0.0).is_err(), "{id} accepted");
        }
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(Station::new("DWR:BOCOROCO", 91.0, 0.0).is_err());
        assert!(Station::new("DWR:BOCOROCO", 0.0, -181.0).is_err());
        assert!(Station::new("DWR:BOCOROCO", f64::NAN, 0.0).is_err());
    }

    #[test]
    fn deserialization_goes_through_validation() {
        let ok: Station =
            serde_json::from_str(r#"{"id":"DWR:BOCOROCO","latitude":40.0,"longitude":-105.2}"#)
                .unwrap();
        assert_eq!(ok.id(), "DWR:BOCOROCO");
        let bad =
            serde_json::from_str::<Station>(r#"{"id":"nocolon","latitude":40.0,"longitude":0.0}"#);
        assert!(bad.is_err());
    }
}
