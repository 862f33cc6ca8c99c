use crate::prelude::{FeatureError, FeatureResult};
use ndarray::{Array2, ArrayView2, Zip};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two points given in degrees.
#[inline]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let half_dlat = (phi2 - phi1) / 2.0;
    let half_dlon = (lon2.to_radians() - lon1.to_radians()) / 2.0;

    let a = half_dlat.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlon.sin().powi(2);
    // Rounding can push `a` just past 1 near antipodes.
    let a = a.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Distance from a single target to every cell of a coordinate grid.
pub fn distance_grid(
    target_lat: f64,
    target_lon: f64,
    lat: ArrayView2<f64>,
    lon: ArrayView2<f64>,
) -> FeatureResult<Array2<f64>> {
    if lat.dim() != lon.dim() {
        return Err(FeatureError::ShapeMismatch {
            field: "longitude",
            expected: lat.dim(),
            found: lon.dim(),
        });
    }

    Ok(Zip::from(&lat)
        .and(&lon)
        .map_collect(|&cell_lat, &cell_lon| {
            haversine_km(target_lat, target_lon, cell_lat, cell_lon)
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_km(40.0, -105.0, 40.0, -105.0), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = haversine_km(39.74, -104.99, 40.01, -105.27);
        let ba = haversine_km(40.01, -105.27, 39.74, -104.99);
        assert_abs_diff_eq!(ab, ba, epsilon = 1e-12);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert_abs_diff_eq!(d, 111.195, epsilon = 1e-3);
    }

    #[test]
    fn antipodal_points_stay_finite() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert_abs_diff_eq!(d, std::f64::consts::PI * EARTH_RADIUS_KM, epsilon = 1e-6);

        let near = haversine_km(45.0, 10.0, -45.0, -170.0);
        assert!(near.is_finite());
    }

    #[test]
    fn grid_matches_scalar_form() {
        let lat = array![[40.0, 40.1], [40.2, 40.3]];
        let lon = array![[-105.0, -105.1], [-105.2, -105.3]];
        let grid = distance_grid(40.0, -105.0, lat.view(), lon.view()).unwrap();

        assert_eq!(grid.dim(), (2, 2));
        assert_eq!(grid[[0, 0]], 0.0);
        assert_abs_diff_eq!(
            grid[[1, 1]],
            haversine_km(40.0, -105.0, 40.3, -105.3),
            epsilon = 1e-12
        );
    }

    #[test]
    fn grid_rejects_mismatched_coordinates() {
        let lat = array![[40.0, 40.1]];
        let lon = array![[-105.0], [-105.1]];
        let err = distance_grid(40.0, -105.0, lat.view(), lon.view()).unwrap_err();
        assert!(matches!(err, FeatureError::ShapeMismatch { .. }));
    }
}
