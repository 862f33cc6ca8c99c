use crate::prelude::{FeatureError, FeatureResult, Pass, ValueDomain};
use ndarray::{Array2, ArrayView2};

/// One pass of a gridded product with its quality and coordinate grids.
///
/// All four arrays are guaranteed to share one shape.
#[derive(Debug, Clone)]
pub struct GriddedObservation {
    values: Array2<f64>,
    quality: Array2<i32>,
    latitude: Array2<f64>,
    longitude: Array2<f64>,
    pass: Pass,
    domain: ValueDomain,
}

/// A single grid cell in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub value: f64,
    pub quality: i32,
    pub latitude: f64,
    pub longitude: f64,
}

impl GriddedObservation {
    pub fn new(
        values: Array2<f64>,
        quality: Array2<i32>,
        latitude: Array2<f64>,
        longitude: Array2<f64>,
        pass: Pass,
        domain: ValueDomain,
    ) -> FeatureResult<Self> {
        let expected = values.dim();
        for (field, found) in [
            ("quality", quality.dim()),
            ("latitude", latitude.dim()),
            ("longitude", longitude.dim()),
        ] {
            if found != expected {
                return Err(FeatureError::ShapeMismatch {
                    field,
                    expected,
                    found,
                });
            }
        }

        Ok(Self {
            values,
            quality,
            latitude,
            longitude,
            pass,
            domain,
        })
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn quality(&self) -> ArrayView2<'_, i32> {
        self.quality.view()
    }

    pub fn latitude(&self) -> ArrayView2<'_, f64> {
        self.latitude.view()
    }

    pub fn longitude(&self) -> ArrayView2<'_, f64> {
        self.longitude.view()
    }

    pub fn pass(&self) -> Pass {
        self.pass
    }

    pub fn domain(&self) -> ValueDomain {
        self.domain
    }

    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cells of the flattened grid in logical row-major order.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.values
            .iter()
            .zip(self.quality.iter())
            .zip(self.latitude.iter().zip(self.longitude.iter()))
            .map(|((&value, &quality), (&latitude, &longitude))| GridCell {
                value,
                quality,
                latitude,
                longitude,
            })
    }

    /// Number of cells that are inside the product's valid domain.
    pub fn valid_count(&self) -> usize {
        let domain = self.domain;
        self.values.iter().filter(|&&v| domain.accepts(v)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn coords() -> (Array2<f64>, Array2<f64>) {
        (
            array![[40.0, 40.0], [40.1, 40.1]],
            array![[-105.0, -104.9], [-105.0, -104.9]],
        )
    }

    #[test]
    fn mismatched_quality_shape_is_rejected() {
        let (lat, lon) = coords();
        let err = GriddedObservation::new(
            array![[0.1, 0.2], [0.3, 0.4]],
            array![[0, 0, 0]],
            lat,
            lon,
            Pass::Am,
            ValueDomain::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FeatureError::ShapeMismatch {
                field: "quality",
                expected: (2, 2),
                found: (1, 3),
            }
        );
    }

    #[test]
    fn cells_follow_row_major_order() {
        let (lat, lon) = coords();
        let grid = GriddedObservation::new(
            array![[0.1, 0.2], [0.3, -9999.0]],
            array![[0, 1], [0, 0]],
            lat,
            lon,
            Pass::Pm,
            ValueDomain::default(),
        )
        .unwrap();

        let cells: Vec<GridCell> = grid.cells().collect();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[1].value, 0.2);
        assert_eq!(cells[1].quality, 1);
        assert_eq!(cells[2].latitude, 40.1);
        assert_eq!(grid.valid_count(), 3);
        assert_eq!(grid.pass(), Pass::Pm);
    }
}
