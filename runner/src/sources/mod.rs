use anyhow::{bail, Context};
use chrono::NaiveDate;
use featcore::records::GriddedObservation;
use featcore::Pass;
use ndarray::Array2;

pub mod grid_file;
pub mod synthetic;
pub mod tile_file;

pub use grid_file::JsonGridSource;
pub use synthetic::SyntheticGridSource;

/// Supplies one gridded observation per day and pass.
///
/// `Ok(None)` means the pass was not acquired that day.
pub trait GridSource {
    fn load_pass(&self, day: NaiveDate, pass: Pass) -> anyhow::Result<Option<GriddedObservation>>;
}

/// Converts nested rows into a 2-D array, rejecting ragged input.
pub(crate) fn rows_to_array<T: Clone>(rows: Vec<Vec<T>>, field: &str) -> anyhow::Result<Array2<T>> {
    let height = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    if let Some(idx) = rows.iter().position(|row| row.len() != width) {
        bail!(
            "{} row {} has {} columns, expected {}",
            field,
            idx,
            rows[idx].len(),
            width
        );
    }
    let flat: Vec<T> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((height, width), flat)
        .with_context(|| format!("reshaping {} into {}x{}", field, height, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_to_array_keeps_row_major_layout() {
        let array = rows_to_array(vec![vec![1, 2, 3], vec![4, 5, 6]], "quality").unwrap();
        assert_eq!(array.dim(), (2, 3));
        assert_eq!(array[[1, 0]], 4);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = rows_to_array(vec![vec![1.0, 2.0], vec![3.0]], "values").unwrap_err();
        assert!(err.to_string().contains("values row 1"));
    }
}
