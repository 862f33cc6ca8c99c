use crate::prelude::{ExtractionResult, MIN_USABLE_CELLS};

/// Offset added to distances so a cell coincident with the target keeps a finite weight.
pub const DISTANCE_WEIGHT_OFFSET_KM: f64 = 0.1;

/// Weight multiplier applied to cells that are not at the best quality code.
pub const DEGRADED_QUALITY_WEIGHT: f64 = 0.5;

/// Running sums for distance- and quality-weighted averaging.
///
/// Cells are pushed one at a time, so the same accumulator serves both the
/// whole-grid pass and the chunked stream. Feeding cells in the same order
/// yields bit-identical results.
#[derive(Debug, Clone)]
pub struct WeightedAccumulator {
    best_quality: i32,
    weighted_sum: f64,
    weight_sum: f64,
    distance_weight_sum: f64,
    best_distance_weight_sum: f64,
    distance_total: f64,
    count: usize,
    dominant: Option<(f64, i32)>,
}

impl WeightedAccumulator {
    pub fn new(best_quality: i32) -> Self {
        Self {
            best_quality,
            weighted_sum: 0.0,
            weight_sum: 0.0,
            distance_weight_sum: 0.0,
            best_distance_weight_sum: 0.0,
            distance_total: 0.0,
            count: 0,
            dominant: None,
        }
    }

    /// Adds one usable cell at `distance_km` from the target.
    pub fn push(&mut self, value: f64, quality: i32, distance_km: f64) {
        let distance_weight = 1.0 / (distance_km + DISTANCE_WEIGHT_OFFSET_KM);
        let is_best = quality == self.best_quality;
        let quality_weight = if is_best { 1.0 } else { DEGRADED_QUALITY_WEIGHT };
        let weight = distance_weight * quality_weight;

        self.weighted_sum += weight * value;
        self.weight_sum += weight;
        self.distance_weight_sum += distance_weight;
        if is_best {
            self.best_distance_weight_sum += distance_weight;
        }
        self.distance_total += distance_km;
        self.count += 1;

        let replace = match self.dominant {
            None => true,
            Some((w, code)) => distance_weight > w || (distance_weight == w && quality < code),
        };
        if replace {
            self.dominant = Some((distance_weight, quality));
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean_distance_km(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.distance_total / self.count as f64
    }

    /// Collapses the sums into a result, enforcing the minimum sample floor.
    pub fn finish(&self) -> ExtractionResult {
        if self.count < MIN_USABLE_CELLS || self.weight_sum <= 0.0 {
            return ExtractionResult::insufficient(self.count);
        }

        let quality_flag = self.dominant.map(|(_, code)| code).unwrap_or(i32::MAX);
        ExtractionResult {
            value: self.weighted_sum / self.weight_sum,
            quality_score: 100.0 * self.best_distance_weight_sum / self.distance_weight_sum,
            pixel_count: self.count,
            quality_flag,
        }
    }
}

/// Difference between `current` and the mean of up to three preceding values.
///
/// `history` is ordered oldest first; `None` when there is no history.
pub fn trailing_delta(history: &[f64], current: f64) -> Option<f64> {
    let recent: Vec<f64> = history
        .iter()
        .rev()
        .filter(|v| v.is_finite())
        .take(3)
        .copied()
        .collect();
    if recent.is_empty() {
        return None;
    }
    let mean = recent.iter().sum::<f64>() / recent.len() as f64;
    Some(current - mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fewer_than_three_cells_is_insufficient() {
        let mut acc = WeightedAccumulator::new(0);
        acc.push(0.3, 0, 1.0);
        acc.push(0.3, 0, 2.0);
        let result = acc.finish();
        assert!(!result.is_usable());
        assert_eq!(result.pixel_count, 2);
    }

    #[test]
    fn coincident_cell_dominates_weighting() {
        let mut acc = WeightedAccumulator::new(0);
        acc.push(0.40, 0, 0.0);
        acc.push(0.10, 0, 10.0);
        acc.push(0.10, 0, 10.0);
        let result = acc.finish();

        // weights: 10.0, 1/10.1, 1/10.1
        let w_far = 1.0 / 10.1;
        let expected = (10.0 * 0.40 + 2.0 * w_far * 0.10) / (10.0 + 2.0 * w_far);
        assert_abs_diff_eq!(result.value, expected, epsilon = 1e-12);
        assert_eq!(result.quality_score, 100.0);
        assert_eq!(result.quality_flag, 0);
    }

    #[test]
    fn degraded_quality_halves_weight_and_score_uses_distance_only() {
        let mut acc = WeightedAccumulator::new(0);
        acc.push(0.2, 0, 0.9);
        acc.push(0.4, 1, 0.9);
        acc.push(0.4, 1, 0.9);
        let result = acc.finish();

        // equal distance weights; quality weights 1, 0.5, 0.5
        assert_abs_diff_eq!(result.value, (0.2 + 0.2 + 0.2) / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.quality_score, 100.0 / 3.0, epsilon = 1e-9);
        // tie on distance resolves to the better code
        assert_eq!(result.quality_flag, 0);
    }

    #[test]
    fn mean_distance_tracks_pushed_cells() {
        let mut acc = WeightedAccumulator::new(0);
        assert_eq!(acc.mean_distance_km(), 0.0);
        acc.push(0.1, 0, 2.0);
        acc.push(0.1, 0, 4.0);
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.mean_distance_km(), 3.0);
    }

    #[test]
    fn trailing_delta_uses_last_three_values() {
        assert_eq!(trailing_delta(&[], 0.3), None);
        let delta = trailing_delta(&[0.9, 0.1, 0.2, 0.3], 0.4).unwrap();
        assert_abs_diff_eq!(delta, 0.2, epsilon = 1e-12);
        let short = trailing_delta(&[0.2], 0.25).unwrap();
        assert_abs_diff_eq!(short, 0.05, epsilon = 1e-12);
    }
}
