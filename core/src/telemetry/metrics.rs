use crate::prelude::ExtractionResult;
use crate::records::feature::FusedObservation;
use serde::Serialize;
use std::sync::Mutex;

/// Run counters shared across stations extracted in parallel.
pub struct ExtractionMetrics {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub passes_usable: usize,
    pub passes_insufficient: usize,
    pub fused: usize,
    pub fused_best_quality: usize,
    pub no_data: usize,
    pub terrain_fallbacks: usize,
    pub moisture_total: f64,
}

impl MetricsSnapshot {
    pub fn mean_moisture(&self) -> Option<f64> {
        (self.fused > 0).then(|| self.moisture_total / self.fused as f64)
    }

    pub fn best_quality_pct(&self) -> Option<f64> {
        (self.fused > 0).then(|| self.fused_best_quality as f64 * 100.0 / self.fused as f64)
    }
}

impl ExtractionMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn update(&self, f: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            f(&mut metrics);
        }
    }

    pub fn record_pass(&self, result: &ExtractionResult) {
        self.update(|m| {
            if result.is_usable() {
                m.passes_usable += 1;
            } else {
                m.passes_insufficient += 1;
            }
        });
    }

    pub fn record_fused(&self, fused: Option<&FusedObservation>, best_quality: i32) {
        self.update(|m| match fused {
            Some(obs) => {
                m.fused += 1;
                m.moisture_total += obs.soil_moisture;
                if obs.quality_flag == best_quality {
                    m.fused_best_quality += 1;
                }
            }
            None => m.no_data += 1,
        });
    }

    pub fn record_terrain_fallback(&self) {
        self.update(|m| m.terrain_fallbacks += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().map(|m| *m).unwrap_or_default()
    }
}

impl Default for ExtractionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::fusion::fuse;

    #[test]
    fn counters_accumulate_pass_and_fusion_outcomes() {
        let metrics = ExtractionMetrics::new();
        let good = ExtractionResult {
            value: 0.3,
            quality_score: 100.0,
            pixel_count: 4,
            quality_flag: 0,
        };
        metrics.record_pass(&good);
        metrics.record_pass(&ExtractionResult::insufficient(1));

        let fused = fuse(0, "USGS:1", Some(&good), None);
        metrics.record_fused(fused.as_ref(), 0);
        metrics.record_fused(None, 0);
        metrics.record_terrain_fallback();

        let snap = metrics.snapshot();
        assert_eq!(snap.passes_usable, 1);
        assert_eq!(snap.passes_insufficient, 1);
        assert_eq!(snap.fused, 1);
        assert_eq!(snap.no_data, 1);
        assert_eq!(snap.terrain_fallbacks, 1);
        assert_eq!(snap.mean_moisture(), Some(0.3));
        assert_eq!(snap.best_quality_pct(), Some(100.0));
    }

    #[test]
    fn empty_snapshot_has_no_means() {
        let snap = ExtractionMetrics::default().snapshot();
        assert_eq!(snap.mean_moisture(), None);
        assert_eq!(snap.best_quality_pct(), None);
    }
}
