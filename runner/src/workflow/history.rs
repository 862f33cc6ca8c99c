use featcore::math::stats::trailing_delta;
use std::collections::{HashMap, VecDeque};

const TREND_WINDOW: usize = 3;

/// Most recent fused values per station, used for the 3-sample trend.
#[derive(Debug, Default)]
pub struct StationHistory {
    recent: HashMap<String, VecDeque<f64>>,
}

impl StationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trend of `value` against prior samples, then records `value`.
    pub fn observe(&mut self, station_id: &str, value: f64) -> Option<f64> {
        let recent = self.recent.entry(station_id.to_string()).or_default();
        let trend = trailing_delta(recent.make_contiguous(), value);
        recent.push_back(value);
        while recent.len() > TREND_WINDOW {
            recent.pop_front();
        }
        trend
    }

    /// Stations with at least one recorded value.
    pub fn station_count(&self) -> usize {
        self.recent.len()
    }
}
