pub mod metrics;

pub use metrics::{ExtractionMetrics, MetricsSnapshot};
