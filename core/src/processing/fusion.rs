use crate::prelude::ExtractionResult;
use crate::records::feature::{FusedObservation, PassUsed, ProductSource};
use std::cmp::Ordering;

/// Merges the morning and evening results for one station and day.
///
/// A lower quality code wins outright; equal codes average both values and
/// keep the shared code. Results with a NaN value count as missing.
pub fn fuse(
    timestamp: i64,
    station_id: &str,
    am: Option<&ExtractionResult>,
    pm: Option<&ExtractionResult>,
) -> Option<FusedObservation> {
    let am = am.filter(|r| r.is_usable());
    let pm = pm.filter(|r| r.is_usable());

    let (soil_moisture, quality_flag, pass_used) = match (am, pm) {
        (None, None) => return None,
        (Some(am), None) => (am.value, am.quality_flag, PassUsed::Am),
        (None, Some(pm)) => (pm.value, pm.quality_flag, PassUsed::Pm),
        (Some(am), Some(pm)) => match am.quality_flag.cmp(&pm.quality_flag) {
            Ordering::Less => (am.value, am.quality_flag, PassUsed::Am),
            Ordering::Greater => (pm.value, pm.quality_flag, PassUsed::Pm),
            Ordering::Equal => (
                (am.value + pm.value) / 2.0,
                am.quality_flag,
                PassUsed::Averaged,
            ),
        },
    };

    Some(FusedObservation {
        timestamp,
        station_id: station_id.to_string(),
        soil_moisture,
        quality_flag,
        pass_used,
        trend3: None,
        source: ProductSource::Baseline,
    })
}

/// Chooses between the baseline and alternate product for one station/day.
///
/// The alternate product is preferred when it carries the best code; a
/// best-quality baseline beats a degraded alternate; otherwise the alternate
/// is kept despite its quality.
pub fn select_source(
    baseline: Option<FusedObservation>,
    alternate: Option<FusedObservation>,
    best_quality: i32,
) -> Option<FusedObservation> {
    let baseline = baseline.map(|obs| obs.with_source(ProductSource::Baseline));
    let alternate = alternate.map(|obs| obs.with_source(ProductSource::Alternate));

    match (baseline, alternate) {
        (_, Some(alt)) if alt.quality_flag == best_quality => Some(alt),
        (Some(base), _) if base.quality_flag == best_quality => Some(base),
        (base, alt) => alt.or(base),
    }
}
