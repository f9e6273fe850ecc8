//! Weighted infrastructure health scoring.
//!
//! Each recorded device category contributes a unit score derived from its
//! sanity rating, multiplied by its clamped weight. The aggregate is the
//! weighted mean expressed as a whole percentage. A client with no recorded
//! categories has no score at all, which is distinct from a score of zero.

use crate::domain::{SanityLevel, SanityRecord};

/// Smallest weight a category can carry.
pub const MIN_WEIGHT: f64 = 1.0;
/// Largest weight a category can carry.
pub const MAX_WEIGHT: f64 = 10.0;
/// Placeholder shown when a client has no score.
pub const NO_DATA: &str = "—";

/// Map a rating to a unit score in `[0.0, 1.0]`. A missing rating counts as a warning.
pub fn rating_to_unit_score(rating: Option<SanityLevel>) -> f64 {
    match rating {
        Some(SanityLevel::Good) => 1.0,
        Some(SanityLevel::Warning) | None => 0.5,
        Some(SanityLevel::Critical) => 0.0,
    }
}

/// Clamp a weight into `[1, 10]`, treating a missing (or NaN) weight as 1.
///
/// Fractional weights are not rounded.
pub fn clamp_weight(weight: Option<f64>) -> f64 {
    match weight {
        Some(value) if !value.is_nan() => value.clamp(MIN_WEIGHT, MAX_WEIGHT),
        _ => MIN_WEIGHT,
    }
}

/// Compute the weighted health percentage for a set of recorded categories.
///
/// Returns `None` when no records are given. Halves round away from zero.
pub fn infra_percent<'a, I>(records: I) -> Option<u8>
where
    I: IntoIterator<Item = &'a SanityRecord>,
{
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for record in records {
        let weight = clamp_weight(record.weight);
        weighted_sum += rating_to_unit_score(record.rating) * weight;
        total_weight += weight;
    }
    if total_weight == 0.0 {
        return None;
    }
    let percent = ((weighted_sum / total_weight) * 100.0).round();
    Some(percent.clamp(0.0, 100.0) as u8)
}

/// Render a percentage for display, using an em dash when there is no data.
pub fn format_percent(percent: Option<u8>) -> String {
    match percent {
        Some(value) => format!("{value}%"),
        None => NO_DATA.to_string(),
    }
}
