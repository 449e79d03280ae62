//! Pure tier math: classification, band progress and display names.
//!
//! Every function here is total. Negative metric values count as zero and
//! malformed boundaries count as absent, so a bad configuration yields an odd
//! badge rather than an error.

use passdesk_core::loyalty::{TierLevel, TierNameSet, TierProgress, TierSystemType, TierThresholds};

/// Fallback label when neither the tenant nor a preset names a tier.
pub const DEFAULT_TIER_NAME: &str = "Member";

/// Place `value` in one of the four tier bands.
///
/// Boundaries are inclusive. An absent boundary is skipped (zero-width band),
/// and with no boundaries at all every value lands in Tier 1.
pub fn classify(value: i64, thresholds: &TierThresholds) -> TierLevel {
    let value = value.max(0);
    let bounds = thresholds.boundaries();
    if bounds.iter().all(Option::is_none) {
        return TierLevel::Tier1;
    }

    bounds
        .iter()
        .zip(TierLevel::ALL)
        .find_map(|(bound, level)| match bound {
            Some(b) if value <= *b => Some(level),
            _ => None,
        })
        .unwrap_or(TierLevel::Tier4)
}

/// Tier plus progress through the current band toward the next one.
pub fn progress(value: i64, thresholds: &TierThresholds) -> TierProgress {
    let value = value.max(0);
    let level = classify(value, thresholds);
    let complete = TierProgress {
        level,
        percent: 100.0,
        next_threshold: None,
        amount_to_next: None,
    };

    let Some(upper) = thresholds.upper_bound(level) else {
        return complete;
    };

    let bounds = thresholds.boundaries();
    let lower = bounds[..level.index()]
        .iter()
        .flatten()
        .last()
        .copied()
        .unwrap_or(0);

    let percent = if upper <= lower {
        100.0
    } else {
        ((value - lower) as f64 / (upper - lower) as f64 * 100.0).clamp(0.0, 100.0)
    };

    TierProgress {
        level,
        percent,
        next_threshold: Some(upper),
        amount_to_next: Some(upper - value).filter(|n| *n > 0),
    }
}

/// Display name for `level`: tenant override, then preset, then "Member".
pub fn resolve_name(
    level: TierLevel,
    names: Option<&TierNameSet>,
    system: TierSystemType,
) -> String {
    if let Some(name) = names.and_then(|n| n.get(level)) {
        return name.to_string();
    }
    system
        .preset_names()
        .map(|preset| preset[level.index()])
        .unwrap_or(DEFAULT_TIER_NAME)
        .to_string()
}
