//! Loyalty program domain types for four-band tier programs configured per tenant.
//!
//! A tenant picks a metric (points balance or cumulative spend), up to three
//! ascending boundaries, and either a preset naming scheme or its own names.

use crate::error::{PassdeskError, PassdeskResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Tier Levels ────────────────────────────────────────────────────────────

/// One of the four ordered membership bands. Serialized as `1..=4`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum TierLevel {
    #[default]
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

impl TierLevel {
    pub const ALL: [TierLevel; 4] = [
        TierLevel::Tier1,
        TierLevel::Tier2,
        TierLevel::Tier3,
        TierLevel::Tier4,
    ];

    /// 1-based position of the tier.
    pub fn number(&self) -> u8 {
        match self {
            TierLevel::Tier1 => 1,
            TierLevel::Tier2 => 2,
            TierLevel::Tier3 => 3,
            TierLevel::Tier4 => 4,
        }
    }

    /// 0-based index into per-tier tables.
    pub fn index(&self) -> usize {
        self.number() as usize - 1
    }

    pub fn next(&self) -> Option<TierLevel> {
        match self {
            TierLevel::Tier1 => Some(TierLevel::Tier2),
            TierLevel::Tier2 => Some(TierLevel::Tier3),
            TierLevel::Tier3 => Some(TierLevel::Tier4),
            TierLevel::Tier4 => None,
        }
    }

    pub fn is_top(&self) -> bool {
        matches!(self, TierLevel::Tier4)
    }
}

impl From<TierLevel> for u8 {
    fn from(level: TierLevel) -> Self {
        level.number()
    }
}

impl TryFrom<u8> for TierLevel {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(TierLevel::Tier1),
            2 => Ok(TierLevel::Tier2),
            3 => Ok(TierLevel::Tier3),
            4 => Ok(TierLevel::Tier4),
            other => Err(format!("tier level must be 1-4, got {other}")),
        }
    }
}

impl fmt::Display for TierLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tier {}", self.number())
    }
}

// ─── Thresholds ─────────────────────────────────────────────────────────────

/// Up to three ascending boundaries splitting the metric axis into four bands.
///
/// Tier 1 is `v <= b1`, Tier 2 is `v <= b2`, Tier 3 is `v <= b3`, everything
/// above is Tier 4. An absent boundary is a band of zero width. Negative
/// boundaries are treated as absent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TierThresholds {
    #[serde(default)]
    pub tier1_max: Option<i64>,
    #[serde(default)]
    pub tier2_max: Option<i64>,
    #[serde(default)]
    pub tier3_max: Option<i64>,
}

impl TierThresholds {
    pub fn new(b1: Option<i64>, b2: Option<i64>, b3: Option<i64>) -> Self {
        Self {
            tier1_max: b1,
            tier2_max: b2,
            tier3_max: b3,
        }
    }

    /// Boundaries in ascending position order, malformed values dropped.
    pub fn boundaries(&self) -> [Option<i64>; 3] {
        [self.tier1_max, self.tier2_max, self.tier3_max].map(|b| b.filter(|v| *v >= 0))
    }

    /// The boundary that closes the band for `level`, if any.
    pub fn upper_bound(&self, level: TierLevel) -> Option<i64> {
        match level {
            TierLevel::Tier4 => None,
            other => self.boundaries()[other.index()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries().iter().all(Option::is_none)
    }

    /// Check a configuration before it is stored. The engine itself never
    /// fails on bad thresholds; this is for the write path only.
    pub fn validate(&self) -> PassdeskResult<()> {
        let raw = [self.tier1_max, self.tier2_max, self.tier3_max];
        if let Some(pos) = raw.iter().position(|b| matches!(b, Some(v) if *v < 0)) {
            return Err(PassdeskError::Validation(format!(
                "tier {} boundary must be non-negative",
                pos + 1
            )));
        }

        let mut previous: Option<i64> = None;
        for b in raw.iter().flatten() {
            if let Some(prev) = previous {
                if *b <= prev {
                    return Err(PassdeskError::Validation(format!(
                        "tier boundaries must be strictly increasing ({prev} then {b})"
                    )));
                }
            }
            previous = Some(*b);
        }
        Ok(())
    }
}

/// Which member value a program's thresholds apply to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TierMetric {
    #[default]
    Points,
    SpendCents,
}

// ─── Tier Naming ────────────────────────────────────────────────────────────

/// Built-in naming presets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TierSystemType {
    /// Bronze / Silver / Gold / Platinum.
    #[default]
    Loyalty,
    /// Insider / VIP / VIP Plus / Icon.
    Vip,
    /// No tier progression is shown.
    #[serde(other)]
    None,
}

impl TierSystemType {
    /// Preset display names, `None` for the no-progression preset.
    pub fn preset_names(&self) -> Option<[&'static str; 4]> {
        match self {
            TierSystemType::Loyalty => Some(["Bronze", "Silver", "Gold", "Platinum"]),
            TierSystemType::Vip => Some(["Insider", "VIP", "VIP Plus", "Icon"]),
            TierSystemType::None => None,
        }
    }

    pub fn shows_progress(&self) -> bool {
        !matches!(self, TierSystemType::None)
    }
}

/// Per-tenant tier names, overriding the preset where set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TierNameSet {
    #[serde(default)]
    pub tier1: Option<String>,
    #[serde(default)]
    pub tier2: Option<String>,
    #[serde(default)]
    pub tier3: Option<String>,
    #[serde(default)]
    pub tier4: Option<String>,
}

impl TierNameSet {
    /// Explicit name for `level`, ignoring blank entries.
    pub fn get(&self, level: TierLevel) -> Option<&str> {
        let name = match level {
            TierLevel::Tier1 => &self.tier1,
            TierLevel::Tier2 => &self.tier2,
            TierLevel::Tier3 => &self.tier3,
            TierLevel::Tier4 => &self.tier4,
        };
        name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

// ─── Tier Program ───────────────────────────────────────────────────────────

/// A tenant's complete tier configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TierProgram {
    #[serde(default)]
    pub metric: TierMetric,
    #[serde(default)]
    pub thresholds: TierThresholds,
    #[serde(default)]
    pub tier_system: TierSystemType,
    #[serde(default)]
    pub tier_names: Option<TierNameSet>,
    #[serde(default = "default_points_per_dollar")]
    pub points_per_dollar: u32,
}

fn default_points_per_dollar() -> u32 {
    1
}

impl Default for TierProgram {
    fn default() -> Self {
        Self {
            metric: TierMetric::Points,
            thresholds: TierThresholds::default(),
            tier_system: TierSystemType::Loyalty,
            tier_names: None,
            points_per_dollar: default_points_per_dollar(),
        }
    }
}

impl TierProgram {
    pub fn validate(&self) -> PassdeskResult<()> {
        self.thresholds.validate()?;
        if self.points_per_dollar == 0 {
            return Err(PassdeskError::Validation(
                "points_per_dollar must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Engine Outputs ─────────────────────────────────────────────────────────

/// Where a value sits within its tier band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TierProgress {
    pub level: TierLevel,
    /// Progress through the current band, always within `[0, 100]`.
    pub percent: f64,
    pub next_threshold: Option<i64>,
    pub amount_to_next: Option<i64>,
}

/// Display-ready tier summary for one member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TierBadge {
    pub level: TierLevel,
    pub name: String,
    pub next_tier_name: Option<String>,
    pub metric: TierMetric,
    pub value: i64,
    pub progress: TierProgress,
    pub show_progress: bool,
}

/// Simulated point-of-sale purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub member_id: uuid::Uuid,
    pub amount_cents: i64,
}

/// Result of applying a simulated purchase to a member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
    pub member_id: uuid::Uuid,
    pub amount_cents: i64,
    pub points_earned: i64,
    pub new_points_balance: i64,
    pub new_spend_cents: i64,
    pub previous_tier: TierLevel,
    pub tier: TierLevel,
    pub tier_changed: bool,
}
