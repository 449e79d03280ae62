//! Tier engine for tenant loyalty programs.

pub mod engine;
pub mod tiers;

pub use engine::TierEngine;
pub use tiers::{classify, progress, resolve_name, DEFAULT_TIER_NAME};
