use crate::loyalty::{TierLevel, TierProgram};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ─── Enrollment Sources ─────────────────────────────────────────────────────

/// Well-known enrollment source labels. Sources are free text on the wire;
/// these are the channels the dashboard reports individually.
pub mod source {
    pub const CSV: &str = "CSV";
    pub const SMARTPASS: &str = "SMARTPASS";
    pub const CLAIM_CODE: &str = "CLAIM_CODE";
}

// ─── Pass Lifecycle ─────────────────────────────────────────────────────────

/// Wallet pass lifecycle status as reported by the wallet provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassStatus {
    Installed,
    Uninstalled,
    #[default]
    #[serde(other)]
    Unknown,
}

/// The minimal view of a member the analytics aggregator consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberRecord {
    pub source: String,
    pub status: PassStatus,
}

impl MemberRecord {
    pub fn new(source: impl Into<String>, status: PassStatus) -> Self {
        Self {
            source: source.into(),
            status,
        }
    }
}

// ─── Members ────────────────────────────────────────────────────────────────

/// A loyalty member owned by exactly one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub external_pass_id: Option<String>,
    pub source: String,
    pub status: PassStatus,
    pub points_balance: i64,
    pub spend_cents: i64,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn record(&self) -> MemberRecord {
        MemberRecord::new(self.source.clone(), self.status)
    }
}

/// Request to enroll a member after a pass has been issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollMemberRequest {
    #[serde(default)]
    pub external_pass_id: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub status: PassStatus,
    #[serde(default)]
    pub points_balance: i64,
    #[serde(default)]
    pub spend_cents: i64,
}

/// Pre-parsed rows from a CSV member import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEnrollRequest {
    pub members: Vec<EnrollMemberRequest>,
}

/// Install / uninstall notification forwarded from the wallet provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletEvent {
    pub external_pass_id: String,
    pub event: WalletEventKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WalletEventKind {
    Installed,
    Uninstalled,
}

impl WalletEventKind {
    pub fn status(&self) -> PassStatus {
        match self {
            WalletEventKind::Installed => PassStatus::Installed,
            WalletEventKind::Uninstalled => PassStatus::Uninstalled,
        }
    }
}

// ─── Analytics ──────────────────────────────────────────────────────────────

/// Counts for one enrollment bucket.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceCounts {
    pub total: u64,
    pub active: u64,
    pub churned: u64,
    pub retention_rate: u32,
}

impl SourceCounts {
    /// Members that are neither active nor churned.
    pub fn other(&self) -> u64 {
        self.total
            .saturating_sub(self.active)
            .saturating_sub(self.churned)
    }
}

/// Fixed-shape view over the three channels the dashboard always shows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KnownSources {
    pub csv: SourceCounts,
    pub smartpass: SourceCounts,
    pub claim_code: SourceCounts,
}

/// Enrollment analytics for a snapshot of members.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub totals: SourceCounts,
    pub by_source: BTreeMap<String, SourceCounts>,
    pub sources: KnownSources,
}

/// Member count per tier level.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TierDistribution {
    pub tier1: u64,
    pub tier2: u64,
    pub tier3: u64,
    pub tier4: u64,
}

impl TierDistribution {
    pub fn increment(&mut self, level: TierLevel) {
        match level {
            TierLevel::Tier1 => self.tier1 += 1,
            TierLevel::Tier2 => self.tier2 += 1,
            TierLevel::Tier3 => self.tier3 += 1,
            TierLevel::Tier4 => self.tier4 += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.tier1 + self.tier2 + self.tier3 + self.tier4
    }
}

// ─── Tenants ────────────────────────────────────────────────────────────────

/// A business customer running one loyalty program.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub program: TierProgram,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub name: String,
    #[serde(default)]
    pub program: Option<TierProgram>,
}

/// Returned once at provisioning; the only time the key is shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantResponse {
    pub tenant: Tenant,
    pub api_key: String,
}

/// Authenticated caller identity, passed explicitly into every
/// tenant-scoped operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub request_id: Uuid,
}
