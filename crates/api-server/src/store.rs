//! In-memory tenant and member store backed by DashMap.
//!
//! Stands in for the relational store the dashboard uses in production. Every
//! member operation is scoped by tenant id; a member owned by another tenant
//! is reported as not found.

use chrono::Utc;
use dashmap::DashMap;
use passdesk_core::error::{PassdeskError, PassdeskResult};
use passdesk_core::loyalty::{TierProgram, TierThresholds, TransactionOutcome};
use passdesk_core::types::*;
use passdesk_loyalty::TierEngine;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// One rejected row of a bulk import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEnrollOutcome {
    pub enrolled: usize,
    pub errors: Vec<RowError>,
}

/// Thread-safe in-memory store for tenants, their API keys and members.
pub struct PassdeskStore {
    tenants: DashMap<Uuid, Tenant>,
    api_keys: DashMap<String, Uuid>,
    members: DashMap<Uuid, Member>,
    /// (tenant, external pass id) → member id, for wallet webhooks.
    passes: DashMap<(Uuid, String), Uuid>,
}

impl Default for PassdeskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PassdeskStore {
    pub fn new() -> Self {
        info!("Passdesk store initialized (in-memory)");
        Self {
            tenants: DashMap::new(),
            api_keys: DashMap::new(),
            members: DashMap::new(),
            passes: DashMap::new(),
        }
    }

    // ─── Tenants ───────────────────────────────────────────────────────────

    /// Provision a tenant and issue its API key.
    pub fn create_tenant(
        &self,
        req: CreateTenantRequest,
        default_program: TierProgram,
    ) -> PassdeskResult<(Tenant, String)> {
        let api_key = format!("pdk_{}", Uuid::new_v4().simple());
        let tenant = self.insert_tenant(req, default_program, api_key.clone())?;
        Ok((tenant, api_key))
    }

    fn insert_tenant(
        &self,
        req: CreateTenantRequest,
        default_program: TierProgram,
        api_key: String,
    ) -> PassdeskResult<Tenant> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(PassdeskError::Validation("tenant name must not be empty".to_string()));
        }
        let program = req.program.unwrap_or(default_program);
        program.validate()?;

        let slug = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>();

        let now = Utc::now();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name,
            slug,
            api_key: api_key.clone(),
            program,
            created_at: now,
            updated_at: now,
        };

        self.api_keys.insert(api_key, tenant.id);
        self.tenants.insert(tenant.id, tenant.clone());
        metrics::counter!("store.tenants.created").increment(1);
        info!(tenant_id = %tenant.id, tenant_name = %tenant.name, "Tenant created");
        Ok(tenant)
    }

    pub fn tenant_for_key(&self, api_key: &str) -> Option<Uuid> {
        self.api_keys.get(api_key).map(|r| *r.value())
    }

    pub fn get_tenant(&self, tenant_id: Uuid) -> PassdeskResult<Tenant> {
        self.tenants
            .get(&tenant_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| PassdeskError::NotFound(format!("tenant {tenant_id}")))
    }

    pub fn program(&self, tenant_id: Uuid) -> PassdeskResult<TierProgram> {
        self.get_tenant(tenant_id).map(|t| t.program)
    }

    pub fn update_program(&self, tenant_id: Uuid, program: TierProgram) -> PassdeskResult<TierProgram> {
        program.validate()?;
        let mut entry = self
            .tenants
            .get_mut(&tenant_id)
            .ok_or_else(|| PassdeskError::NotFound(format!("tenant {tenant_id}")))?;
        entry.program = program.clone();
        entry.updated_at = Utc::now();
        info!(tenant_id = %tenant_id, thresholds = ?program.thresholds, "Tier program updated");
        Ok(program)
    }

    // ─── Members ───────────────────────────────────────────────────────────

    /// Record a member whose pass has just been issued.
    pub fn enroll_member(&self, tenant_id: Uuid, req: EnrollMemberRequest) -> PassdeskResult<Member> {
        self.get_tenant(tenant_id)?;

        let source = req.source.trim().to_string();
        if source.is_empty() {
            return Err(PassdeskError::Validation("enrollment source must not be empty".to_string()));
        }
        let pass_id = req
            .external_pass_id
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let now = Utc::now();
        let member = Member {
            id: Uuid::new_v4(),
            tenant_id,
            external_pass_id: pass_id.clone(),
            source,
            status: req.status,
            points_balance: req.points_balance.max(0),
            spend_cents: req.spend_cents.max(0),
            enrolled_at: now,
            updated_at: now,
        };

        if let Some(pass_id) = pass_id {
            match self.passes.entry((tenant_id, pass_id)) {
                dashmap::mapref::entry::Entry::Occupied(e) => {
                    return Err(PassdeskError::Validation(format!(
                        "pass {} is already enrolled",
                        e.key().1
                    )));
                }
                dashmap::mapref::entry::Entry::Vacant(e) => {
                    e.insert(member.id);
                }
            }
        }

        self.members.insert(member.id, member.clone());
        metrics::counter!("store.members.enrolled", "source" => member.source.clone()).increment(1);
        Ok(member)
    }

    /// Import pre-parsed CSV rows. Every row is enrolled with source `CSV`;
    /// bad rows are reported and skipped.
    pub fn enroll_bulk(&self, tenant_id: Uuid, rows: Vec<EnrollMemberRequest>) -> PassdeskResult<BulkEnrollOutcome> {
        self.get_tenant(tenant_id)?;

        let mut outcome = BulkEnrollOutcome {
            enrolled: 0,
            errors: Vec::new(),
        };
        for (row, mut req) in rows.into_iter().enumerate() {
            req.source = source::CSV.to_string();
            match self.enroll_member(tenant_id, req) {
                Ok(_) => outcome.enrolled += 1,
                Err(e) => outcome.errors.push(RowError {
                    row,
                    message: e.to_string(),
                }),
            }
        }

        if !outcome.errors.is_empty() {
            warn!(tenant_id = %tenant_id, rejected = outcome.errors.len(), "Bulk import rejected rows");
        }
        info!(tenant_id = %tenant_id, enrolled = outcome.enrolled, "Bulk import complete");
        Ok(outcome)
    }

    pub fn list_members(&self, tenant_id: Uuid) -> Vec<Member> {
        let mut members: Vec<Member> = self
            .members
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
            .collect();
        members.sort_by(|a, b| b.enrolled_at.cmp(&a.enrolled_at));
        members
    }

    pub fn get_member(&self, tenant_id: Uuid, member_id: Uuid) -> PassdeskResult<Member> {
        self.members
            .get(&member_id)
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| PassdeskError::NotFound(format!("member {member_id}")))
    }

    /// Run a simulated purchase against a member under the entry lock.
    pub fn apply_transaction(
        &self,
        tenant_id: Uuid,
        member_id: Uuid,
        amount_cents: i64,
        engine: &TierEngine,
    ) -> PassdeskResult<TransactionOutcome> {
        let program = self.program(tenant_id)?;
        let mut entry = self
            .members
            .get_mut(&member_id)
            .filter(|r| r.value().tenant_id == tenant_id)
            .ok_or_else(|| PassdeskError::NotFound(format!("member {member_id}")))?;
        Ok(engine.simulate_transaction(entry.value_mut(), &program, amount_cents))
    }

    /// Apply an install/uninstall notification to the member holding the pass.
    pub fn apply_wallet_event(&self, tenant_id: Uuid, event: &WalletEvent) -> PassdeskResult<Member> {
        let member_id = self
            .passes
            .get(&(tenant_id, event.external_pass_id.trim().to_string()))
            .map(|r| *r.value())
            .ok_or_else(|| PassdeskError::NotFound(format!("pass {}", event.external_pass_id)))?;

        let mut entry = self
            .members
            .get_mut(&member_id)
            .ok_or_else(|| PassdeskError::NotFound(format!("member {member_id}")))?;
        let member = entry.value_mut();
        let previous = member.status;
        member.status = event.event.status();
        member.updated_at = Utc::now();

        metrics::counter!("store.wallet_events", "event" => format!("{:?}", event.event)).increment(1);
        info!(
            tenant_id = %tenant_id,
            member_id = %member_id,
            from = ?previous,
            to = ?member.status,
            "Pass status changed"
        );
        Ok(member.clone())
    }

    // ─── Demo Data ─────────────────────────────────────────────────────────

    /// Seed a demo tenant reachable with `api_key`.
    pub fn seed_demo(&self, api_key: &str, engine: &TierEngine) -> PassdeskResult<Tenant> {
        let program = TierProgram {
            thresholds: TierThresholds::new(Some(1000), Some(5000), Some(10000)),
            ..engine.default_program()
        };
        let tenant = self.insert_tenant(
            CreateTenantRequest {
                name: "Demo Coffee Co".to_string(),
                program: Some(program),
            },
            engine.default_program(),
            api_key.to_string(),
        )?;

        let samples = [
            (source::SMARTPASS, PassStatus::Installed, 250),
            (source::SMARTPASS, PassStatus::Installed, 1_800),
            (source::SMARTPASS, PassStatus::Uninstalled, 40),
            (source::CLAIM_CODE, PassStatus::Installed, 6_200),
            (source::CLAIM_CODE, PassStatus::Unknown, 0),
            (source::CSV, PassStatus::Installed, 12_500),
            (source::CSV, PassStatus::Uninstalled, 900),
        ];
        for (i, (src, status, points)) in samples.into_iter().enumerate() {
            self.enroll_member(
                tenant.id,
                EnrollMemberRequest {
                    external_pass_id: Some(format!("demo-pass-{i:03}")),
                    source: src.to_string(),
                    status,
                    points_balance: points,
                    spend_cents: points * 100,
                },
            )?;
        }

        info!(tenant_id = %tenant.id, members = samples.len(), "Demo tenant seeded");
        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passdesk_core::config::LoyaltyConfig;
    use passdesk_core::loyalty::TierLevel;

    fn setup() -> (PassdeskStore, TierEngine, Uuid) {
        let store = PassdeskStore::new();
        let engine = TierEngine::new(&LoyaltyConfig::default());
        let (tenant, _) = store
            .create_tenant(
                CreateTenantRequest {
                    name: "Acme Coffee".to_string(),
                    program: Some(TierProgram {
                        thresholds: TierThresholds::new(Some(100), Some(500), None),
                        ..Default::default()
                    }),
                },
                engine.default_program(),
            )
            .unwrap();
        (store, engine, tenant.id)
    }

    fn enroll(pass: &str, source: &str) -> EnrollMemberRequest {
        EnrollMemberRequest {
            external_pass_id: Some(pass.to_string()),
            source: source.to_string(),
            status: PassStatus::Installed,
            points_balance: 0,
            spend_cents: 0,
        }
    }

    #[test]
    fn test_create_tenant_issues_key() {
        let store = PassdeskStore::new();
        let (tenant, key) = store
            .create_tenant(
                CreateTenantRequest {
                    name: "Bean & Leaf".to_string(),
                    program: None,
                },
                TierProgram::default(),
            )
            .unwrap();
        assert_eq!(tenant.slug, "bean---leaf");
        assert!(key.starts_with("pdk_"));
        assert_eq!(store.tenant_for_key(&key), Some(tenant.id));
    }

    #[test]
    fn test_create_tenant_rejects_bad_program() {
        let store = PassdeskStore::new();
        let result = store.create_tenant(
            CreateTenantRequest {
                name: "Bad".to_string(),
                program: Some(TierProgram {
                    thresholds: TierThresholds::new(Some(500), Some(100), None),
                    ..Default::default()
                }),
            },
            TierProgram::default(),
        );
        assert!(matches!(result, Err(PassdeskError::Validation(_))));
    }

    #[test]
    fn test_enroll_rejects_duplicate_pass() {
        let (store, _, tenant_id) = setup();
        store.enroll_member(tenant_id, enroll("p-1", "SMARTPASS")).unwrap();
        let dup = store.enroll_member(tenant_id, enroll("p-1", "CSV"));
        assert!(matches!(dup, Err(PassdeskError::Validation(_))));
        assert_eq!(store.list_members(tenant_id).len(), 1);
    }

    #[test]
    fn test_enroll_requires_source() {
        let (store, _, tenant_id) = setup();
        let result = store.enroll_member(tenant_id, enroll("p-1", "  "));
        assert!(matches!(result, Err(PassdeskError::Validation(_))));
    }

    #[test]
    fn test_bulk_enroll_forces_csv_source() {
        let (store, _, tenant_id) = setup();
        let rows = vec![enroll("a", "SMARTPASS"), enroll("b", ""), enroll("a", "CSV")];
        let outcome = store.enroll_bulk(tenant_id, rows).unwrap();
        assert_eq!(outcome.enrolled, 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 2);
        assert!(store.list_members(tenant_id).iter().all(|m| m.source == "CSV"));
    }

    #[test]
    fn test_members_isolated_by_tenant() {
        let (store, engine, tenant_a) = setup();
        let (tenant_b, _) = store
            .create_tenant(
                CreateTenantRequest {
                    name: "Other".to_string(),
                    program: None,
                },
                engine.default_program(),
            )
            .unwrap();
        let member = store.enroll_member(tenant_a, enroll("p-1", "CSV")).unwrap();

        assert!(store.get_member(tenant_b.id, member.id).is_err());
        assert!(store.list_members(tenant_b.id).is_empty());
        assert!(store
            .apply_transaction(tenant_b.id, member.id, 1000, &engine)
            .is_err());
    }

    #[test]
    fn test_apply_transaction_updates_member() {
        let (store, engine, tenant_id) = setup();
        let member = store.enroll_member(tenant_id, enroll("p-1", "CSV")).unwrap();
        let outcome = store
            .apply_transaction(tenant_id, member.id, 15_000, &engine)
            .unwrap();
        assert_eq!(outcome.points_earned, 150);
        assert_eq!(outcome.tier, TierLevel::Tier2);
        assert!(outcome.tier_changed);
        let stored = store.get_member(tenant_id, member.id).unwrap();
        assert_eq!(stored.points_balance, 150);
        assert_eq!(stored.spend_cents, 15_000);
    }

    #[test]
    fn test_wallet_event_changes_status() {
        let (store, _, tenant_id) = setup();
        store.enroll_member(tenant_id, enroll("p-9", "SMARTPASS")).unwrap();
        let member = store
            .apply_wallet_event(
                tenant_id,
                &WalletEvent {
                    external_pass_id: "p-9".to_string(),
                    event: WalletEventKind::Uninstalled,
                },
            )
            .unwrap();
        assert_eq!(member.status, PassStatus::Uninstalled);

        let missing = store.apply_wallet_event(
            tenant_id,
            &WalletEvent {
                external_pass_id: "nope".to_string(),
                event: WalletEventKind::Installed,
            },
        );
        assert!(matches!(missing, Err(PassdeskError::NotFound(_))));
    }

    #[test]
    fn test_seed_demo() {
        let store = PassdeskStore::new();
        let engine = TierEngine::new(&LoyaltyConfig::default());
        let tenant = store.seed_demo("demo", &engine).unwrap();
        assert_eq!(store.tenant_for_key("demo"), Some(tenant.id));
        assert_eq!(store.list_members(tenant.id).len(), 7);
    }
}
