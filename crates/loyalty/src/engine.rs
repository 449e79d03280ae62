//! Tier engine: member badges, tier distribution and simulated POS earning
//! on top of the pure tier math in [`crate::tiers`].

use crate::tiers::{classify, progress, resolve_name};
use chrono::Utc;
use passdesk_core::config::LoyaltyConfig;
use passdesk_core::loyalty::*;
use passdesk_core::types::{Member, TierDistribution};
use tracing::{debug, info};

/// Stateless computation over tenant programs and member data.
pub struct TierEngine {
    config: LoyaltyConfig,
}

impl TierEngine {
    pub fn new(config: &LoyaltyConfig) -> Self {
        info!(
            points_per_dollar = config.default_points_per_dollar,
            tier_system = ?config.default_tier_system,
            "Tier engine initialized"
        );
        Self {
            config: config.clone(),
        }
    }

    /// Program assigned to a tenant that did not supply one.
    pub fn default_program(&self) -> TierProgram {
        TierProgram {
            tier_system: self.config.default_tier_system,
            points_per_dollar: self.config.default_points_per_dollar.max(1),
            ..Default::default()
        }
    }

    /// The member value the program's thresholds are measured against.
    pub fn metric_value(member: &Member, program: &TierProgram) -> i64 {
        match program.metric {
            TierMetric::Points => member.points_balance,
            TierMetric::SpendCents => member.spend_cents,
        }
    }

    pub fn tier_of(&self, member: &Member, program: &TierProgram) -> TierLevel {
        classify(Self::metric_value(member, program), &program.thresholds)
    }

    /// Display-ready tier badge for one member.
    pub fn badge(&self, member: &Member, program: &TierProgram) -> TierBadge {
        let value = Self::metric_value(member, program).max(0);
        let progress = progress(value, &program.thresholds);
        let names = program.tier_names.as_ref();

        // Crossing the current boundary may skip zero-width bands.
        let next_tier_name = progress
            .next_threshold
            .map(|upper| classify(upper.saturating_add(1), &program.thresholds))
            .map(|next| resolve_name(next, names, program.tier_system));

        TierBadge {
            level: progress.level,
            name: resolve_name(progress.level, names, program.tier_system),
            next_tier_name,
            metric: program.metric,
            value,
            progress,
            show_progress: program.tier_system.shows_progress() && !program.thresholds.is_empty(),
        }
    }

    /// Count members per tier under `program`.
    pub fn distribution<'a, I>(&self, members: I, program: &TierProgram) -> TierDistribution
    where
        I: IntoIterator<Item = &'a Member>,
    {
        let mut dist = TierDistribution::default();
        for member in members {
            dist.increment(self.tier_of(member, program));
        }
        dist
    }

    /// Apply a simulated purchase to `member`: add spend, earn points at the
    /// program rate, and report whether the tier moved.
    pub fn simulate_transaction(
        &self,
        member: &mut Member,
        program: &TierProgram,
        amount_cents: i64,
    ) -> TransactionOutcome {
        let amount_cents = amount_cents.max(0);
        let previous_tier = self.tier_of(member, program);

        let points_earned = amount_cents.saturating_mul(program.points_per_dollar as i64) / 100;

        member.points_balance = member.points_balance.max(0).saturating_add(points_earned);
        member.spend_cents = member.spend_cents.max(0).saturating_add(amount_cents);
        member.updated_at = Utc::now();

        metrics::counter!("loyalty.transactions_simulated").increment(1);
        metrics::counter!("loyalty.points_earned").increment(points_earned as u64);

        let tier = self.tier_of(member, program);
        let tier_changed = tier != previous_tier;
        if tier_changed {
            metrics::counter!("loyalty.tier_upgrades").increment(1);
            info!(
                member_id = %member.id,
                tenant_id = %member.tenant_id,
                old = %previous_tier,
                new = %tier,
                "Tier upgrade"
            );
        }

        debug!(
            member_id = %member.id,
            amount_cents = amount_cents,
            points_earned = points_earned,
            balance = member.points_balance,
            tier = %tier,
            "Transaction simulated"
        );

        TransactionOutcome {
            member_id: member.id,
            amount_cents,
            points_earned,
            new_points_balance: member.points_balance,
            new_spend_cents: member.spend_cents,
            previous_tier,
            tier,
            tier_changed,
        }
    }

    pub fn config(&self) -> &LoyaltyConfig {
        &self.config
    }
}
