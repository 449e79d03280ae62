//! Enrollment analytics: per-source and overall install/churn counts with
//! retention rates, computed from a snapshot of member records.

use passdesk_core::types::{source, AnalyticsResult, KnownSources, MemberRecord, PassStatus, SourceCounts};
use std::collections::BTreeMap;
use tracing::debug;

/// Retention as a whole percentage, `0` for an empty bucket.
pub fn retention_rate(active: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (active as f64 / total as f64 * 100.0).round() as u32
}

/// Running counters for one bucket.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    total: u64,
    active: u64,
    churned: u64,
}

impl Tally {
    fn record(&mut self, status: PassStatus) {
        self.total += 1;
        match status {
            PassStatus::Installed => self.active += 1,
            PassStatus::Uninstalled => self.churned += 1,
            PassStatus::Unknown => {}
        }
    }

    fn finish(self) -> SourceCounts {
        SourceCounts {
            total: self.total,
            active: self.active,
            churned: self.churned,
            retention_rate: retention_rate(self.active, self.total),
        }
    }
}

/// Bucket member records by enrollment source and lifecycle status.
///
/// Statuses other than installed/uninstalled count toward `total` only.
/// Sources are grouped by their exact label; the fixed `sources` view picks
/// the well-known channels and reports zeros for any that are missing.
pub fn aggregate<'a, I>(records: I) -> AnalyticsResult
where
    I: IntoIterator<Item = &'a MemberRecord>,
{
    let mut totals = Tally::default();
    let mut buckets: BTreeMap<&'a str, Tally> = BTreeMap::new();

    for record in records {
        totals.record(record.status);
        buckets
            .entry(record.source.as_str())
            .or_default()
            .record(record.status);
    }

    let by_source: BTreeMap<String, SourceCounts> = buckets
        .into_iter()
        .map(|(label, tally)| (label.to_string(), tally.finish()))
        .collect();

    let known = |label: &str| by_source.get(label).copied().unwrap_or_default();
    let sources = KnownSources {
        csv: known(source::CSV),
        smartpass: known(source::SMARTPASS),
        claim_code: known(source::CLAIM_CODE),
    };

    let totals = totals.finish();
    debug!(
        total = totals.total,
        active = totals.active,
        churned = totals.churned,
        sources = by_source.len(),
        "Enrollment analytics aggregated"
    );

    AnalyticsResult {
        totals,
        by_source,
        sources,
    }
}
