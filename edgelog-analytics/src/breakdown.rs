//! Symbol and strategy breakdowns.

use edgelog_core::domain::{chronological, Trade};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::group::{GroupAccumulator, GroupMetrics};

/// Label used for trades recorded without a strategy.
pub const UNSPECIFIED_STRATEGY: &str = "Unspecified";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub key: String,
    #[serde(flatten)]
    pub metrics: GroupMetrics,
}

/// Per-symbol performance, total P&L descending.
pub fn symbol_breakdown(trades: &[Trade]) -> Vec<GroupSummary> {
    breakdown_by(trades, |t| t.symbol.clone())
}

/// Per-strategy performance, total P&L descending.
pub fn strategy_breakdown(trades: &[Trade]) -> Vec<GroupSummary> {
    breakdown_by(trades, |t| {
        t.strategy
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNSPECIFIED_STRATEGY)
            .to_string()
    })
}

fn breakdown_by(trades: &[Trade], key_of: impl Fn(&Trade) -> String) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<String, GroupAccumulator> = BTreeMap::new();
    for trade in chronological(trades) {
        groups.entry(key_of(trade)).or_default().push(trade);
    }
    let mut out: Vec<GroupSummary> = groups
        .into_iter()
        .map(|(key, acc)| GroupSummary {
            key,
            metrics: acc.finish(),
        })
        .collect();
    out.sort_by(|a, b| b.metrics.total_pnl.total_cmp(&a.metrics.total_pnl));
    out
}
