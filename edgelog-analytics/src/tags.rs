//! Tag / variable analyzer.
//!
//! Single-tag mode groups trades by each `(tag, value)` membership; a
//! multi-valued tag contributes one membership per value. Combination mode
//! additionally groups trades by every k-subset of their sorted memberships,
//! where `k = min(level, memberships on the trade)`, so a trade with fewer
//! tags than the level still lands in exactly one group.
//!
//! Combination output is bounded three ways: subsets are generated lazily and
//! generation stops after `max_generated_combinations` (later trades are not
//! visited), at most `max_tracked_groups` distinct keys are ever tracked, and
//! only the top `max_combination_results` groups by total P&L are returned.
//! Any cap sets `diagnostics.truncated`.

use edgelog_core::domain::{canonical_tag_name, chronological, TagPair, Trade};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use crate::config::TagConfig;
use crate::group::{GroupAccumulator, GroupMetrics};
use crate::output::{ser_f64, ser_opt_f64};
use crate::stats::mean_f64;

/// Canonical identity of a tag combination: pairs sorted and de-duplicated.
///
/// Two trades carrying the same memberships in any order map to equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CombinationKey(Vec<TagPair>);

impl CombinationKey {
    pub fn new(mut pairs: Vec<TagPair>) -> Self {
        pairs.sort();
        pairs.dedup();
        Self(pairs)
    }

    pub fn pairs(&self) -> &[TagPair] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display label: `"tag:value | tag:value"`.
    pub fn label(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Single,
    Combination,
}

/// One single-tag group, labelled `"tag: value"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagGroup {
    pub label: String,
    pub tag: String,
    pub value: String,
    #[serde(flatten)]
    pub metrics: GroupMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationGroup {
    pub label: String,
    pub components: Vec<TagPair>,
    #[serde(flatten)]
    pub metrics: GroupMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestPerforming {
    pub label: String,
    #[serde(serialize_with = "ser_f64")]
    pub profit_factor: f64,
    #[serde(serialize_with = "ser_f64")]
    pub total_pnl: f64,
    pub trades: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub total_trades: usize,
    #[serde(serialize_with = "ser_f64")]
    pub total_pnl: f64,
    /// Mean win rate across single-tag groups.
    #[serde(serialize_with = "ser_f64")]
    pub avg_win_rate: f64,
    /// Mean profit factor across single-tag groups that have one.
    #[serde(serialize_with = "ser_opt_f64")]
    pub avg_profit_factor: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDiagnostics {
    pub records_checked: usize,
    pub records_with_tags: usize,
    pub records_without_tags: usize,
    pub distinct_tag_names: usize,
    pub distinct_groups: usize,
    pub combination_groups_generated: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagAnalysis {
    pub mode: AnalysisMode,
    pub combination_level: Option<usize>,
    /// Single-tag groups, total P&L descending.
    pub groups: Vec<TagGroup>,
    /// Combination groups, total P&L descending. Empty in single mode.
    pub combinations: Vec<CombinationGroup>,
    pub best_performing: Option<BestPerforming>,
    pub summary: TagSummary,
    pub diagnostics: TagDiagnostics,
}

/// Analyze performance by tag, optionally by tag combination.
///
/// `level` is clamped into `2..=5`.
pub fn analyze_tags(trades: &[Trade], combine: bool, level: usize, config: &TagConfig) -> TagAnalysis {
    let ordered = chronological(trades);

    let mut diagnostics = TagDiagnostics {
        records_checked: trades.len(),
        ..TagDiagnostics::default()
    };
    let mut tag_names: BTreeSet<&str> = BTreeSet::new();
    let mut singles: BTreeMap<TagPair, GroupAccumulator> = BTreeMap::new();

    for trade in &ordered {
        if trade.tags.is_empty() {
            diagnostics.records_without_tags += 1;
            continue;
        }
        diagnostics.records_with_tags += 1;
        tag_names.extend(trade.tags.names());
        for pair in trade.tag_pairs() {
            singles.entry(pair).or_default().push(trade);
        }
    }
    diagnostics.distinct_tag_names = tag_names.len();
    diagnostics.distinct_groups = singles.len();

    let mut groups: Vec<TagGroup> = singles
        .into_iter()
        .map(|(pair, acc)| TagGroup {
            label: pair.group_label(),
            tag: pair.name,
            value: pair.value,
            metrics: acc.finish(),
        })
        .collect();
    groups.sort_by(|a, b| b.metrics.total_pnl.total_cmp(&a.metrics.total_pnl));

    let (mode, combination_level, combinations) = if combine {
        let level = TagConfig::effective_level(level);
        let combos = analyze_combinations(&ordered, level, config, &mut diagnostics);
        (AnalysisMode::Combination, Some(level), combos)
    } else {
        (AnalysisMode::Single, None, Vec::new())
    };

    let best_performing = match mode {
        AnalysisMode::Single => best_by_profit_factor(
            groups.iter().map(|g| (g.label.as_str(), &g.metrics)),
        ),
        AnalysisMode::Combination => best_by_profit_factor(
            combinations.iter().map(|g| (g.label.as_str(), &g.metrics)),
        ),
    };

    let summary = TagSummary {
        total_trades: trades.len(),
        total_pnl: trades.iter().map(Trade::pnl_or_zero).sum(),
        avg_win_rate: mean_f64(&groups.iter().map(|g| g.metrics.win_rate).collect::<Vec<_>>()),
        avg_profit_factor: {
            let pfs: Vec<f64> = groups.iter().filter_map(|g| g.metrics.profit_factor).collect();
            (!pfs.is_empty()).then(|| mean_f64(&pfs))
        },
    };

    TagAnalysis {
        mode,
        combination_level,
        groups,
        combinations,
        best_performing,
        summary,
        diagnostics,
    }
}

fn analyze_combinations(
    ordered: &[&Trade],
    level: usize,
    config: &TagConfig,
    diagnostics: &mut TagDiagnostics,
) -> Vec<CombinationGroup> {
    let mut tracked: BTreeMap<CombinationKey, GroupAccumulator> = BTreeMap::new();
    let mut dropped_keys = 0usize;
    let mut budget_exhausted = false;

    'trades: for trade in ordered {
        let pairs = trade.tag_pairs();
        if pairs.is_empty() {
            continue;
        }
        let k = level.min(pairs.len());
        for indices in index_combinations(pairs.len(), k) {
            if diagnostics.combination_groups_generated >= config.max_generated_combinations {
                budget_exhausted = true;
                break 'trades;
            }
            diagnostics.combination_groups_generated += 1;
            let key = CombinationKey(indices.iter().map(|&i| pairs[i].clone()).collect());
            if let Some(acc) = tracked.get_mut(&key) {
                acc.push(trade);
            } else if tracked.len() < config.max_tracked_groups {
                tracked.entry(key).or_default().push(trade);
            } else {
                dropped_keys += 1;
            }
        }
    }

    let mut combos: Vec<CombinationGroup> = tracked
        .into_iter()
        .map(|(key, acc)| CombinationGroup {
            label: key.label(),
            components: key.0,
            metrics: acc.finish(),
        })
        .collect();
    combos.sort_by(|a, b| b.metrics.total_pnl.total_cmp(&a.metrics.total_pnl));

    let total_groups = combos.len();
    if total_groups > config.max_combination_results {
        combos.truncate(config.max_combination_results);
    }
    if budget_exhausted || dropped_keys > 0 || total_groups > combos.len() {
        diagnostics.truncated = true;
        warn!(
            level,
            generated = diagnostics.combination_groups_generated,
            budget_exhausted,
            tracked = total_groups,
            kept = combos.len(),
            dropped_memberships = dropped_keys,
            "combination analysis truncated"
        );
    }
    combos
}

/// All k-subsets of `0..n` as ascending index lists, in lexicographic order.
pub(crate) fn index_combinations(n: usize, k: usize) -> IndexCombinations {
    IndexCombinations {
        n,
        idx: (0..k).collect(),
        done: k == 0 || k > n,
    }
}

/// Lazy k-subset generator; holds one index list at a time.
pub(crate) struct IndexCombinations {
    n: usize,
    idx: Vec<usize>,
    done: bool,
}

impl Iterator for IndexCombinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let current = self.idx.clone();
        let k = self.idx.len();
        self.done = true;
        for i in (0..k).rev() {
            if self.idx[i] < i + self.n - k {
                self.idx[i] += 1;
                for j in i + 1..k {
                    self.idx[j] = self.idx[j - 1] + 1;
                }
                self.done = false;
                break;
            }
        }
        Some(current)
    }
}

/// Highest profit factor, skipping groups without one. Ties keep the earlier group.
pub(crate) fn best_by_profit_factor<'a>(
    groups: impl Iterator<Item = (&'a str, &'a GroupMetrics)>,
) -> Option<BestPerforming> {
    let mut best: Option<(&str, &GroupMetrics, f64)> = None;
    for (label, metrics) in groups {
        let Some(pf) = metrics.profit_factor else {
            continue;
        };
        if best.map_or(true, |(_, _, top)| pf > top) {
            best = Some((label, metrics, pf));
        }
    }
    best.map(|(label, metrics, pf)| BestPerforming {
        label: label.to_string(),
        profit_factor: pf,
        total_pnl: metrics.total_pnl,
        trades: metrics.trades,
    })
}

// ─── Single-key variable breakdown ──────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableValue {
    pub value: String,
    #[serde(flatten)]
    pub metrics: GroupMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableBreakdown {
    pub key: String,
    pub trades_with_key: usize,
    pub trades_without_key: usize,
    /// Values by trade count descending.
    pub values: Vec<VariableValue>,
    pub best_value: Option<BestPerforming>,
}

/// Break down performance by the values of one tag key.
pub fn variable_breakdown(trades: &[Trade], key: &str) -> VariableBreakdown {
    let key = canonical_tag_name(key);
    let mut by_value: BTreeMap<&str, GroupAccumulator> = BTreeMap::new();
    let mut with_key = 0;

    for trade in chronological(trades) {
        let Some(value) = trade.tags.get(&key) else {
            continue;
        };
        with_key += 1;
        for v in value.as_slice() {
            by_value.entry(v.as_str()).or_default().push(trade);
        }
    }

    let mut values: Vec<VariableValue> = by_value
        .into_iter()
        .map(|(value, acc)| VariableValue {
            value: value.to_string(),
            metrics: acc.finish(),
        })
        .collect();
    values.sort_by(|a, b| b.metrics.trades.cmp(&a.metrics.trades));

    let best_value = best_by_profit_factor(values.iter().map(|v| (v.value.as_str(), &v.metrics)));

    VariableBreakdown {
        key,
        trades_with_key: with_key,
        trades_without_key: trades.len() - with_key,
        values,
        best_value,
    }
}
