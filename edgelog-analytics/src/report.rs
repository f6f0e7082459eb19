//! Analytics report — every component over one trade set, in one object.
//!
//! Components are independent and pure, so they run concurrently on the
//! rayon pool. Core metrics reuse the equity curve instead of rebuilding it.

use chrono::{NaiveDate, NaiveDateTime};
use edgelog_core::domain::{chronological, DatasetHash, Direction, Trade, TradeId};
use edgelog_core::fingerprint::dataset_hash;
use serde::Serialize;
use tracing::debug;

use crate::breakdown::{strategy_breakdown, symbol_breakdown, GroupSummary};
use crate::buckets::{compute_time_buckets, TimeBuckets};
use crate::config::AnalyticsConfig;
use crate::equity::{compute_equity_curve, EquityCurve};
use crate::metrics::{core_metrics_with_curve, CoreMetrics};
use crate::output::ser_opt_f64;
use crate::risk::{risk_summary, RiskSummary};
use crate::streaks::{compute_streaks, StreakReport};
use crate::tags::{analyze_tags, TagAnalysis};

/// Current schema version of the serialized report.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTrade {
    pub id: Option<TradeId>,
    pub symbol: String,
    pub direction: Direction,
    pub date: NaiveDateTime,
    #[serde(serialize_with = "ser_opt_f64")]
    pub pnl: Option<f64>,
    #[serde(serialize_with = "ser_opt_f64")]
    pub rr: Option<f64>,
    pub strategy: Option<String>,
}

impl From<&Trade> for RecentTrade {
    fn from(trade: &Trade) -> Self {
        Self {
            id: trade.id.clone(),
            symbol: trade.symbol.clone(),
            direction: trade.direction,
            date: trade.date,
            pnl: trade.pnl,
            rr: trade.rr,
            strategy: trade.strategy.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub schema_version: u32,
    pub dataset_hash: DatasetHash,
    pub trade_count: usize,
    pub first_trade_date: Option<NaiveDate>,
    pub last_trade_date: Option<NaiveDate>,

    pub core: CoreMetrics,
    pub equity: EquityCurve,
    pub time_buckets: TimeBuckets,
    pub tags: TagAnalysis,
    pub streaks: StreakReport,
    pub symbols: Vec<GroupSummary>,
    /// The best symbols by total P&L, up to `report.top_symbols`.
    pub top_symbols: Vec<String>,
    pub strategies: Vec<GroupSummary>,
    pub risk: RiskSummary,
    pub recent_trades: Vec<RecentTrade>,
}

/// The `limit` most recent trades, newest first.
pub fn recent_trades(trades: &[Trade], limit: usize) -> Vec<RecentTrade> {
    chronological(trades)
        .into_iter()
        .rev()
        .take(limit)
        .map(RecentTrade::from)
        .collect()
}

/// Build the full report.
#[tracing::instrument(skip_all, fields(trades = trades.len(), combine = config.tags.combine))]
pub fn build_report(trades: &[Trade], config: &AnalyticsConfig) -> AnalyticsReport {
    let ((equity, time_buckets), (tags, (streaks, (symbols, strategies)))) = rayon::join(
        || {
            rayon::join(
                || compute_equity_curve(trades, &config.metrics),
                || compute_time_buckets(trades),
            )
        },
        || {
            rayon::join(
                || {
                    analyze_tags(
                        trades,
                        config.tags.combine,
                        config.tags.combination_level,
                        &config.tags,
                    )
                },
                || {
                    rayon::join(
                        || compute_streaks(trades),
                        || (symbol_breakdown(trades), strategy_breakdown(trades)),
                    )
                },
            )
        },
    );

    let core = core_metrics_with_curve(trades, &equity, &config.metrics);
    let top_symbols = symbols
        .iter()
        .take(config.report.top_symbols)
        .map(|g| g.key.clone())
        .collect();

    debug!(
        groups = tags.groups.len(),
        combinations = tags.combinations.len(),
        days = equity.daily.len(),
        "report built"
    );

    AnalyticsReport {
        schema_version: SCHEMA_VERSION,
        dataset_hash: dataset_hash(trades),
        trade_count: trades.len(),
        first_trade_date: trades.iter().map(Trade::day).min(),
        last_trade_date: trades.iter().map(Trade::day).max(),
        core,
        equity,
        time_buckets,
        tags,
        streaks,
        symbols,
        top_symbols,
        strategies,
        risk: risk_summary(trades, config.risk.max_allowed_risk),
        recent_trades: recent_trades(trades, config.report.recent_trades),
    }
}
