//! edgelog analytics — performance metrics over normalized trades.
//!
//! Every component is a pure function of `&[Trade]` plus explicit
//! configuration:
//! - Core metrics (win rate, profit factor, expectancy, Kelly, Sharpe/Sortino, streak lengths)
//! - Equity curve and drawdown
//! - Time buckets (hour, weekday, ISO week, month)
//! - Tag and tag-combination analysis, single-key variable breakdown
//! - Streaks, symbol/strategy breakdowns, risk summary
//! - A combined report with a dataset hash and schema version

pub mod breakdown;
pub mod buckets;
pub mod config;
pub mod equity;
pub mod group;
pub mod metrics;
pub mod output;
pub mod report;
pub mod risk;
pub mod streaks;
pub mod tags;

mod stats;

pub use breakdown::{strategy_breakdown, symbol_breakdown, GroupSummary};
pub use buckets::{compute_time_buckets, Aggregation, Bucket, BucketStats, TimeBuckets};
pub use config::{AnalyticsConfig, ConfigError, MetricsConfig, ReportConfig, RiskConfig, TagConfig};
pub use equity::{compute_equity_curve, EquityCurve, EquityPoint};
pub use group::GroupMetrics;
pub use metrics::{compute_core_metrics, CoreMetrics, TradeHighlight};
pub use report::{build_report, recent_trades, AnalyticsReport, SCHEMA_VERSION};
pub use risk::{risk_summary, RiskSummary};
pub use streaks::{compute_streaks, Streak, StreakKind, StreakReport};
pub use tags::{
    analyze_tags, variable_breakdown, AnalysisMode, CombinationGroup, CombinationKey, TagAnalysis,
    TagGroup, VariableBreakdown,
};
