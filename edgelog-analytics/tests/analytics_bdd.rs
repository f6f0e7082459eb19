//! BDD scenarios for the analytics engine.
//!
//! Each scenario feeds raw records through the normalizer and checks the
//! components the way a journal user would read them.

use edgelog_analytics::{
    analyze_tags, build_report, compute_core_metrics, compute_equity_curve, compute_streaks,
    compute_time_buckets, symbol_breakdown, AnalysisMode, AnalyticsConfig, MetricsConfig,
    TagConfig,
};
use edgelog_core::{normalize, RawTradeRecord, Trade};
use serde_json::{json, Value};

fn normalize_json(records: Value) -> Vec<Trade> {
    let raw: Vec<RawTradeRecord> = serde_json::from_value(records).unwrap();
    normalize(&raw).expect("records should be valid")
}

fn pnl_series(pnls: &[f64]) -> Vec<Trade> {
    let records: Vec<Value> = pnls
        .iter()
        .enumerate()
        .map(|(i, pnl)| {
            json!({
                "symbol": "ES",
                "direction": "long",
                "pnl": pnl,
                "date": format!("2024-03-{:02}T10:00:00", i + 1),
            })
        })
        .collect();
    normalize_json(Value::Array(records))
}

#[test]
fn bdd_scenario_reference_three_trades() {
    // GIVEN three trades with pnl [100, -50, 30] and rr [2, 1, 1.5]
    let trades = normalize_json(json!([
        {"symbol": "ES", "direction": "long", "pnl": 100, "rr": 2, "date": "2024-03-01"},
        {"symbol": "ES", "direction": "short", "pnl": -50, "rr": 1, "date": "2024-03-02"},
        {"symbol": "NQ", "direction": "long", "pnl": 30, "rr": 1.5, "date": "2024-03-03"},
    ]));

    // WHEN core metrics are computed
    let m = compute_core_metrics(&trades, &MetricsConfig::default());

    // THEN the headline numbers match the hand calculation
    assert!((m.total_pnl - 80.0).abs() < 1e-10);
    assert!((m.gross_profit - 130.0).abs() < 1e-10);
    assert!((m.gross_loss - 50.0).abs() < 1e-10);
    assert!((m.profit_factor.unwrap() - 2.6).abs() < 1e-10);
    assert!((m.avg_rr - 1.5).abs() < 1e-10);

    // AND the serialized win rate is rounded to 66.67
    let json = serde_json::to_value(&m).unwrap();
    assert_eq!(json["winRate"], json!(66.67));
    assert_eq!(json["totalPnl"], json!(80.0));
    assert_eq!(json["profitFactor"], json!(2.6));
    assert_eq!(json["expectancy"], json!(26.67));

    // AND direction split adds up
    assert!((m.long_pnl - 130.0).abs() < 1e-10);
    assert!((m.short_pnl + 50.0).abs() < 1e-10);
}

#[test]
fn bdd_scenario_streak_sequence() {
    // GIVEN the pnl sequence +1 +1 -1 +1 +1 +1 -1 -1
    let trades = pnl_series(&[1.0, 1.0, -1.0, 1.0, 1.0, 1.0, -1.0, -1.0]);

    // WHEN streak metrics are computed
    let m = compute_core_metrics(&trades, &MetricsConfig::default());
    let streaks = compute_streaks(&trades);

    // THEN the longest winning run is 3 and the longest losing run is 2
    assert_eq!(m.max_consecutive_wins, 3);
    assert_eq!(m.max_consecutive_losses, 2);
    assert_eq!(streaks.longest_winning_streak.unwrap().count, 3);
    assert_eq!(streaks.longest_losing_streak.unwrap().count, 2);
}

#[test]
fn bdd_scenario_setup_tag_ranking() {
    // GIVEN three trades tagged setup A, A, B with pnl 10, -5, 20
    let trades = normalize_json(json!([
        {"symbol": "ES", "direction": "long", "pnl": 10, "date": "2024-03-01", "tags": {"setup": "A"}},
        {"symbol": "ES", "direction": "long", "pnl": -5, "date": "2024-03-02", "tags": {"setup": "A"}},
        {"symbol": "ES", "direction": "long", "pnl": 20, "date": "2024-03-03", "tags": {"setup": "B"}},
    ]));

    // WHEN single-tag analysis runs
    let analysis = analyze_tags(&trades, false, 2, &TagConfig::default());

    // THEN setup: B ranks first with 1 trade and pnl 20
    assert_eq!(analysis.mode, AnalysisMode::Single);
    assert_eq!(analysis.groups[0].label, "setup: B");
    assert_eq!(analysis.groups[0].metrics.trades, 1);
    assert_eq!(analysis.groups[0].metrics.total_pnl, 20.0);

    // AND setup: A has 2 trades and pnl 5
    assert_eq!(analysis.groups[1].label, "setup: A");
    assert_eq!(analysis.groups[1].metrics.trades, 2);
    assert_eq!(analysis.groups[1].metrics.total_pnl, 5.0);
}

#[test]
fn bdd_scenario_combination_mode_from_mixed_sources() {
    // GIVEN trades whose tags come from both the tag map and the extra map
    let trades = normalize_json(json!([
        {"symbol": "ES", "direction": "long", "pnl": 40, "date": "2024-03-01",
         "tags": {"setup": "A"}, "extra": {"session": "NY"}},
        {"symbol": "ES", "direction": "long", "pnl": -10, "date": "2024-03-02",
         "extra": {"session": "NY", "setup": "A"}},
        {"symbol": "ES", "direction": "long", "pnl": 15, "date": "2024-03-03",
         "tags": {"setup": "B"}},
    ]));

    // WHEN pair combinations are analyzed
    let config = TagConfig {
        combine: true,
        ..TagConfig::default()
    };
    let analysis = analyze_tags(&trades, true, 2, &config);

    // THEN the two A/NY trades share one combination group
    let pair = analysis
        .combinations
        .iter()
        .find(|c| c.label == "session:NY | setup:A")
        .expect("pair group");
    assert_eq!(pair.metrics.trades, 2);
    assert_eq!(pair.metrics.total_pnl, 30.0);
    assert!((pair.metrics.profit_factor.unwrap() - 4.0).abs() < 1e-10);

    // AND the single-tag trade forms its own one-pair group
    assert!(analysis.combinations.iter().any(|c| c.label == "setup:B"));

    // AND the best performer is the only group with a measurable profit factor
    assert_eq!(analysis.best_performing.unwrap().label, "session:NY | setup:A");
}

#[test]
fn bdd_scenario_drawdown_after_peak() {
    // GIVEN a run-up followed by losses
    let trades = pnl_series(&[200.0, 100.0, -150.0, -100.0, 50.0]);

    // WHEN the equity curve is built
    let curve = compute_equity_curve(&trades, &MetricsConfig::default());

    // THEN max drawdown is measured from the 300 peak
    assert_eq!(curve.peak_equity, 300.0);
    assert_eq!(curve.max_drawdown, 250.0);
    assert!((curve.max_drawdown_percent - 250.0 / 300.0 * 100.0).abs() < 1e-10);
}

#[test]
fn bdd_scenario_empty_journal() {
    // GIVEN no trades
    let trades: Vec<Trade> = Vec::new();
    let config = AnalyticsConfig::default();

    // WHEN every component runs
    let core = compute_core_metrics(&trades, &config.metrics);
    let curve = compute_equity_curve(&trades, &config.metrics);
    let buckets = compute_time_buckets(&trades);
    let tags = analyze_tags(&trades, true, 3, &config.tags);
    let report = build_report(&trades, &config);

    // THEN each result is zeroed and serializable
    assert!(core.insufficient_data);
    assert_eq!(core.win_rate, 0.0);
    assert!(curve.points.is_empty());
    assert_eq!(buckets.hourly.buckets.len(), 24);
    assert!(tags.groups.is_empty());
    assert!(symbol_breakdown(&trades).is_empty());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["tradeCount"], json!(0));
    assert_eq!(json["core"]["insufficientData"], json!(true));
    assert_eq!(json["core"]["totalPnl"], json!(0.0));
}

#[test]
fn bdd_scenario_breakeven_only() {
    // GIVEN only breakeven trades
    let trades = pnl_series(&[0.0, 0.0, 0.0]);

    // WHEN core metrics are computed
    let m = compute_core_metrics(&trades, &MetricsConfig::default());

    // THEN the win rate is zero and profit factor is zero, not null
    assert_eq!(m.win_rate, 0.0);
    assert_eq!(m.profit_factor, Some(0.0));
    assert_eq!(m.breakeven, 3);
    assert_eq!(m.max_consecutive_losses, 3);
}
