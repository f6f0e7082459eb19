//! Equity & drawdown engine.
//!
//! The curve starts from zero equity and accumulates trade P&L in
//! chronological order. Drawdown is measured from the running peak, so it is
//! never negative, and the initial zero counts as a peak.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use edgelog_core::domain::{chronological, Trade, TradeId};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::MetricsConfig;
use crate::output::{ser_f64, ser_opt_f64};

/// One point per trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub date: NaiveDateTime,
    pub trade_id: Option<TradeId>,
    pub symbol: String,
    #[serde(serialize_with = "ser_f64")]
    pub pnl: f64,
    #[serde(serialize_with = "ser_f64")]
    pub equity: f64,
    #[serde(serialize_with = "ser_f64")]
    pub peak: f64,
    #[serde(serialize_with = "ser_f64")]
    pub drawdown: f64,
}

/// P&L summed per calendar day of the economic date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub trades: usize,
    #[serde(serialize_with = "ser_f64")]
    pub pnl: f64,
    #[serde(serialize_with = "ser_f64")]
    pub cumulative_pnl: f64,
    /// Day P&L as a fraction of the notional capital.
    #[serde(serialize_with = "ser_opt_f64")]
    pub daily_return: Option<f64>,
}

/// P&L over a calendar period (Monday-start week or month).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPnl {
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub trades: usize,
    #[serde(serialize_with = "ser_f64")]
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityCurve {
    pub points: Vec<EquityPoint>,
    pub daily: Vec<DailyPnl>,
    pub weekly: Vec<PeriodPnl>,
    pub monthly: Vec<PeriodPnl>,
    #[serde(serialize_with = "ser_f64")]
    pub total_pnl: f64,
    #[serde(serialize_with = "ser_f64")]
    pub peak_equity: f64,
    #[serde(serialize_with = "ser_f64")]
    pub max_drawdown: f64,
    #[serde(serialize_with = "ser_f64")]
    pub max_drawdown_percent: f64,
}

impl EquityCurve {
    /// Daily returns on the notional capital, in day order.
    pub fn daily_returns(&self) -> Vec<f64> {
        self.daily.iter().filter_map(|d| d.daily_return).collect()
    }
}

/// Build the equity curve, drawdown statistics and periodic P&L.
pub fn compute_equity_curve(trades: &[Trade], config: &MetricsConfig) -> EquityCurve {
    let ordered = chronological(trades);

    let mut points = Vec::with_capacity(ordered.len());
    let mut equity = 0.0_f64;
    // Seeded by the first point: no drawdown before the first trade.
    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0_f64;

    for trade in &ordered {
        let pnl = trade.pnl_or_zero();
        equity += pnl;
        if equity > peak {
            peak = equity;
        }
        let drawdown = peak - equity;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
        points.push(EquityPoint {
            date: trade.date,
            trade_id: trade.id.clone(),
            symbol: trade.symbol.clone(),
            pnl,
            equity,
            peak,
            drawdown,
        });
    }

    let peak = if peak.is_finite() { peak } else { 0.0 };
    let peak_basis = peak.max(1.0);

    EquityCurve {
        daily: daily_pnl(&ordered, config.notional_capital),
        weekly: period_pnl(&ordered, week_bounds),
        monthly: period_pnl(&ordered, month_bounds),
        points,
        total_pnl: equity,
        peak_equity: peak,
        max_drawdown,
        max_drawdown_percent: max_drawdown / peak_basis * 100.0,
    }
}

fn daily_pnl(ordered: &[&Trade], notional: f64) -> Vec<DailyPnl> {
    let mut by_day: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();
    for trade in ordered {
        let entry = by_day.entry(trade.day()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += trade.pnl_or_zero();
    }

    let mut cumulative = 0.0;
    by_day
        .into_iter()
        .map(|(date, (trades, pnl))| {
            cumulative += pnl;
            DailyPnl {
                date,
                trades,
                pnl,
                cumulative_pnl: cumulative,
                daily_return: (notional > 0.0).then(|| pnl / notional),
            }
        })
        .collect()
}

/// `(start, end, label)` of the period containing `day`.
type PeriodBounds = fn(NaiveDate) -> (NaiveDate, NaiveDate, String);

fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate, String) {
    let offset = u64::from(day.weekday().num_days_from_monday());
    let start = day.checked_sub_days(Days::new(offset)).unwrap_or(day);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
    (start, end, format!("Week of {}", start.format("%Y-%m-%d")))
}

fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate, String) {
    let start = day.with_day(1).unwrap_or(day);
    let end = start
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(start);
    (start, end, start.format("%Y-%m").to_string())
}

fn period_pnl(ordered: &[&Trade], bounds: PeriodBounds) -> Vec<PeriodPnl> {
    let mut periods: BTreeMap<NaiveDate, PeriodPnl> = BTreeMap::new();
    for trade in ordered {
        let (start, end, label) = bounds(trade.day());
        let period = periods.entry(start).or_insert_with(|| PeriodPnl {
            label,
            start_date: start,
            end_date: end,
            trades: 0,
            pnl: 0.0,
        });
        period.trades += 1;
        period.pnl += trade.pnl_or_zero();
    }
    periods.into_values().collect()
}
