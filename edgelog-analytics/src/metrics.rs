//! Core performance metrics — pure functions over a trade list.
//!
//! Ratios that would divide by zero are `None`, never infinity or NaN.
//! Breakeven trades (`pnl == 0` or no pnl) count toward totals but are not
//! wins or losses.

use chrono::NaiveDateTime;
use edgelog_core::domain::{chronological, Direction, Trade, TradeId};
use serde::Serialize;

use crate::config::MetricsConfig;
use crate::equity::{compute_equity_curve, EquityCurve};
use crate::output::{ser_f64, ser_opt_f64};
use crate::stats::{checked_ratio, expectancy, mean_f64, profit_factor, std_dev, win_rate_pct};

/// The single best or worst trade.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeHighlight {
    pub id: Option<TradeId>,
    pub symbol: String,
    pub date: Option<NaiveDateTime>,
    #[serde(serialize_with = "ser_f64")]
    pub pnl: f64,
    #[serde(serialize_with = "ser_opt_f64")]
    pub rr: Option<f64>,
}

impl TradeHighlight {
    fn from_trade(trade: &Trade) -> Self {
        Self {
            id: trade.id.clone(),
            symbol: trade.symbol.clone(),
            date: Some(trade.date),
            pnl: trade.pnl_or_zero(),
            rr: trade.rr,
        }
    }
}

/// Aggregate performance metrics for a trade set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreMetrics {
    /// True when computed from an empty trade set; every other field is zero.
    pub insufficient_data: bool,

    // ── Counts ──
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,

    // ── P&L ──
    #[serde(serialize_with = "ser_f64")]
    pub total_pnl: f64,
    #[serde(serialize_with = "ser_f64")]
    pub gross_profit: f64,
    #[serde(serialize_with = "ser_f64")]
    pub gross_loss: f64,
    #[serde(serialize_with = "ser_f64")]
    pub avg_win: f64,
    #[serde(serialize_with = "ser_f64")]
    pub avg_loss: f64,
    #[serde(serialize_with = "ser_f64")]
    pub avg_pnl: f64,
    #[serde(serialize_with = "ser_f64")]
    pub total_rr: f64,
    #[serde(serialize_with = "ser_f64")]
    pub avg_rr: f64,
    #[serde(serialize_with = "ser_f64")]
    pub long_pnl: f64,
    #[serde(serialize_with = "ser_f64")]
    pub short_pnl: f64,

    // ── Ratios ──
    #[serde(serialize_with = "ser_f64")]
    pub win_rate: f64,
    #[serde(serialize_with = "ser_opt_f64")]
    pub profit_factor: Option<f64>,
    #[serde(serialize_with = "ser_f64")]
    pub expectancy: f64,
    #[serde(serialize_with = "ser_opt_f64")]
    pub kelly_percentage: Option<f64>,
    #[serde(serialize_with = "ser_opt_f64")]
    pub sharpe_ratio: Option<f64>,
    #[serde(serialize_with = "ser_opt_f64")]
    pub sortino_ratio: Option<f64>,
    #[serde(serialize_with = "ser_opt_f64")]
    pub recovery_factor: Option<f64>,

    // ── Drawdown ──
    #[serde(serialize_with = "ser_f64")]
    pub max_drawdown: f64,
    #[serde(serialize_with = "ser_f64")]
    pub max_drawdown_percent: f64,

    // ── Streaks & extremes ──
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub best_trade: TradeHighlight,
    pub worst_trade: TradeHighlight,
}

impl CoreMetrics {
    /// The result for an empty trade set: every field present and zeroed.
    pub fn insufficient_data() -> Self {
        Self {
            insufficient_data: true,
            total_trades: 0,
            wins: 0,
            losses: 0,
            breakeven: 0,
            total_pnl: 0.0,
            gross_profit: 0.0,
            gross_loss: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            avg_pnl: 0.0,
            total_rr: 0.0,
            avg_rr: 0.0,
            long_pnl: 0.0,
            short_pnl: 0.0,
            win_rate: 0.0,
            profit_factor: Some(0.0),
            expectancy: 0.0,
            kelly_percentage: Some(0.0),
            sharpe_ratio: Some(0.0),
            sortino_ratio: Some(0.0),
            recovery_factor: Some(0.0),
            max_drawdown: 0.0,
            max_drawdown_percent: 0.0,
            max_consecutive_wins: 0,
            max_consecutive_losses: 0,
            best_trade: TradeHighlight::default(),
            worst_trade: TradeHighlight::default(),
        }
    }
}

/// Compute all core metrics.
pub fn compute_core_metrics(trades: &[Trade], config: &MetricsConfig) -> CoreMetrics {
    let curve = compute_equity_curve(trades, config);
    core_metrics_with_curve(trades, &curve, config)
}

/// Compute core metrics reusing an already built equity curve.
pub fn core_metrics_with_curve(
    trades: &[Trade],
    curve: &EquityCurve,
    config: &MetricsConfig,
) -> CoreMetrics {
    if trades.is_empty() {
        return CoreMetrics::insufficient_data();
    }

    let wins: Vec<f64> = trades.iter().filter(|t| t.is_winner()).map(Trade::pnl_or_zero).collect();
    let losses: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_loser())
        .map(|t| t.pnl_or_zero().abs())
        .collect();

    let total_trades = trades.len();
    let total_pnl: f64 = trades.iter().map(Trade::pnl_or_zero).sum();
    let total_rr: f64 = trades.iter().map(Trade::rr_or_zero).sum();
    let gross_profit: f64 = wins.iter().sum();
    let gross_loss: f64 = losses.iter().sum();
    let avg_win = mean_f64(&wins);
    let avg_loss = mean_f64(&losses);

    let (best_trade, worst_trade) = best_and_worst(trades);

    CoreMetrics {
        insufficient_data: false,
        total_trades,
        wins: wins.len(),
        losses: losses.len(),
        breakeven: total_trades - wins.len() - losses.len(),
        total_pnl,
        gross_profit,
        gross_loss,
        avg_win,
        avg_loss,
        avg_pnl: total_pnl / total_trades as f64,
        total_rr,
        avg_rr: total_rr / total_trades as f64,
        long_pnl: direction_pnl(trades, Direction::Long),
        short_pnl: direction_pnl(trades, Direction::Short),
        win_rate: win_rate_pct(wins.len(), losses.len()),
        profit_factor: profit_factor(gross_profit, gross_loss),
        expectancy: expectancy(wins.len(), losses.len(), avg_win, avg_loss),
        kelly_percentage: kelly_percentage(wins.len(), losses.len(), avg_win, avg_loss),
        sharpe_ratio: sharpe_ratio(&curve.daily_returns(), config.trading_days_per_year),
        sortino_ratio: sortino_ratio(trades),
        recovery_factor: recovery_factor(total_pnl, curve.max_drawdown),
        max_drawdown: curve.max_drawdown,
        max_drawdown_percent: curve.max_drawdown_percent,
        max_consecutive_wins: max_consecutive(trades, true),
        max_consecutive_losses: max_consecutive(trades, false),
        best_trade,
        worst_trade,
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Kelly fraction in percent: `(w - (1 - w) / (avgWin / avgLoss)) * 100`.
///
/// `None` when there are no losses to size against. Zero when there are no
/// wins, since the payoff ratio is then undefined.
pub fn kelly_percentage(wins: usize, losses: usize, avg_win: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss.abs() < 1e-12 {
        return None;
    }
    if wins == 0 || avg_win <= 0.0 {
        return Some(0.0);
    }
    let w = wins as f64 / (wins + losses) as f64;
    let payoff = avg_win / avg_loss;
    Some((w - (1.0 - w) / payoff) * 100.0)
}

/// Annualized Sharpe ratio from daily returns.
///
/// `None` with fewer than 2 trading days or zero variance.
pub fn sharpe_ratio(daily_returns: &[f64], periods_per_year: u32) -> Option<f64> {
    if daily_returns.len() < 2 {
        return None;
    }
    let sd = std_dev(daily_returns);
    checked_ratio(mean_f64(daily_returns), sd).map(|r| r * f64::from(periods_per_year).sqrt())
}

/// Sortino ratio: mean trade P&L over downside deviation.
///
/// Downside deviation is the root mean square of negative P&L over all
/// trades. `None` when no trade lost money.
pub fn sortino_ratio(trades: &[Trade]) -> Option<f64> {
    if trades.is_empty() {
        return None;
    }
    let pnls: Vec<f64> = trades.iter().map(Trade::pnl_or_zero).collect();
    let downside_sq: f64 = pnls.iter().filter(|p| **p < 0.0).map(|p| p * p).sum();
    let downside_dev = (downside_sq / pnls.len() as f64).sqrt();
    checked_ratio(mean_f64(&pnls), downside_dev)
}

/// Total P&L over max drawdown; `None` without a drawdown.
pub fn recovery_factor(total_pnl: f64, max_drawdown: f64) -> Option<f64> {
    checked_ratio(total_pnl, max_drawdown)
}

/// Longest run of winning (pnl > 0) or non-winning trades, in date order.
///
/// Trades without a recorded P&L are skipped and do not break a run.
pub fn max_consecutive(trades: &[Trade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in chronological(trades) {
        let Some(pnl) = trade.pnl else {
            continue;
        };
        if (pnl > 0.0) == winners {
            current += 1;
            if current > max_streak {
                max_streak = current;
            }
        } else {
            current = 0;
        }
    }
    max_streak
}

fn direction_pnl(trades: &[Trade], direction: Direction) -> f64 {
    trades
        .iter()
        .filter(|t| t.direction == direction)
        .map(Trade::pnl_or_zero)
        .sum()
}

/// Best and worst trade by P&L. Ties keep the earliest in input order.
fn best_and_worst(trades: &[Trade]) -> (TradeHighlight, TradeHighlight) {
    let Some(first) = trades.first() else {
        return (TradeHighlight::default(), TradeHighlight::default());
    };
    let mut best = first;
    let mut worst = first;
    for trade in &trades[1..] {
        if trade.pnl_or_zero() > best.pnl_or_zero() {
            best = trade;
        }
        if trade.pnl_or_zero() < worst.pnl_or_zero() {
            worst = trade;
        }
    }
    (TradeHighlight::from_trade(best), TradeHighlight::from_trade(worst))
}
