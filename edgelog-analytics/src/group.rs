//! Per-group statistics shared by tag, variable, symbol and strategy breakdowns.
//!
//! Trades must be pushed in chronological order: drawdown and the cumulative
//! series are computed over the group's own subsequence.

use chrono::NaiveDate;
use edgelog_core::domain::Trade;
use serde::Serialize;

use crate::output::{ser_f64, ser_f64_seq, ser_opt_f64};
use crate::stats::{expectancy, mean_f64, profit_factor, ratio_or_zero, std_dev, win_rate_pct};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMetrics {
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    #[serde(serialize_with = "ser_f64")]
    pub win_rate: f64,
    #[serde(serialize_with = "ser_f64")]
    pub total_pnl: f64,
    #[serde(serialize_with = "ser_f64")]
    pub avg_rr: f64,
    #[serde(serialize_with = "ser_opt_f64")]
    pub profit_factor: Option<f64>,
    #[serde(serialize_with = "ser_f64")]
    pub gross_profit: f64,
    #[serde(serialize_with = "ser_f64")]
    pub gross_loss: f64,
    #[serde(serialize_with = "ser_f64")]
    pub avg_win: f64,
    #[serde(serialize_with = "ser_f64")]
    pub avg_loss: f64,
    #[serde(serialize_with = "ser_f64")]
    pub max_win: f64,
    /// Largest single loss, as a negative number.
    #[serde(serialize_with = "ser_f64")]
    pub max_loss: f64,
    #[serde(serialize_with = "ser_f64")]
    pub expectancy: f64,
    #[serde(serialize_with = "ser_f64")]
    pub max_drawdown: f64,
    #[serde(serialize_with = "ser_f64")]
    pub consistency_score: f64,
    #[serde(serialize_with = "ser_f64_seq")]
    pub cumulative_pnl: Vec<f64>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Running accumulator for one group.
#[derive(Debug, Clone, Default)]
pub(crate) struct GroupAccumulator {
    trades: usize,
    total_pnl: f64,
    total_rr: f64,
    win_amounts: Vec<f64>,
    loss_amounts: Vec<f64>,
    peak: f64,
    max_drawdown: f64,
    cumulative: Vec<f64>,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
}

impl GroupAccumulator {
    pub(crate) fn push(&mut self, trade: &Trade) {
        let pnl = trade.pnl_or_zero();
        self.trades += 1;
        self.total_pnl += pnl;
        self.total_rr += trade.rr_or_zero();

        if trade.is_winner() {
            self.win_amounts.push(pnl);
        } else if trade.is_loser() {
            self.loss_amounts.push(pnl.abs());
        }

        if self.total_pnl > self.peak {
            self.peak = self.total_pnl;
        }
        let drawdown = self.peak - self.total_pnl;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
        self.cumulative.push(self.total_pnl);

        let day = trade.day();
        self.first_date = Some(self.first_date.map_or(day, |d| d.min(day)));
        self.last_date = Some(self.last_date.map_or(day, |d| d.max(day)));
    }

    pub(crate) fn finish(self) -> GroupMetrics {
        let wins = self.win_amounts.len();
        let losses = self.loss_amounts.len();
        let gross_profit: f64 = self.win_amounts.iter().sum();
        let gross_loss: f64 = self.loss_amounts.iter().sum();
        let avg_win = mean_f64(&self.win_amounts);
        let avg_loss = mean_f64(&self.loss_amounts);

        GroupMetrics {
            trades: self.trades,
            wins,
            losses,
            win_rate: win_rate_pct(wins, losses),
            total_pnl: self.total_pnl,
            avg_rr: ratio_or_zero(self.total_rr, self.trades as f64),
            profit_factor: profit_factor(gross_profit, gross_loss),
            gross_profit,
            gross_loss,
            avg_win,
            avg_loss,
            max_win: self.win_amounts.iter().copied().fold(0.0, f64::max),
            max_loss: -self.loss_amounts.iter().copied().fold(0.0, f64::max),
            expectancy: expectancy(wins, losses, avg_win, avg_loss),
            max_drawdown: self.max_drawdown,
            consistency_score: consistency_score(&self.win_amounts, &self.loss_amounts),
            cumulative_pnl: self.cumulative,
            first_date: self.first_date,
            last_date: self.last_date,
        }
    }
}

/// `1 / (1 + winStd/avgWin + lossStd/avgLoss)`, each ratio zero when its
/// average is zero. Zero for a group with no decisive trades.
pub fn consistency_score(win_amounts: &[f64], loss_amounts: &[f64]) -> f64 {
    if win_amounts.is_empty() && loss_amounts.is_empty() {
        return 0.0;
    }
    let win_cv = ratio_or_zero(std_dev(win_amounts), mean_f64(win_amounts));
    let loss_cv = ratio_or_zero(std_dev(loss_amounts), mean_f64(loss_amounts));
    1.0 / (1.0 + win_cv + loss_cv)
}
