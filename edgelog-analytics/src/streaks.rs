//! Streak report — runs of winning and losing trades in date order.
//!
//! Trades without a recorded P&L are skipped entirely. Every other trade is
//! winning (`pnl > 0`) or losing (`pnl <= 0`), so a breakeven trade extends
//! a losing run.

use chrono::NaiveDate;
use edgelog_core::domain::{chronological, Trade};
use serde::Serialize;

use crate::output::ser_f64;
use crate::stats::ratio_or_zero;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Winning,
    Losing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub kind: StreakKind,
    pub count: usize,
    #[serde(serialize_with = "ser_f64")]
    pub pnl: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Streak {
    fn start(kind: StreakKind, trade: &Trade, pnl: f64) -> Self {
        Self {
            kind,
            count: 1,
            pnl,
            start_date: trade.day(),
            end_date: trade.day(),
        }
    }

    fn extend(&mut self, trade: &Trade, pnl: f64) {
        self.count += 1;
        self.pnl += pnl;
        self.end_date = trade.day();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakReport {
    /// Trades with a recorded P&L.
    pub total_trades: usize,
    pub winning_trades: usize,
    #[serde(serialize_with = "ser_f64")]
    pub win_rate: f64,
    /// The run in progress at the latest trade.
    pub current_streak: Option<Streak>,
    pub longest_winning_streak: Option<Streak>,
    pub longest_losing_streak: Option<Streak>,
    /// Completed and current runs of more than one trade, oldest first.
    pub winning_streaks: Vec<Streak>,
    pub losing_streaks: Vec<Streak>,
}

pub fn compute_streaks(trades: &[Trade]) -> StreakReport {
    let mut runs: Vec<Streak> = Vec::new();
    let mut total = 0usize;
    let mut winning = 0usize;

    for trade in chronological(trades) {
        let Some(pnl) = trade.pnl else {
            continue;
        };
        total += 1;
        let kind = if pnl > 0.0 {
            winning += 1;
            StreakKind::Winning
        } else {
            StreakKind::Losing
        };
        if runs.last().is_some_and(|run| run.kind == kind) {
            if let Some(run) = runs.last_mut() {
                run.extend(trade, pnl);
            }
        } else {
            runs.push(Streak::start(kind, trade, pnl));
        }
    }

    let current_streak = runs.last().cloned();
    let multi = |kind: StreakKind| -> Vec<Streak> {
        runs.iter()
            .filter(|r| r.kind == kind && r.count > 1)
            .cloned()
            .collect()
    };
    let winning_streaks = multi(StreakKind::Winning);
    let losing_streaks = multi(StreakKind::Losing);

    StreakReport {
        total_trades: total,
        winning_trades: winning,
        win_rate: ratio_or_zero(winning as f64, total as f64) * 100.0,
        current_streak,
        longest_winning_streak: longest(&winning_streaks),
        longest_losing_streak: longest(&losing_streaks),
        winning_streaks,
        losing_streaks,
    }
}

/// First streak with the maximal count.
fn longest(streaks: &[Streak]) -> Option<Streak> {
    let mut best: Option<&Streak> = None;
    for s in streaks {
        if best.map_or(true, |b| s.count > b.count) {
            best = Some(s);
        }
    }
    best.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgelog_core::domain::Direction;

    fn series(pnls: &[Option<f64>]) -> Vec<Trade> {
        pnls.iter()
            .enumerate()
            .map(|(i, p)| {
                let date = NaiveDate::from_ymd_opt(2024, 6, i as u32 + 1)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap();
                let t = Trade::new("ES", Direction::Long, date);
                match p {
                    Some(p) => t.with_pnl(*p),
                    None => t,
                }
            })
            .collect()
    }

    #[test]
    fn reference_sequence() {
        let pnls: Vec<Option<f64>> = [1.0, 1.0, -1.0, 1.0, 1.0, 1.0, -1.0, -1.0]
            .iter()
            .map(|p| Some(*p))
            .collect();
        let r = compute_streaks(&series(&pnls));
        assert_eq!(r.longest_winning_streak.as_ref().unwrap().count, 3);
        assert_eq!(r.longest_losing_streak.as_ref().unwrap().count, 2);
        assert_eq!(r.winning_streaks.len(), 2);
        assert_eq!(r.losing_streaks.len(), 1);

        let current = r.current_streak.unwrap();
        assert_eq!(current.kind, StreakKind::Losing);
        assert_eq!(current.count, 2);
        assert_eq!(current.start_date, NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
        assert_eq!(r.win_rate, 62.5);
    }

    #[test]
    fn null_pnl_is_skipped_and_zero_is_losing() {
        let r = compute_streaks(&series(&[Some(-1.0), None, Some(0.0), Some(2.0)]));
        assert_eq!(r.total_trades, 3);
        let losing = r.longest_losing_streak.unwrap();
        assert_eq!(losing.count, 2);
        assert_eq!(losing.end_date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(r.current_streak.unwrap().kind, StreakKind::Winning);
        assert!(r.longest_winning_streak.is_none());
    }

    #[test]
    fn longest_ties_keep_earliest() {
        let pnls: Vec<Option<f64>> = [5.0, 5.0, -1.0, 7.0, 7.0]
            .iter()
            .map(|p| Some(*p))
            .collect();
        let r = compute_streaks(&series(&pnls));
        let longest = r.longest_winning_streak.unwrap();
        assert_eq!(longest.pnl, 10.0);
        assert_eq!(longest.start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn empty_input() {
        let r = compute_streaks(&[]);
        assert_eq!(r.total_trades, 0);
        assert_eq!(r.win_rate, 0.0);
        assert!(r.current_streak.is_none());
        assert!(r.winning_streaks.is_empty());
    }
}
