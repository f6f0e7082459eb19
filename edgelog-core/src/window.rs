//! Analysis window — restrict a trade set to a date range before analysis.
//!
//! `last_days` is resolved against an explicit `as_of` date supplied by the
//! caller; nothing in the core reads the system clock.

use crate::domain::Trade;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeWindow {
    /// Inclusive lower bound on the trade's economic date.
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound.
    #[serde(default)]
    pub to: Option<NaiveDate>,
    /// Keep trades from the `last_days` days ending at `as_of` (inclusive).
    #[serde(default)]
    pub last_days: Option<u32>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl TradeWindow {
    /// The unbounded window.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn last_days(days: u32, as_of: NaiveDate) -> Self {
        Self {
            last_days: Some(days),
            as_of: Some(as_of),
            ..Self::default()
        }
    }

    /// Effective `(lower, upper)` bounds after combining explicit dates with
    /// the relative range. The tighter bound wins on each side.
    pub fn bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let mut lower = self.from;
        let mut upper = self.to;
        if let (Some(days), Some(as_of)) = (self.last_days, self.as_of) {
            let start = as_of
                .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
                .unwrap_or(NaiveDate::MIN);
            lower = Some(lower.map_or(start, |l| l.max(start)));
            upper = Some(upper.map_or(as_of, |u| u.min(as_of)));
        }
        (lower, upper)
    }

    pub fn is_unbounded(&self) -> bool {
        self.bounds() == (None, None)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let (lower, upper) = self.bounds();
        lower.map_or(true, |l| date >= l) && upper.map_or(true, |u| date <= u)
    }

    /// Trades inside the window, in input order.
    pub fn apply(&self, trades: &[Trade]) -> Vec<Trade> {
        if self.is_unbounded() {
            return trades.to_vec();
        }
        trades
            .iter()
            .filter(|t| self.contains(t.day()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn trades() -> Vec<Trade> {
        (1..=10)
            .map(|day| Trade::new("ES", Direction::Long, d(day).and_hms_opt(12, 0, 0).unwrap()))
            .collect()
    }

    #[test]
    fn unbounded_keeps_everything() {
        assert_eq!(TradeWindow::all().apply(&trades()).len(), 10);
    }

    #[test]
    fn between_is_inclusive() {
        let kept = TradeWindow::between(d(3), d(5)).apply(&trades());
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].day(), d(3));
        assert_eq!(kept[2].day(), d(5));
    }

    #[test]
    fn last_days_counts_as_of() {
        let kept = TradeWindow::last_days(3, d(8)).apply(&trades());
        let days: Vec<NaiveDate> = kept.iter().map(Trade::day).collect();
        assert_eq!(days, vec![d(6), d(7), d(8)]);
    }

    #[test]
    fn tighter_bound_wins() {
        let window = TradeWindow {
            from: Some(d(7)),
            to: None,
            last_days: Some(5),
            as_of: Some(d(9)),
        };
        assert_eq!(window.bounds(), (Some(d(7)), Some(d(9))));
        assert_eq!(window.apply(&trades()).len(), 3);
    }

    #[test]
    fn last_days_without_as_of_is_ignored() {
        let window = TradeWindow {
            last_days: Some(2),
            ..TradeWindow::default()
        };
        assert!(window.is_unbounded());
    }
}
