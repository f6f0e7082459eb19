//! Time-bucket aggregator.
//!
//! Four aggregations over the economic date:
//! - hour of day, all 24 buckets always present
//! - day of week, Monday = 0 through Sunday = 6, all 7 present
//! - ISO week, sparse, ascending
//! - calendar month, sparse, ascending, each with its own weekly breakdown
//!
//! Best and worst are picked among non-empty buckets by total P&L; on a tie
//! the bucket that comes first in key order wins (earliest hour, Monday before
//! Sunday, earliest week or month), regardless of the order trades arrive in.

use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use edgelog_core::domain::Trade;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::output::ser_f64;
use crate::stats::win_rate_pct;

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStats {
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
    #[serde(serialize_with = "ser_f64")]
    pub total_pnl: f64,
    #[serde(serialize_with = "ser_f64")]
    pub win_rate: f64,
}

impl BucketStats {
    fn record(&mut self, trade: &Trade) {
        self.trade_count += 1;
        self.total_pnl += trade.pnl_or_zero();
        if trade.is_winner() {
            self.wins += 1;
        } else if trade.is_loser() {
            self.losses += 1;
        }
        self.win_rate = win_rate_pct(self.wins, self.losses);
    }
}

/// A keyed bucket carrying [`BucketStats`].
pub trait Bucket: Clone {
    fn stats(&self) -> &BucketStats;
}

/// Buckets in key order plus the best and worst non-empty bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation<B> {
    pub buckets: Vec<B>,
    pub best: Option<B>,
    pub worst: Option<B>,
}

impl<B: Bucket> Aggregation<B> {
    pub fn from_buckets(buckets: Vec<B>) -> Self {
        let mut best: Option<&B> = None;
        let mut worst: Option<&B> = None;
        for bucket in buckets.iter().filter(|b| b.stats().trade_count > 0) {
            let pnl = bucket.stats().total_pnl;
            if best.map_or(true, |b| pnl > b.stats().total_pnl) {
                best = Some(bucket);
            }
            if worst.map_or(true, |w| pnl < w.stats().total_pnl) {
                worst = Some(bucket);
            }
        }
        let best = best.cloned();
        let worst = worst.cloned();
        Self {
            buckets,
            best,
            worst,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourBucket {
    pub hour: u32,
    #[serde(flatten)]
    pub stats: BucketStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayBucket {
    /// Monday = 0 … Sunday = 6.
    pub day: u32,
    pub name: String,
    #[serde(flatten)]
    pub stats: BucketStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    pub year: i32,
    pub week: u32,
    /// `2024-W03`
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `Jan 15 - Jan 21, 2024`
    pub formatted_range: String,
    #[serde(flatten)]
    pub stats: BucketStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    /// `2024-01`
    pub id: String,
    /// `January 2024`
    pub name: String,
    #[serde(flatten)]
    pub stats: BucketStats,
    /// ISO weeks restricted to this month's trades.
    pub weeks: Aggregation<WeekBucket>,
}

macro_rules! impl_bucket {
    ($($ty:ty),*) => {
        $(impl Bucket for $ty {
            fn stats(&self) -> &BucketStats {
                &self.stats
            }
        })*
    };
}

impl_bucket!(HourBucket, WeekdayBucket, WeekBucket, MonthBucket);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBuckets {
    pub hourly: Aggregation<HourBucket>,
    pub day_of_week: Aggregation<WeekdayBucket>,
    pub weekly: Aggregation<WeekBucket>,
    pub monthly: Aggregation<MonthBucket>,
}

pub fn compute_time_buckets(trades: &[Trade]) -> TimeBuckets {
    TimeBuckets {
        hourly: hourly(trades),
        day_of_week: day_of_week(trades),
        weekly: weekly(trades.iter()),
        monthly: monthly(trades),
    }
}

fn hourly(trades: &[Trade]) -> Aggregation<HourBucket> {
    let mut buckets: Vec<HourBucket> = (0..24)
        .map(|hour| HourBucket {
            hour,
            stats: BucketStats::default(),
        })
        .collect();
    for trade in trades {
        buckets[trade.date.hour() as usize].stats.record(trade);
    }
    Aggregation::from_buckets(buckets)
}

fn day_of_week(trades: &[Trade]) -> Aggregation<WeekdayBucket> {
    let mut buckets: Vec<WeekdayBucket> = WEEKDAY_NAMES
        .iter()
        .zip(0..)
        .map(|(name, day)| WeekdayBucket {
            day,
            name: (*name).to_string(),
            stats: BucketStats::default(),
        })
        .collect();
    for trade in trades {
        let idx = trade.date.weekday().num_days_from_monday() as usize;
        buckets[idx].stats.record(trade);
    }
    Aggregation::from_buckets(buckets)
}

fn week_bucket(year: i32, week: u32) -> Option<WeekBucket> {
    let start = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
    let end = NaiveDate::from_isoywd_opt(year, week, Weekday::Sun)?;
    Some(WeekBucket {
        year,
        week,
        label: format!("{year}-W{week:02}"),
        start_date: start,
        end_date: end,
        formatted_range: format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y")),
        stats: BucketStats::default(),
    })
}

fn weekly<'a>(trades: impl Iterator<Item = &'a Trade>) -> Aggregation<WeekBucket> {
    let mut weeks: BTreeMap<(i32, u32), WeekBucket> = BTreeMap::new();
    for trade in trades {
        let iso = trade.date.iso_week();
        let key = (iso.year(), iso.week());
        if !weeks.contains_key(&key) {
            match week_bucket(key.0, key.1) {
                Some(bucket) => {
                    weeks.insert(key, bucket);
                }
                None => continue,
            }
        }
        if let Some(bucket) = weeks.get_mut(&key) {
            bucket.stats.record(trade);
        }
    }
    Aggregation::from_buckets(weeks.into_values().collect())
}

fn monthly(trades: &[Trade]) -> Aggregation<MonthBucket> {
    let mut months: BTreeMap<(i32, u32), Vec<&Trade>> = BTreeMap::new();
    for trade in trades {
        months
            .entry((trade.date.year(), trade.date.month()))
            .or_default()
            .push(trade);
    }

    let buckets = months
        .into_iter()
        .filter_map(|((year, month), members)| {
            let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
            let mut stats = BucketStats::default();
            for trade in &members {
                stats.record(trade);
            }
            Some(MonthBucket {
                year,
                month,
                id: format!("{year}-{month:02}"),
                name: first_day.format("%B %Y").to_string(),
                stats,
                weeks: weekly(members.into_iter()),
            })
        })
        .collect();
    Aggregation::from_buckets(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgelog_core::domain::Direction;

    fn make_trade(month: u32, day: u32, hour: u32, pnl: f64) -> Trade {
        let date = NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap();
        Trade::new("NQ", Direction::Long, date).with_pnl(pnl)
    }

    #[test]
    fn empty_input_is_fully_enumerated() {
        let b = compute_time_buckets(&[]);
        assert_eq!(b.hourly.buckets.len(), 24);
        assert_eq!(b.day_of_week.buckets.len(), 7);
        assert!(b.weekly.buckets.is_empty());
        assert!(b.monthly.buckets.is_empty());
        assert!(b.hourly.best.is_none());
        assert!(b.hourly.worst.is_none());
    }

    #[test]
    fn hourly_buckets() {
        let trades = vec![
            make_trade(1, 15, 9, 100.0),
            make_trade(1, 16, 9, -40.0),
            make_trade(1, 16, 14, -60.0),
        ];
        let b = compute_time_buckets(&trades);
        let nine = &b.hourly.buckets[9].stats;
        assert_eq!(nine.trade_count, 2);
        assert_eq!(nine.total_pnl, 60.0);
        assert_eq!(nine.win_rate, 50.0);
        assert_eq!(b.hourly.best.as_ref().unwrap().hour, 9);
        assert_eq!(b.hourly.worst.as_ref().unwrap().hour, 14);
    }

    #[test]
    fn weekday_monday_is_zero() {
        // 2024-01-15 is a Monday, 2024-01-21 a Sunday.
        let trades = vec![make_trade(1, 15, 10, 5.0), make_trade(1, 21, 10, 7.0)];
        let b = compute_time_buckets(&trades);
        assert_eq!(b.day_of_week.buckets[0].name, "Monday");
        assert_eq!(b.day_of_week.buckets[0].stats.trade_count, 1);
        assert_eq!(b.day_of_week.buckets[6].name, "Sunday");
        assert_eq!(b.day_of_week.buckets[6].stats.trade_count, 1);
        assert_eq!(b.day_of_week.best.as_ref().unwrap().day, 6);
    }

    #[test]
    fn iso_weeks_have_rule_based_bounds() {
        let trades = vec![make_trade(1, 17, 10, 5.0)];
        let b = compute_time_buckets(&trades);
        let w = &b.weekly.buckets[0];
        assert_eq!(w.label, "2024-W03");
        assert_eq!(w.start_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(w.end_date, NaiveDate::from_ymd_opt(2024, 1, 21).unwrap());
        assert_eq!(w.formatted_range, "Jan 15 - Jan 21, 2024");
    }

    #[test]
    fn iso_week_crosses_year_boundary() {
        // 2024-12-30 belongs to ISO week 1 of 2025.
        let date = NaiveDate::from_ymd_opt(2024, 12, 30)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let trades = vec![Trade::new("NQ", Direction::Short, date).with_pnl(1.0)];
        let b = compute_time_buckets(&trades);
        assert_eq!(b.weekly.buckets[0].label, "2025-W01");
        assert_eq!(b.monthly.buckets[0].id, "2024-12");
    }

    #[test]
    fn months_nest_their_own_weeks() {
        // ISO week 5 of 2024 spans Jan 29 – Feb 4.
        let trades = vec![
            make_trade(1, 30, 10, 10.0),
            make_trade(2, 1, 10, 20.0),
            make_trade(2, 12, 10, -5.0),
        ];
        let b = compute_time_buckets(&trades);
        assert_eq!(b.monthly.buckets.len(), 2);

        let jan = &b.monthly.buckets[0];
        assert_eq!(jan.name, "January 2024");
        assert_eq!(jan.weeks.buckets.len(), 1);
        assert_eq!(jan.weeks.buckets[0].stats.total_pnl, 10.0);

        let feb = &b.monthly.buckets[1];
        assert_eq!(feb.id, "2024-02");
        assert_eq!(feb.weeks.buckets.len(), 2);
        assert_eq!(feb.weeks.buckets[0].stats.total_pnl, 20.0);

        // The global week 5 holds both sides of the month boundary.
        assert_eq!(b.weekly.buckets[0].stats.total_pnl, 30.0);
        assert_eq!(b.monthly.best.as_ref().unwrap().id, "2024-02");
        assert_eq!(b.monthly.worst.as_ref().unwrap().id, "2024-01");
    }

    #[test]
    fn ties_go_to_first_key() {
        let trades = vec![make_trade(1, 15, 8, 10.0), make_trade(1, 15, 11, 10.0)];
        let b = compute_time_buckets(&trades);
        assert_eq!(b.hourly.best.as_ref().unwrap().hour, 8);
        assert_eq!(b.hourly.worst.as_ref().unwrap().hour, 8);
    }

    #[test]
    fn ties_ignore_input_order() {
        // 2024-01-19 is a Friday, 2024-01-15 a Monday.
        let trades = vec![make_trade(1, 19, 14, 10.0), make_trade(1, 15, 9, 10.0)];
        let b = compute_time_buckets(&trades);
        assert_eq!(b.hourly.best.as_ref().unwrap().hour, 9);
        assert_eq!(b.day_of_week.best.as_ref().unwrap().day, 0);
        assert_eq!(b.day_of_week.worst.as_ref().unwrap().name, "Monday");
    }
}
