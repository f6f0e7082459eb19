//! Trade — a normalized, closed trade as consumed by every analytics component.

use super::ids::TradeId;
use super::tags::{TagMap, TagPair, TagValue};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Case-insensitive parse. Broker exports often say buy/sell.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "long" | "buy" | "l" => Some(Self::Long),
            "short" | "sell" | "s" => Some(Self::Short),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// Win/loss classification of a single trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    /// `pnl == 0` or no pnl recorded. Counted as a trade, never as a win or loss.
    Breakeven,
}

/// A normalized trade record.
///
/// `date` is already resolved (economic date, else creation time), so it is
/// always present and is the only timestamp used for ordering and bucketing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Option<TradeId>,
    pub symbol: String,
    pub direction: Direction,

    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,

    pub pnl: Option<f64>,
    pub rr: Option<f64>,
    pub risk_amount: Option<f64>,

    pub date: NaiveDateTime,
    pub created_at: Option<NaiveDateTime>,

    pub strategy: Option<String>,
    pub notes: Option<String>,
    pub tags: TagMap,
}

impl Trade {
    /// Minimal trade with defaults for every optional field.
    pub fn new(symbol: impl Into<String>, direction: Direction, date: NaiveDateTime) -> Self {
        Self {
            id: None,
            symbol: symbol.into().trim().to_uppercase(),
            direction,
            entry_price: 0.0,
            exit_price: 0.0,
            quantity: 1.0,
            pnl: None,
            rr: None,
            risk_amount: None,
            date,
            created_at: None,
            strategy: None,
            notes: None,
            tags: TagMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(TradeId::new(id));
        self
    }

    pub fn with_pnl(mut self, pnl: f64) -> Self {
        self.pnl = Some(pnl);
        self
    }

    pub fn with_rr(mut self, rr: f64) -> Self {
        self.rr = Some(rr);
        self
    }

    pub fn with_risk(mut self, risk_amount: f64) -> Self {
        self.risk_amount = Some(risk_amount);
        self
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Add a single-valued tag (ignored if reserved or already set).
    pub fn with_tag(mut self, name: &str, value: &str) -> Self {
        if let Some(v) = TagValue::single(value) {
            self.tags.insert(name, v);
        }
        self
    }

    /// Add a multi-valued tag (ignored if reserved, empty, or already set).
    pub fn with_tag_values(mut self, name: &str, values: &[&str]) -> Self {
        if let Some(v) = TagValue::multi(values) {
            self.tags.insert(name, v);
        }
        self
    }

    /// P&L with null treated as zero, for summation.
    pub fn pnl_or_zero(&self) -> f64 {
        self.pnl.unwrap_or(0.0)
    }

    /// R-multiple with null treated as zero, for summation.
    pub fn rr_or_zero(&self) -> f64 {
        self.rr.unwrap_or(0.0)
    }

    pub fn outcome(&self) -> Outcome {
        match self.pnl {
            Some(p) if p > 0.0 => Outcome::Win,
            Some(p) if p < 0.0 => Outcome::Loss,
            _ => Outcome::Breakeven,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.outcome() == Outcome::Win
    }

    pub fn is_loser(&self) -> bool {
        self.outcome() == Outcome::Loss
    }

    /// Calendar day of the economic date.
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    pub fn tag_pairs(&self) -> Vec<TagPair> {
        self.tags.pairs()
    }

    /// Chronological ordering: economic date, then creation time.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.created_at.cmp(&other.created_at))
    }
}

/// Borrowed view of `trades` in chronological order.
///
/// Stable: trades with identical timestamps keep their input order.
pub fn chronological(trades: &[Trade]) -> Vec<&Trade> {
    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by(|a, b| a.chronological_cmp(b));
    ordered
}
