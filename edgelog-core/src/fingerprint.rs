//! Dataset fingerprinting — a deterministic content hash of a normalized trade set.
//!
//! Each trade is rendered to one canonical line (tags in key order, floats in
//! shortest round-trip form), lines are sorted, then hashed with BLAKE3. The
//! hash therefore ignores input order but changes with any field value.

use crate::domain::{DatasetHash, Trade};
use std::fmt::Write as _;

fn opt_f64(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "-".to_string())
}

fn canonical_line(trade: &Trade) -> String {
    let mut line = String::new();
    let _ = write!(
        line,
        "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
        trade.id.as_ref().map(|id| id.as_str()).unwrap_or("-"),
        trade.symbol,
        trade.direction,
        trade.entry_price,
        trade.exit_price,
        trade.quantity,
        opt_f64(trade.pnl),
        opt_f64(trade.rr),
        opt_f64(trade.risk_amount),
        trade.date.format("%Y-%m-%dT%H:%M:%S%.f"),
        trade
            .created_at
            .map(|c| c.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            .unwrap_or_else(|| "-".to_string()),
        trade.strategy.as_deref().unwrap_or("-"),
    );
    for pair in trade.tag_pairs() {
        let _ = write!(line, "|{pair}");
    }
    line
}

/// Hash a trade set. Equal sets (in any order) give equal hashes.
pub fn dataset_hash(trades: &[Trade]) -> DatasetHash {
    let mut lines: Vec<String> = trades.iter().map(canonical_line).collect();
    lines.sort();
    let mut hasher = blake3::Hasher::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    DatasetHash(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use chrono::NaiveDate;

    fn trade(symbol: &str, pnl: f64) -> Trade {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Trade::new(symbol, Direction::Long, date)
            .with_pnl(pnl)
            .with_tag("setup", "A")
    }

    #[test]
    fn order_independent() {
        let a = vec![trade("ES", 10.0), trade("NQ", -5.0)];
        let b = vec![trade("NQ", -5.0), trade("ES", 10.0)];
        assert_eq!(dataset_hash(&a), dataset_hash(&b));
    }

    #[test]
    fn sensitive_to_values() {
        let a = vec![trade("ES", 10.0)];
        let b = vec![trade("ES", 10.5)];
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
    }

    #[test]
    fn sensitive_to_tags() {
        let a = vec![trade("ES", 10.0)];
        let b = vec![trade("ES", 10.0).with_tag("session", "ny")];
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
    }

    #[test]
    fn empty_set_hashes() {
        assert_eq!(dataset_hash(&[]).0.len(), 64);
    }
}
