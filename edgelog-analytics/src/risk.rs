//! Risk summary — R-multiple distribution and per-trade risk statistics.

use edgelog_core::domain::Trade;
use serde::Serialize;

use crate::output::{ser_f64, ser_f64_seq, ser_opt_f64};
use crate::stats::mean_f64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    /// Recorded R-multiples, in input order.
    #[serde(serialize_with = "ser_f64_seq")]
    pub r_multiples: Vec<f64>,
    #[serde(serialize_with = "ser_opt_f64")]
    pub avg_risk: Option<f64>,
    #[serde(serialize_with = "ser_opt_f64")]
    pub avg_r_multiple: Option<f64>,
    #[serde(serialize_with = "ser_opt_f64")]
    pub max_risk: Option<f64>,
    /// Threshold the over-risk count was measured against.
    #[serde(serialize_with = "ser_f64")]
    pub max_allowed_risk: f64,
    pub over_risk_count: usize,
    pub total_trades: usize,
}

/// Summarize risk. Averages are `None` when no trade records the field.
pub fn risk_summary(trades: &[Trade], max_allowed: f64) -> RiskSummary {
    let r_multiples: Vec<f64> = trades.iter().filter_map(|t| t.rr).collect();
    let risks: Vec<f64> = trades.iter().filter_map(|t| t.risk_amount).collect();

    RiskSummary {
        avg_risk: (!risks.is_empty()).then(|| mean_f64(&risks)),
        avg_r_multiple: (!r_multiples.is_empty()).then(|| mean_f64(&r_multiples)),
        max_risk: risks.iter().copied().reduce(f64::max),
        max_allowed_risk: max_allowed,
        over_risk_count: risks.iter().filter(|r| **r > max_allowed).count(),
        total_trades: trades.len(),
        r_multiples,
    }
}
