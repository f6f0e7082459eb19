//! Small numeric helpers shared by the metric modules.

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. Zero for fewer than 2 values.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// `num / den`, or `None` when the denominator is zero or the quotient is not finite.
pub(crate) fn checked_ratio(num: f64, den: f64) -> Option<f64> {
    if den.abs() < 1e-12 {
        return None;
    }
    let r = num / den;
    r.is_finite().then_some(r)
}

/// `num / den`, or zero when the denominator is zero.
pub(crate) fn ratio_or_zero(num: f64, den: f64) -> f64 {
    checked_ratio(num, den).unwrap_or(0.0)
}

/// Win rate in percent over decisive trades only.
pub(crate) fn win_rate_pct(wins: usize, losses: usize) -> f64 {
    let decisive = wins + losses;
    if decisive == 0 {
        return 0.0;
    }
    wins as f64 / decisive as f64 * 100.0
}

/// Profit factor: `None` when there is profit but no loss, `0` when there is neither.
pub(crate) fn profit_factor(gross_profit: f64, gross_loss: f64) -> Option<f64> {
    if gross_loss.abs() < 1e-12 {
        return if gross_profit > 0.0 { None } else { Some(0.0) };
    }
    Some(gross_profit / gross_loss)
}

/// `winProb * avgWin - lossProb * avgLoss`, probabilities over decisive trades.
pub(crate) fn expectancy(wins: usize, losses: usize, avg_win: f64, avg_loss: f64) -> f64 {
    let decisive = (wins + losses) as f64;
    if decisive == 0.0 {
        return 0.0;
    }
    (wins as f64 / decisive) * avg_win - (losses as f64 / decisive) * avg_loss
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std() {
        assert_eq!(mean_f64(&[]), 0.0);
        assert!((mean_f64(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-10);
        // population: sqrt(((1-2)^2 + 0 + (3-2)^2) / 3)
        assert!((std_dev(&[1.0, 2.0, 3.0]) - (2.0_f64 / 3.0).sqrt()).abs() < 1e-10);
        assert_eq!(std_dev(&[5.0]), 0.0);
    }

    #[test]
    fn ratio_guards() {
        assert_eq!(checked_ratio(1.0, 0.0), None);
        assert_eq!(checked_ratio(1.0, 4.0), Some(0.25));
        assert_eq!(ratio_or_zero(3.0, 0.0), 0.0);
    }

    #[test]
    fn profit_factor_edges() {
        assert_eq!(profit_factor(130.0, 50.0), Some(2.6));
        assert_eq!(profit_factor(10.0, 0.0), None);
        assert_eq!(profit_factor(0.0, 0.0), Some(0.0));
        assert_eq!(profit_factor(0.0, 10.0), Some(0.0));
    }

    #[test]
    fn win_rate_ignores_breakeven() {
        assert_eq!(win_rate_pct(0, 0), 0.0);
        assert!((win_rate_pct(2, 1) - 66.666_666_666).abs() < 1e-6);
    }

    #[test]
    fn expectancy_uses_decisive_trades() {
        let e = expectancy(2, 1, 65.0, 50.0);
        assert!((e - 80.0 / 3.0).abs() < 1e-10);
        assert_eq!(expectancy(0, 0, 0.0, 0.0), 0.0);
    }
}
