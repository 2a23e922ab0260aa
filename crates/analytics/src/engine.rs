use crate::balance::{BalanceCurve, BalancePoint};
use crate::chart::{ChartData, DEFAULT_HISTOGRAM_BINS};
use crate::error::AnalyticsError;
use crate::ewm::ewm_mean_std;
use crate::report::{StatisticsRecord, StatisticsStatus};
use configuration::StatisticsSettings;
use core_types::DailyResult;
use serde::{Deserialize, Serialize};

/// The statistics record together with the balance series it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub record: StatisticsRecord,
    pub curve: BalanceCurve,
}

impl StatisticsReport {
    pub fn chart(&self) -> ChartData {
        ChartData::from_curve(&self.curve, DEFAULT_HISTOGRAM_BINS)
    }
}

/// A stateless calculator turning daily results into performance statistics.
///
/// Each call to `calculate` starts from scratch; the same input always yields the
/// same record.
#[derive(Debug, Clone)]
pub struct StatisticsEngine {
    capital: f64,
    settings: StatisticsSettings,
}

impl StatisticsEngine {
    pub fn new(capital: f64, settings: StatisticsSettings) -> Result<Self, AnalyticsError> {
        settings
            .validate()
            .map_err(|e| AnalyticsError::InvalidSettings(e.to_string()))?;
        if !(capital.is_finite() && capital > 0.0) {
            return Err(AnalyticsError::InvalidSettings(format!(
                "capital must be positive, got {capital}"
            )));
        }
        Ok(Self { capital, settings })
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn settings(&self) -> &StatisticsSettings {
        &self.settings
    }

    /// Computes the statistics of a daily result series.
    ///
    /// Never fails: an empty series or a ruined account yields a zeroed record whose
    /// `status` says why.
    pub fn calculate(&self, results: &[DailyResult]) -> StatisticsReport {
        tracing::info!(days = results.len(), "Calculating strategy statistics");

        let curve = BalanceCurve::build(results, self.capital);
        let mut record = StatisticsRecord::empty(self.capital);

        if curve.is_empty() {
            tracing::info!("No daily results, statistics left empty");
        } else if let Some(ruin) = curve.ruin() {
            tracing::warn!(
                date = %ruin.date,
                balance = ruin.balance,
                "Balance fell to zero or below during the backtest, statistics not computed"
            );
            record.status = StatisticsStatus::Ruined { date: ruin.date };
        } else {
            self.fill_record(&mut record, results, curve.points());
            record.sanitize();
        }

        tracing::info!("Strategy statistics calculated");
        StatisticsReport { record, curve }
    }

    fn fill_record(&self, record: &mut StatisticsRecord, results: &[DailyResult], points: &[BalancePoint]) {
        let annual_days = self.settings.annual_days as f64;
        let days = points.len() as f64;

        // --- 1. Span and day counts ---
        record.status = StatisticsStatus::Valid;
        record.start_date = points.first().map(|p| p.date);
        record.end_date = points.last().map(|p| p.date);
        record.total_days = points.len() as u32;
        record.profit_days = points.iter().filter(|p| p.net_pnl > 0.0).count() as u32;
        record.loss_days = points.iter().filter(|p| p.net_pnl < 0.0).count() as u32;
        record.end_balance = points.last().map(|p| p.balance).unwrap_or(self.capital);

        // --- 2. Drawdown ---
        record.max_drawdown = points.iter().map(|p| p.drawdown).fold(f64::INFINITY, f64::min);
        record.max_ddpercent = points.iter().map(|p| p.drawdown_pct).fold(f64::INFINITY, f64::min);
        record.max_drawdown_duration = max_drawdown_duration(points);

        // --- 3. Totals and per-day averages ---
        record.total_net_pnl = results.iter().map(|r| r.net_pnl).sum();
        record.total_commission = results.iter().map(|r| r.commission).sum();
        record.total_slippage = results.iter().map(|r| r.slippage).sum();
        record.total_turnover = results.iter().map(|r| r.turnover).sum();
        record.total_trade_count = results.iter().map(|r| u64::from(r.trade_count)).sum();
        record.daily_net_pnl = record.total_net_pnl / days;
        record.daily_commission = record.total_commission / days;
        record.daily_slippage = record.total_slippage / days;
        record.daily_turnover = record.total_turnover / days;
        record.daily_trade_count = record.total_trade_count as f64 / days;

        // --- 4. Returns ---
        let returns: Vec<f64> = points.iter().map(|p| p.log_return).collect();
        record.total_return = (record.end_balance / self.capital - 1.0) * 100.0;
        record.annual_return = record.total_return / days * annual_days;
        record.daily_return = mean(&returns) * 100.0;
        record.return_std = sample_std(&returns) * 100.0;

        // --- 5. Risk-adjusted ratios ---
        if record.return_std != 0.0 {
            let daily_risk_free = self.settings.risk_free / annual_days.sqrt();
            record.sharpe_ratio =
                (record.daily_return - daily_risk_free) / record.return_std * annual_days.sqrt();

            let (ewm_mean, ewm_std) = ewm_mean_std(&returns, self.settings.half_life);
            if let (Some(m), Some(s)) = (ewm_mean.last(), ewm_std.last()) {
                record.ewm_sharpe =
                    (m * 100.0 - daily_risk_free) / (s * 100.0) * annual_days.sqrt();
            }
        }

        if record.max_ddpercent != 0.0 {
            record.return_drawdown_ratio = -record.total_return / record.max_ddpercent;
        }
    }
}

/// Calendar days from the last high-water mark to the deepest percentage drawdown.
fn max_drawdown_duration(points: &[BalancePoint]) -> i64 {
    let Some((deepest, _)) = points
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |best, (i, p)| match best {
            Some((_, pct)) if p.drawdown_pct >= pct => best,
            _ => Some((i, p.drawdown_pct)),
        })
    else {
        return 0;
    };

    let trough = &points[deepest];
    points[..=deepest]
        .iter()
        .rev()
        .find(|p| p.balance == trough.high_water_mark)
        .map(|peak| (trough.date - peak.date).num_days())
        .unwrap_or(0)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with the n-1 denominator; zero below two observations.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}
