use chrono::NaiveDate;
use core_types::DailyResult;
use serde::{Deserialize, Serialize};

/// One day of the derived balance series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub net_pnl: f64,
    pub balance: f64,
    /// Natural log of today's balance over yesterday's; 0 when the ratio is not positive.
    pub log_return: f64,
    pub high_water_mark: f64,
    /// `balance - high_water_mark`, never positive.
    pub drawdown: f64,
    pub drawdown_pct: f64,
}

/// Account balance over time, derived from daily results and a starting capital.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BalanceCurve {
    points: Vec<BalancePoint>,
}

impl BalanceCurve {
    /// Builds the curve from rows ordered by date. Rows are re-sorted by date
    /// (stably) before accumulating.
    pub fn build(results: &[DailyResult], capital: f64) -> Self {
        let mut rows: Vec<&DailyResult> = results.iter().collect();
        rows.sort_by_key(|row| row.date);

        let mut points = Vec::with_capacity(rows.len());
        let mut balance = capital;
        let mut high_water_mark = f64::NEG_INFINITY;

        for row in rows {
            let pre_balance = balance;
            balance += row.net_pnl;

            let ratio = balance / pre_balance;
            let log_return = if ratio > 0.0 { ratio.ln() } else { 0.0 };

            high_water_mark = high_water_mark.max(balance);
            let drawdown = balance - high_water_mark;

            points.push(BalancePoint {
                date: row.date,
                net_pnl: row.net_pnl,
                balance,
                log_return,
                high_water_mark,
                drawdown,
                drawdown_pct: drawdown / high_water_mark * 100.0,
            });
        }

        Self { points }
    }

    pub fn points(&self) -> &[BalancePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The first day the balance is zero or negative, if any.
    pub fn ruin(&self) -> Option<&BalancePoint> {
        self.points.iter().find(|point| point.balance <= 0.0)
    }
}
