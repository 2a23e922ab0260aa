use crate::balance::BalanceCurve;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bin count of the daily P&L distribution panel.
pub const DEFAULT_HISTOGRAM_BINS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub balance: f64,
    pub drawdown: f64,
    pub drawdown_pct: f64,
    pub net_pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Data behind the four result panels: balance, drawdown, daily P&L and the
/// P&L distribution. Rendering is left to the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub points: Vec<ChartPoint>,
    pub pnl_histogram: Vec<HistogramBin>,
}

impl ChartData {
    pub fn from_curve(curve: &BalanceCurve, bins: usize) -> Self {
        let points: Vec<ChartPoint> = curve
            .points()
            .iter()
            .map(|p| ChartPoint {
                date: p.date,
                balance: p.balance,
                drawdown: p.drawdown,
                drawdown_pct: p.drawdown_pct,
                net_pnl: p.net_pnl,
            })
            .collect();
        let pnl: Vec<f64> = points.iter().map(|p| p.net_pnl).collect();

        Self {
            pnl_histogram: histogram(&pnl, bins),
            points,
        }
    }
}

/// Equal-width histogram over the finite values. The last bin includes its upper edge.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![HistogramBin {
            lower: min - 0.5,
            upper: max + 0.5,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in &finite {
        let index = (((value - min) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}
