//! Exponentially-weighted moments with half-life decay.
//!
//! Weights follow the "adjusted" convention: the observation `i` steps back from
//! the latest has weight `(1 - alpha)^i`, normalised by the sum of weights. The
//! variance carries the unbiased correction `W² / (W² - Σw²)`, so the first point,
//! with a single observation, has no defined deviation (`NaN`).

/// Smoothing factor for a half-life expressed in observations.
pub fn halflife_alpha(half_life: f64) -> f64 {
    1.0 - (0.5_f64.ln() / half_life).exp()
}

/// Running exponentially-weighted mean and standard deviation of `values`.
///
/// Both outputs have the same length as the input.
pub fn ewm_mean_std(values: &[f64], half_life: f64) -> (Vec<f64>, Vec<f64>) {
    let mut means = Vec::with_capacity(values.len());
    let mut stds = Vec::with_capacity(values.len());
    let Some((&first, rest)) = values.split_first() else {
        return (means, stds);
    };

    let decay = 1.0 - halflife_alpha(half_life);
    let mut mean = first;
    let mut cov = 0.0;
    let mut sum_wt = 1.0;
    let mut sum_wt2 = 1.0;
    let mut old_wt = 1.0;

    means.push(mean);
    stds.push(f64::NAN);

    for &value in rest {
        sum_wt *= decay;
        sum_wt2 *= decay * decay;
        old_wt *= decay;

        let old_mean = mean;
        // Constant stretches keep the mean exact.
        if mean != value {
            mean = (old_wt * old_mean + value) / (old_wt + 1.0);
        }
        cov = (old_wt * (cov + (old_mean - mean) * (old_mean - mean))
            + (value - mean) * (value - mean))
            / (old_wt + 1.0);

        sum_wt += 1.0;
        sum_wt2 += 1.0;
        old_wt += 1.0;

        let numerator = sum_wt * sum_wt;
        let denominator = numerator - sum_wt2;
        let variance = if denominator > 0.0 {
            numerator / denominator * cov
        } else {
            f64::NAN
        };

        means.push(mean);
        stds.push(variance.sqrt());
    }

    (means, stds)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct evaluation of the weighted definition, O(n²).
    fn reference(values: &[f64], half_life: f64) -> (Vec<f64>, Vec<f64>) {
        let decay = 1.0 - halflife_alpha(half_life);
        let mut means = Vec::new();
        let mut stds = Vec::new();
        for t in 0..values.len() {
            let weights: Vec<f64> = (0..=t).map(|i| decay.powi((t - i) as i32)).collect();
            let total: f64 = weights.iter().sum();
            let total_sq: f64 = weights.iter().map(|w| w * w).sum();
            let mean = weights.iter().zip(values).map(|(w, x)| w * x).sum::<f64>() / total;
            let biased = weights
                .iter()
                .zip(values)
                .map(|(w, x)| w * (x - mean) * (x - mean))
                .sum::<f64>()
                / total;
            let denominator = total * total - total_sq;
            means.push(mean);
            stds.push(if denominator > 0.0 {
                (biased * total * total / denominator).sqrt()
            } else {
                f64::NAN
            });
        }
        (means, stds)
    }

    #[test]
    fn alpha_halves_weight_after_half_life() {
        let alpha = halflife_alpha(10.0);
        assert!(((1.0 - alpha).powi(10) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn recursion_matches_weighted_definition() {
        let values = [
            0.0012, -0.0031, 0.0045, 0.0008, -0.0022, 0.0017, -0.0009, 0.0030, -0.0041, 0.0011,
            0.0006, -0.0014,
        ];
        let (means, stds) = ewm_mean_std(&values, 5.0);
        let (ref_means, ref_stds) = reference(&values, 5.0);

        assert!(stds[0].is_nan() && ref_stds[0].is_nan());
        for i in 0..values.len() {
            assert!((means[i] - ref_means[i]).abs() < 1e-15);
            if i > 0 {
                assert!((stds[i] - ref_stds[i]).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn constant_series_has_zero_deviation() {
        let (means, stds) = ewm_mean_std(&[0.5; 6], 120.0);
        assert!(means.iter().all(|m| *m == 0.5));
        assert!(stds[1..].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let (means, stds) = ewm_mean_std(&[], 120.0);
        assert!(means.is_empty() && stds.is_empty());
    }
}
