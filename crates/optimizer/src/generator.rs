use crate::error::OptimizerError;
use configuration::{OptimizationSetting, ParameterRange, SettingMap};
use itertools::Itertools;
use serde_json::{json, Value};

// Absorbs float error when deciding whether `end` is reached.
const STEP_TOLERANCE: f64 = 1e-9;

/// Largest grid a job may expand to.
pub const MAX_COMBINATIONS: usize = 1_000_000;

/// Generates every combination of parameters from the defined parameter space.
///
/// Parameters vary in name order, the last name fastest, so the grid is the same on
/// every call.
pub fn generate_parameter_sets(setting: &OptimizationSetting) -> Result<Vec<SettingMap>, OptimizerError> {
    // 1. Convert all parameter ranges into concrete lists of values.
    let mut names = Vec::with_capacity(setting.parameters.len());
    let mut value_lists = Vec::with_capacity(setting.parameters.len());
    for (name, range) in &setting.parameters {
        names.push(name.clone());
        value_lists.push(expand_range(name, range)?);
    }

    let total = value_lists
        .iter()
        .try_fold(1usize, |acc, values| acc.checked_mul(values.len()))
        .filter(|total| *total <= MAX_COMBINATIONS);
    if total.is_none() {
        return Err(too_many_combinations());
    }

    if names.is_empty() {
        return Ok(vec![SettingMap::new()]);
    }

    // 2. Take the cartesian product of the lists.
    let combinations = value_lists
        .into_iter()
        .multi_cartesian_product()
        .map(|product| names.iter().cloned().zip(product).collect::<SettingMap>())
        .collect();

    Ok(combinations)
}

/// Validates an optimization job and returns its grid.
///
/// Rejects a job without a target or without any parameter to vary.
pub fn check_optimization_setting(setting: &OptimizationSetting) -> Result<Vec<SettingMap>, OptimizerError> {
    if setting.target_name.trim().is_empty() {
        return Err(OptimizerError::ParameterGeneration(
            "optimization target is not set".to_string(),
        ));
    }
    if setting.parameters.is_empty() {
        return Err(OptimizerError::ParameterGeneration(
            "optimization parameters are empty".to_string(),
        ));
    }
    generate_parameter_sets(setting)
}

fn expand_range(name: &str, range: &ParameterRange) -> Result<Vec<Value>, OptimizerError> {
    match range {
        ParameterRange::Fixed(value) => Ok(vec![value.clone()]),
        ParameterRange::Discrete(values) if values.is_empty() => Err(OptimizerError::ParameterGeneration(
            format!("'{name}' has an empty value list"),
        )),
        ParameterRange::Discrete(values) => Ok(values.clone()),
        ParameterRange::Linear { start, end, step } => linear_values(name, *start, *end, *step),
    }
}

fn linear_values(name: &str, start: f64, end: f64, step: f64) -> Result<Vec<Value>, OptimizerError> {
    if !(start.is_finite() && end.is_finite() && step.is_finite()) {
        return Err(OptimizerError::ParameterGeneration(format!(
            "range for '{name}' must be finite"
        )));
    }
    if step <= 0.0 {
        return Err(OptimizerError::ParameterGeneration(format!(
            "step for '{name}' must be positive, got {step}"
        )));
    }
    if start > end {
        return Err(OptimizerError::ParameterGeneration(format!(
            "start for '{name}' ({start}) is after end ({end})"
        )));
    }

    // Integral bounds yield integer parameters, so `fast_window = 5..15` stays an int.
    let integral = start.fract() == 0.0 && step.fract() == 0.0;
    let steps = ((end - start) / step + STEP_TOLERANCE).floor();
    if steps >= MAX_COMBINATIONS as f64 {
        return Err(too_many_combinations());
    }
    let count = steps as usize + 1;

    Ok((0..count)
        .map(|i| {
            let value = start + step * i as f64;
            if integral { json!(value as i64) } else { json!(value) }
        })
        .collect())
}

fn too_many_combinations() -> OptimizerError {
    OptimizerError::ParameterGeneration(format!(
        "parameter grid exceeds {MAX_COMBINATIONS} combinations"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(ranges: &[(&str, ParameterRange)]) -> OptimizationSetting {
        let mut setting = OptimizationSetting::new("sharpe_ratio");
        for (name, range) in ranges {
            setting.add_parameter(*name, range.clone());
        }
        setting
    }

    #[test]
    fn linear_integer_range_includes_end() {
        let values = linear_values("fast_window", 5.0, 15.0, 5.0).unwrap();
        assert_eq!(values, vec![json!(5), json!(10), json!(15)]);
    }

    #[test]
    fn linear_float_range_tolerates_rounding() {
        let values = linear_values("threshold", 0.1, 0.3, 0.1).unwrap();
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(Value::is_f64));
    }

    #[test]
    fn invalid_linear_ranges_are_rejected() {
        assert!(linear_values("x", 1.0, 5.0, 0.0).is_err());
        assert!(linear_values("x", 1.0, 5.0, -1.0).is_err());
        assert!(linear_values("x", 5.0, 1.0, 1.0).is_err());
        assert!(linear_values("x", 1.0, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn oversized_grids_are_rejected() {
        assert!(matches!(
            linear_values("threshold", 0.0, 1.0, 1e-12),
            Err(OptimizerError::ParameterGeneration(_))
        ));

        // 1001 * 1001 values pass one by one but not as a product.
        let wide = ParameterRange::Linear { start: 0.0, end: 1000.0, step: 1.0 };
        let result = generate_parameter_sets(&setting(&[("a", wide.clone()), ("b", wide)]));
        assert!(matches!(result, Err(OptimizerError::ParameterGeneration(_))));
    }

    #[test]
    fn grid_is_the_cartesian_product_in_name_order() {
        let grid = generate_parameter_sets(&setting(&[
            ("slow_window", ParameterRange::Discrete(vec![json!(20), json!(30)])),
            ("fast_window", ParameterRange::Linear { start: 5.0, end: 10.0, step: 5.0 }),
            ("fixed_size", ParameterRange::Fixed(json!(1))),
        ]))
        .unwrap();

        assert_eq!(grid.len(), 4);
        let pairs: Vec<(i64, i64)> = grid
            .iter()
            .map(|s| (s["fast_window"].as_i64().unwrap(), s["slow_window"].as_i64().unwrap()))
            .collect();
        assert_eq!(pairs, vec![(5, 20), (5, 30), (10, 20), (10, 30)]);
        assert!(grid.iter().all(|s| s["fixed_size"] == json!(1)));
    }

    #[test]
    fn check_rejects_empty_jobs() {
        assert!(check_optimization_setting(&OptimizationSetting::new("sharpe_ratio")).is_err());

        let mut no_target = setting(&[("fast_window", ParameterRange::Fixed(json!(5)))]);
        no_target.target_name = " ".to_string();
        assert!(check_optimization_setting(&no_target).is_err());

        let empty_list = setting(&[("fast_window", ParameterRange::Discrete(Vec::new()))]);
        assert!(check_optimization_setting(&empty_list).is_err());
    }
}
