use crate::error::StrategyError;
use configuration::SettingMap;
use serde::Serialize;
use serde_json::{json, Value};

/// Typed default of a strategy parameter. The type of the default is the type the
/// parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterDefault {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(&'static str),
}

impl ParameterDefault {
    pub fn to_value(&self) -> Value {
        match self {
            ParameterDefault::Int(v) => json!(v),
            ParameterDefault::Float(v) => json!(v),
            ParameterDefault::Bool(v) => json!(v),
            ParameterDefault::Text(v) => json!(v),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ParameterDefault::Int(_) => "an integer",
            ParameterDefault::Float(_) => "a number",
            ParameterDefault::Bool(_) => "a boolean",
            ParameterDefault::Text(_) => "a string",
        }
    }

    /// Normalises `value` to this parameter's type. Integral floats are accepted for
    /// integer parameters since optimization ranges produce floats.
    fn coerce(&self, value: &Value) -> Option<Value> {
        match self {
            ParameterDefault::Int(_) => value
                .as_i64()
                .or_else(|| {
                    value
                        .as_f64()
                        .filter(|v| v.is_finite() && v.fract() == 0.0)
                        .map(|v| v as i64)
                })
                .map(|v| json!(v)),
            ParameterDefault::Float(_) => value.as_f64().map(|v| json!(v)),
            ParameterDefault::Bool(_) => value.as_bool().map(|v| json!(v)),
            ParameterDefault::Text(_) => value.as_str().map(|v| json!(v)),
        }
    }
}

/// One entry of a strategy class's parameter schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub default: ParameterDefault,
}

impl ParameterSpec {
    pub const fn int(name: &'static str, default: i64) -> Self {
        Self { name, default: ParameterDefault::Int(default) }
    }

    pub const fn float(name: &'static str, default: f64) -> Self {
        Self { name, default: ParameterDefault::Float(default) }
    }

    pub const fn bool(name: &'static str, default: bool) -> Self {
        Self { name, default: ParameterDefault::Bool(default) }
    }

    pub const fn text(name: &'static str, default: &'static str) -> Self {
        Self { name, default: ParameterDefault::Text(default) }
    }
}

/// The class-level list of tunable parameters.
pub type ParameterSchema = &'static [ParameterSpec];

/// Schema defaults as a settings mapping.
pub fn class_parameters(schema: ParameterSchema) -> SettingMap {
    schema
        .iter()
        .map(|spec| (spec.name.to_string(), spec.default.to_value()))
        .collect()
}

/// The parameter values of one strategy instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StrategyParameters {
    values: SettingMap,
}

impl StrategyParameters {
    pub fn defaults(schema: ParameterSchema) -> Self {
        Self { values: class_parameters(schema) }
    }

    /// Schema defaults overwritten by matching entries of `setting`.
    ///
    /// Keys the schema does not declare are ignored.
    pub fn from_setting(schema: ParameterSchema, setting: &SettingMap) -> Result<Self, StrategyError> {
        let mut values = SettingMap::new();
        for spec in schema {
            let value = match setting.get(spec.name) {
                Some(raw) => spec.default.coerce(raw).ok_or_else(|| {
                    StrategyError::InvalidParameters(format!(
                        "'{}' expects {} but got {}",
                        spec.name,
                        spec.default.kind(),
                        raw
                    ))
                })?,
                None => spec.default.to_value(),
            };
            values.insert(spec.name.to_string(), value);
        }

        for key in setting.keys() {
            if !values.contains_key(key) {
                tracing::debug!(parameter = %key, "Ignoring undeclared strategy parameter");
            }
        }

        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, StrategyError> {
        self.lookup(name)?
            .as_i64()
            .ok_or_else(|| type_error(name, "an integer"))
    }

    pub fn get_usize(&self, name: &str) -> Result<usize, StrategyError> {
        let value = self.get_i64(name)?;
        usize::try_from(value).map_err(|_| {
            StrategyError::InvalidParameters(format!("'{name}' must not be negative, got {value}"))
        })
    }

    pub fn get_f64(&self, name: &str) -> Result<f64, StrategyError> {
        self.lookup(name)?
            .as_f64()
            .ok_or_else(|| type_error(name, "a number"))
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, StrategyError> {
        self.lookup(name)?
            .as_bool()
            .ok_or_else(|| type_error(name, "a boolean"))
    }

    pub fn get_str(&self, name: &str) -> Result<&str, StrategyError> {
        self.lookup(name)?
            .as_str()
            .ok_or_else(|| type_error(name, "a string"))
    }

    pub fn to_map(&self) -> SettingMap {
        self.values.clone()
    }

    fn lookup(&self, name: &str) -> Result<&Value, StrategyError> {
        self.values
            .get(name)
            .ok_or_else(|| StrategyError::InvalidParameters(format!("unknown parameter '{name}'")))
    }
}

fn type_error(name: &str, kind: &str) -> StrategyError {
    StrategyError::InvalidParameters(format!("'{name}' is not {kind}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: ParameterSchema = &[
        ParameterSpec::int("fast_window", 10),
        ParameterSpec::float("stop_pct", 0.5),
        ParameterSpec::bool("allow_short", true),
        ParameterSpec::text("label", "demo"),
    ];

    fn setting(value: Value) -> SettingMap {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn defaults_fill_missing_entries() {
        let params = StrategyParameters::from_setting(SCHEMA, &setting(json!({ "fast_window": 7 }))).unwrap();
        assert_eq!(params.get_i64("fast_window").unwrap(), 7);
        assert_eq!(params.get_f64("stop_pct").unwrap(), 0.5);
        assert!(params.get_bool("allow_short").unwrap());
        assert_eq!(params.get_str("label").unwrap(), "demo");
    }

    #[test]
    fn undeclared_keys_are_ignored() {
        let params =
            StrategyParameters::from_setting(SCHEMA, &setting(json!({ "slow_window": 30 }))).unwrap();
        assert!(params.get("slow_window").is_none());
        assert_eq!(params, StrategyParameters::defaults(SCHEMA));
    }

    #[test]
    fn integral_floats_are_accepted_for_integers() {
        let params =
            StrategyParameters::from_setting(SCHEMA, &setting(json!({ "fast_window": 15.0 }))).unwrap();
        assert_eq!(params.get_i64("fast_window").unwrap(), 15);
        assert_eq!(params.get_usize("fast_window").unwrap(), 15);
    }

    #[test]
    fn mistyped_values_are_rejected() {
        for bad in [
            json!({ "fast_window": 1.5 }),
            json!({ "stop_pct": "wide" }),
            json!({ "allow_short": 1 }),
            json!({ "label": 3 }),
        ] {
            assert!(matches!(
                StrategyParameters::from_setting(SCHEMA, &setting(bad)),
                Err(StrategyError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn negative_window_is_not_a_usize() {
        let params =
            StrategyParameters::from_setting(SCHEMA, &setting(json!({ "fast_window": -3 }))).unwrap();
        assert!(params.get_usize("fast_window").is_err());
    }

    #[test]
    fn class_parameters_lists_schema_defaults() {
        let defaults = class_parameters(SCHEMA);
        assert_eq!(defaults.len(), 4);
        assert_eq!(defaults["fast_window"], json!(10));
        assert_eq!(defaults["label"], json!("demo"));
    }
}
