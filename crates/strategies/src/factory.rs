use crate::double_ma::DoubleMaStrategy;
use crate::error::StrategyError;
use crate::gateway::OrderGateway;
use crate::parameters::{class_parameters, ParameterSchema, StrategyParameters};
use crate::Strategy;
use configuration::SettingMap;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Everything a strategy constructor receives.
pub struct StrategyInit {
    pub strategy_name: String,
    pub vt_symbol: String,
    pub gateway: Arc<dyn OrderGateway>,
    pub parameters: StrategyParameters,
}

pub type StrategyConstructor = fn(StrategyInit) -> Result<Box<dyn Strategy>, StrategyError>;

/// A loadable strategy class: its identity, parameter schema and constructor.
#[derive(Debug, Clone, Copy)]
pub struct StrategyClass {
    pub name: &'static str,
    pub author: &'static str,
    pub schema: ParameterSchema,
    pub constructor: StrategyConstructor,
}

impl StrategyClass {
    /// The class-level parameter defaults.
    pub fn class_parameters(&self) -> SettingMap {
        class_parameters(self.schema)
    }

    /// Builds a strategy instance with `setting` applied over the class defaults.
    pub fn instantiate(
        &self,
        strategy_name: &str,
        vt_symbol: &str,
        gateway: Arc<dyn OrderGateway>,
        setting: &SettingMap,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        let parameters = StrategyParameters::from_setting(self.schema, setting)?;
        (self.constructor)(StrategyInit {
            strategy_name: strategy_name.to_string(),
            vt_symbol: vt_symbol.to_string(),
            gateway,
            parameters,
        })
    }

    fn validate(&self) -> Result<(), StrategyError> {
        if self.name.trim().is_empty() {
            return Err(StrategyError::InvalidClass(
                "<unnamed>".to_string(),
                "class name is empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for spec in self.schema {
            if spec.name.trim().is_empty() {
                return Err(StrategyError::InvalidClass(
                    self.name.to_string(),
                    "parameter with an empty name".to_string(),
                ));
            }
            if !seen.insert(spec.name) {
                return Err(StrategyError::InvalidClass(
                    self.name.to_string(),
                    format!("parameter '{}' declared twice", spec.name),
                ));
            }
        }
        Ok(())
    }
}

/// The strategy classes shipped with this crate.
pub fn builtin_classes() -> Vec<StrategyClass> {
    vec![DoubleMaStrategy::class()]
}

/// The set of strategy classes available to an engine, keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    classes: BTreeMap<&'static str, StrategyClass>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in classes.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.load_classes(builtin_classes());
        registry
    }

    /// Adds classes to the registry and returns how many were accepted.
    ///
    /// A class that fails validation is logged and skipped; it never aborts the load.
    pub fn load_classes(&mut self, classes: impl IntoIterator<Item = StrategyClass>) -> usize {
        let mut loaded = 0;
        for class in classes {
            if let Err(e) = class.validate() {
                tracing::error!(class = class.name, error = %e, "Strategy class failed to load");
                continue;
            }
            if self.classes.insert(class.name, class).is_some() {
                tracing::warn!(class = class.name, "Strategy class replaced by a later definition");
            }
            loaded += 1;
        }
        loaded
    }

    /// Drops every class and loads `classes` afresh.
    pub fn reload(&mut self, classes: impl IntoIterator<Item = StrategyClass>) -> usize {
        self.classes.clear();
        self.load_classes(classes)
    }

    pub fn class_names(&self) -> Vec<String> {
        self.classes.keys().map(|name| name.to_string()).collect()
    }

    pub fn get(&self, class_name: &str) -> Result<&StrategyClass, StrategyError> {
        self.classes
            .get(class_name)
            .ok_or_else(|| StrategyError::StrategyNotFound(class_name.to_string()))
    }

    pub fn default_setting(&self, class_name: &str) -> Result<SettingMap, StrategyError> {
        Ok(self.get(class_name)?.class_parameters())
    }

    pub fn instantiate(
        &self,
        class_name: &str,
        strategy_name: &str,
        vt_symbol: &str,
        gateway: Arc<dyn OrderGateway>,
        setting: &SettingMap,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        self.get(class_name)?
            .instantiate(strategy_name, vt_symbol, gateway, setting)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
