use crate::error::StrategyError;
use crate::factory::{StrategyClass, StrategyInit};
use crate::parameters::{ParameterSchema, ParameterSpec, StrategyParameters};
use crate::target_pos::TargetPosTemplate;
use crate::{Strategy, StrategyCore};
use configuration::SettingMap;
use core_types::{BarData, OrderData, TickData};
use serde_json::json;
use ta::indicators::SimpleMovingAverage as Sma;
use ta::Next;

/// Double moving average crossover, trading a fixed size through a position target.
///
/// Goes long `fixed_size` when the fast average crosses above the slow one and
/// short `fixed_size` when it crosses below.
pub struct DoubleMaStrategy {
    parameters: StrategyParameters,
    template: TargetPosTemplate,
    fixed_size: i64,
    slow_window: usize,
    fast_ma: Sma,
    slow_ma: Sma,
    bar_count: usize,
    // Averages of the latest bar (0) and the one before it (1).
    fast_ma0: f64,
    fast_ma1: f64,
    slow_ma0: f64,
    slow_ma1: f64,
}

impl DoubleMaStrategy {
    pub const CLASS_NAME: &'static str = "DoubleMaStrategy";
    pub const AUTHOR: &'static str = "ctabench";
    pub const SCHEMA: ParameterSchema = &[
        ParameterSpec::int("fast_window", 10),
        ParameterSpec::int("slow_window", 20),
        ParameterSpec::int("fixed_size", 1),
    ];

    pub fn class() -> StrategyClass {
        StrategyClass {
            name: Self::CLASS_NAME,
            author: Self::AUTHOR,
            schema: Self::SCHEMA,
            constructor: Self::construct,
        }
    }

    fn construct(init: StrategyInit) -> Result<Box<dyn Strategy>, StrategyError> {
        Ok(Box::new(Self::new(init)?))
    }

    /// Creates a new instance, validating that the windows are logical.
    pub fn new(init: StrategyInit) -> Result<Self, StrategyError> {
        let fast_window = init.parameters.get_usize("fast_window")?;
        let slow_window = init.parameters.get_usize("slow_window")?;
        let fixed_size = init.parameters.get_i64("fixed_size")?;

        if fast_window >= slow_window {
            return Err(StrategyError::InvalidParameters(
                "fast_window must be less than slow_window".to_string(),
            ));
        }
        if fixed_size <= 0 {
            return Err(StrategyError::InvalidParameters(
                "fixed_size must be positive".to_string(),
            ));
        }

        let fast_ma = Sma::new(fast_window).map_err(|e| StrategyError::IndicatorError(format!("{e:?}")))?;
        let slow_ma = Sma::new(slow_window).map_err(|e| StrategyError::IndicatorError(format!("{e:?}")))?;

        Ok(Self {
            template: TargetPosTemplate::from_init(&init),
            parameters: init.parameters,
            fixed_size,
            slow_window,
            fast_ma,
            slow_ma,
            bar_count: 0,
            fast_ma0: 0.0,
            fast_ma1: 0.0,
            slow_ma0: 0.0,
            slow_ma1: 0.0,
        })
    }

    pub fn template(&self) -> &TargetPosTemplate {
        &self.template
    }
}

impl Strategy for DoubleMaStrategy {
    fn class_name(&self) -> &str {
        Self::CLASS_NAME
    }

    fn author(&self) -> &str {
        Self::AUTHOR
    }

    fn core(&self) -> &dyn StrategyCore {
        &self.template
    }

    fn parameters(&self) -> &StrategyParameters {
        &self.parameters
    }

    fn on_init(&mut self) {
        self.template.write_log("Strategy initialised");
    }

    fn on_start(&mut self) {
        self.template.write_log("Strategy started");
    }

    fn on_stop(&mut self) {
        self.template.cancel_all();
        self.template.write_log("Strategy stopped");
    }

    fn on_tick(&mut self, tick: &TickData) {
        self.template.on_tick(tick);
    }

    fn on_bar(&mut self, bar: &BarData) {
        self.template.on_bar(bar);

        self.fast_ma1 = self.fast_ma0;
        self.slow_ma1 = self.slow_ma0;
        self.fast_ma0 = self.fast_ma.next(bar.close_price);
        self.slow_ma0 = self.slow_ma.next(bar.close_price);
        self.bar_count += 1;

        // Both averages need a full window on the previous bar as well.
        if self.bar_count <= self.slow_window {
            return;
        }

        let cross_over = self.fast_ma0 > self.slow_ma0 && self.fast_ma1 < self.slow_ma1;
        let cross_below = self.fast_ma0 < self.slow_ma0 && self.fast_ma1 > self.slow_ma1;

        if cross_over {
            tracing::debug!(close = bar.close_price, "Golden cross");
            self.template.set_target_pos(self.fixed_size);
        } else if cross_below {
            tracing::debug!(close = bar.close_price, "Death cross");
            self.template.set_target_pos(-self.fixed_size);
        }
    }

    fn on_order(&mut self, order: &OrderData) {
        self.template.on_order(order);
    }

    fn variables(&self) -> SettingMap {
        let mut map = self.template.variables();
        map.insert("fast_ma0".to_string(), json!(self.fast_ma0));
        map.insert("fast_ma1".to_string(), json!(self.fast_ma1));
        map.insert("slow_ma0".to_string(), json!(self.slow_ma0));
        map.insert("slow_ma1".to_string(), json!(self.slow_ma1));
        map
    }
}
