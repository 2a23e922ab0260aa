mod common;

use common::{bar, fill, order_update, RecordingGateway};
use configuration::SettingMap;
use core_types::{Direction, EngineType, Offset, Status};
use serde_json::json;
use std::sync::Arc;
use strategies::{DoubleMaStrategy, Strategy, StrategyError, StrategyRegistry};

fn closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..21).map(|i| 130.0 - i as f64).collect();
    closes.extend((1..8).map(|i| 120.0 + 20.0 * i as f64));
    closes.extend((1..12).map(|i| 260.0 - 15.0 * i as f64));
    closes
}

fn setting(value: serde_json::Value) -> SettingMap {
    value.as_object().cloned().unwrap_or_default()
}

fn build(gateway: Arc<RecordingGateway>, value: serde_json::Value) -> Result<Box<dyn Strategy>, StrategyError> {
    StrategyRegistry::with_builtin().instantiate(
        DoubleMaStrategy::CLASS_NAME,
        "double_ma_if",
        "IF888.CFFEX",
        gateway,
        &setting(value),
    )
}

#[test]
fn crossovers_drive_the_target_position() {
    let gateway = Arc::new(RecordingGateway::new(EngineType::Backtesting));
    let mut strategy = build(gateway.clone(), json!({})).unwrap();
    strategy.core().set_inited(true);
    strategy.core().set_trading(true);

    let closes = closes();
    // Golden cross on the 24th bar.
    for close in &closes[..24] {
        strategy.on_bar(&bar(*close));
    }
    assert_eq!(gateway.sent_count(), 1);
    let (orderid, request) = gateway.last_sent();
    assert_eq!(request.direction, Direction::Long);
    assert_eq!(request.volume, 1.0);
    assert_eq!(request.price, 181.0);

    let trade = fill(&orderid, Direction::Long, Offset::Open, 1.0);
    strategy.core().apply_trade(&trade);
    strategy.on_trade(&trade);
    strategy.on_order(&order_update(&orderid, &request, 1.0, Status::Filled));
    assert_eq!(strategy.core().pos(), 1);

    // Death cross on the last bar flips to short.
    for close in &closes[24..] {
        strategy.on_bar(&bar(*close));
    }
    assert_eq!(gateway.sent_count(), 2);
    let (_, request) = gateway.last_sent();
    assert_eq!(request.direction, Direction::Short);
    assert_eq!(request.offset, Offset::Open);
    assert_eq!(request.volume, 2.0);
    assert_eq!(strategy.variables()["target_pos"], -1);
}

#[test]
fn data_snapshot_reports_parameters_and_variables() {
    let gateway = Arc::new(RecordingGateway::new(EngineType::Backtesting));
    let strategy = build(gateway, json!({ "fast_window": 5, "slow_window": 30 })).unwrap();

    let data = strategy.data();
    assert_eq!(data.class_name, "DoubleMaStrategy");
    assert_eq!(data.strategy_name, "double_ma_if");
    assert_eq!(data.vt_symbol, "IF888.CFFEX");
    assert_eq!(data.parameters["fast_window"], 5);
    assert_eq!(data.parameters["slow_window"], 30);
    assert_eq!(data.parameters["fixed_size"], 1);
    assert_eq!(data.variables["inited"], false);
    assert!(data.variables.contains_key("fast_ma0"));
}

#[test]
fn inverted_windows_are_rejected() {
    let gateway = Arc::new(RecordingGateway::new(EngineType::Backtesting));
    let result = build(gateway, json!({ "fast_window": 30, "slow_window": 20 }));
    assert!(matches!(result, Err(StrategyError::InvalidParameters(_))));
}

#[test]
fn stop_cancels_working_orders() {
    let gateway = Arc::new(RecordingGateway::new(EngineType::Backtesting));
    let mut strategy = build(gateway.clone(), json!({})).unwrap();
    strategy.core().set_trading(true);

    strategy.on_stop();

    assert_eq!(gateway.cancel_all_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}
