mod common;

use common::{fill, RecordingGateway};
use core_types::{Direction, EngineType, Offset, OrderId};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use strategies::{OrderRequest, StrategyCore, StrategyTemplate};

fn template() -> (Arc<RecordingGateway>, StrategyTemplate) {
    let gateway = Arc::new(RecordingGateway::new(EngineType::Live));
    let template = StrategyTemplate::new("plain_demo", "rb2405.SHFE", gateway.clone());
    (gateway, template)
}

#[test]
fn orders_are_dropped_until_trading() {
    let (gateway, template) = template();

    assert!(template.buy(3500.0, 1.0).is_empty());
    template.cancel_order(&OrderId::new("o1"));
    template.cancel_all();

    assert_eq!(gateway.sent_count(), 0);
    assert!(gateway.cancelled().is_empty());
    assert_eq!(gateway.cancel_all_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn helpers_map_to_direction_and_offset() {
    let (gateway, template) = template();
    template.set_trading(true);

    template.buy(3500.0, 1.0);
    template.sell(3501.0, 1.0);
    template.short(3502.0, 2.0);
    template.cover(3503.0, 2.0);

    let legs: Vec<(Direction, Offset)> = gateway
        .sent
        .lock()
        .iter()
        .map(|(_, request)| (request.direction, request.offset))
        .collect();
    assert_eq!(
        legs,
        vec![
            (Direction::Long, Offset::Open),
            (Direction::Short, Offset::Close),
            (Direction::Short, Offset::Open),
            (Direction::Long, Offset::Close),
        ]
    );
}

#[test]
fn send_order_passes_flags_through() {
    let (gateway, template) = template();
    template.set_trading(true);

    let mut request = OrderRequest::limit(Direction::Long, Offset::Open, 3500.0, 1.0);
    request.stop = true;
    request.net = true;
    let ids = template.send_order(&request);

    assert_eq!(ids.len(), 1);
    assert_eq!(gateway.last_sent().1, request);
}

#[test]
fn cancels_reach_the_gateway_while_trading() {
    let (gateway, template) = template();
    template.set_trading(true);

    template.cancel_order(&OrderId::new("o9"));
    template.cancel_all();

    assert_eq!(gateway.cancelled(), vec![OrderId::new("o9")]);
    assert_eq!(gateway.cancel_all_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn position_moves_only_with_fills() {
    let (_, template) = template();
    template.set_trading(true);
    template.buy(3500.0, 2.0);
    assert_eq!(template.pos(), 0);

    template.apply_trade(&fill(&OrderId::new("o1"), Direction::Long, Offset::Open, 2.0));
    template.apply_trade(&fill(&OrderId::new("o2"), Direction::Short, Offset::Close, 1.0));
    assert_eq!(template.pos(), 1);
}

#[test]
fn engine_metadata_comes_from_the_gateway() {
    let (_, template) = template();
    assert_eq!(template.engine_type(), EngineType::Live);
    assert_eq!(template.pricetick(), 0.2);
    assert_eq!(template.router().size(), 300.0);
    assert_eq!(template.vt_symbol(), "rb2405.SHFE");
}
