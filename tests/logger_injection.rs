use gryphon_warehouse::adapters::outbound::{init_buffered_logger, init_noop_logger, MultiLogger};
use gryphon_warehouse::domains::logger::DomainLogger;
use gryphon_warehouse::domains::path_planning::{Cell, GridMap};
use gryphon_warehouse::domains::warehouse::{Warehouse, WarehouseSettings};
use gryphon_warehouse::domains::inventory::StorageKind;
use gryphon_warehouse::domains::robot::RobotRole;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct BridgeCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl BridgeCapture {
    fn new() -> Self { Self { messages: Arc::new(Mutex::new(Vec::new())) } }

    fn contains(&self, needle: &str) -> bool {
        self.messages.lock().unwrap().iter().any(|m| m.contains(needle))
    }
}

impl DomainLogger for BridgeCapture {
    fn info(&self, msg: &str) { self.messages.lock().unwrap().push(format!("INFO:{}", msg)); }
    fn warn(&self, msg: &str) { self.messages.lock().unwrap().push(format!("WARN:{}", msg)); }
    fn error(&self, msg: &str) { self.messages.lock().unwrap().push(format!("ERR:{}", msg)); }
    fn debug(&self, msg: &str) { self.messages.lock().unwrap().push(format!("DEBUG:{}", msg)); }
}

#[tokio::test]
async fn test_buffered_and_noop_logger() {
    let capture = Arc::new(BridgeCapture::new());
    let bridge = capture.clone() as Arc<dyn DomainLogger>;

    // Create a buffered logger that forwards to the bridge with small capacity
    let buffered = init_buffered_logger(bridge.clone(), 8);

    buffered.info("one");
    buffered.warn("two");
    buffered.error("three");
    buffered.debug("four");

    // Give the background task a moment
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(capture.contains("INFO:one"));
    assert!(capture.contains("WARN:two"));
    assert!(capture.contains("ERR:three"));
    assert!(capture.contains("DEBUG:four"));

    let noop = init_noop_logger();
    noop.info("ignored");
    noop.debug("ignored-debug");
    noop.error("ignored-err");
}

#[test]
fn test_multi_logger_forwards_to_both() {
    let primary = Arc::new(BridgeCapture::new());
    let secondary = Arc::new(BridgeCapture::new());
    let multi = MultiLogger::new(primary.clone(), Some(secondary.clone() as Arc<dyn DomainLogger>));

    multi.warn("shelf empty");
    multi.debug("tick chatter");

    for capture in [&primary, &secondary] {
        assert!(capture.contains("WARN:shelf empty"));
        assert!(capture.contains("DEBUG:tick chatter"));
    }
}

#[test]
fn test_warehouse_logs_through_injected_logger() {
    let capture = Arc::new(BridgeCapture::new());
    let mut warehouse = Warehouse::new(
        GridMap::storage_aisles(2, 2),
        WarehouseSettings::default(),
        capture.clone() as Arc<dyn DomainLogger>,
    );
    warehouse.add_station(Cell::new(2, 4), StorageKind::ShippingStation).unwrap();
    warehouse.set_item_home("Widget", Cell::new(1, 1)).unwrap();
    warehouse.stock_shelf(Cell::new(1, 1), "Widget", 1).unwrap();
    warehouse.add_robot(Cell::new(0, 0), RobotRole::Picker).unwrap();

    assert!(warehouse.create_order(vec![("Widget", 0)]).is_err());
    warehouse.create_order(vec![("Widget", 1)]).unwrap();
    for _ in 0..40 {
        warehouse.tick(true);
    }

    assert!(capture.contains("INFO:Added Picker #0 at (0, 0)"));
    assert!(capture.contains("WARN:Invalid order request"));
    assert!(capture.contains("INFO:Queued order #1 for 1x Widget"));
    assert!(capture.contains("Order #1 packed and cleared from order shelf"));
}
