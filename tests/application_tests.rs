use gryphon_warehouse::adapters::outbound::init_noop_logger;
use gryphon_warehouse::application::*;
use gryphon_warehouse::config::{Config, ImporterConfig, SimulationConfig};
use gryphon_warehouse::domains::inventory::StorageKind;
use gryphon_warehouse::domains::path_planning::Cell;
use gryphon_warehouse::domains::warehouse::{Warehouse, WarehouseSnapshot};
use tokio::sync::mpsc;

fn fast_config() -> Config {
    let mut config = Config::default();
    config.simulation = SimulationConfig {
        frame_interval_ms: 1,
        frames_per_move: 1,
        demand_retry_frames: 10,
    };
    config.importer.interval_frames = 0;
    config.importer.seed = Some(3);
    config
}

fn empty_warehouse(config: &mut Config) -> Warehouse {
    config.robots = Some(Vec::new());
    config.items.initial_stock.clear();
    build_warehouse(config, init_noop_logger()).unwrap()
}

#[test]
fn test_build_warehouse_from_defaults() {
    let warehouse = build_warehouse(&Config::default(), init_noop_logger()).unwrap();
    assert_eq!(warehouse.robots().len(), 2);
    assert_eq!(warehouse.robots()[0].name, "Sorter #0");
    assert_eq!(warehouse.robots()[1].name, "Picker #1");
    assert_eq!(warehouse.storage().count(), 27);
    assert_eq!(warehouse.storage_at(Cell::new(6, 0)).map(|s| s.kind), Some(StorageKind::ReceivingStation));
    assert_eq!(warehouse.storage_at(Cell::new(6, 10)).map(|s| s.kind), Some(StorageKind::ShippingStation));
    assert_eq!(warehouse.storage_at(Cell::new(1, 3)).unwrap().quantity("Widget"), 40);
    assert_eq!(warehouse.units_in_system("Gadget"), 35);
    assert!(warehouse.sort_queue().is_empty());
}

#[test]
fn test_build_warehouse_rejects_robot_on_shelf() {
    let mut config = Config::default();
    config.robots = Some(vec![gryphon_warehouse::config::RobotConfig {
        role: gryphon_warehouse::domains::robot::RobotRole::Generic,
        position: Cell::new(1, 1),
    }]);
    assert!(build_warehouse(&config, init_noop_logger()).is_err());
}

#[test]
fn test_seeded_importer_fills_sort_queue() {
    let mut config = fast_config();
    let mut warehouse = empty_warehouse(&mut config);
    let mut importer = Importer::new(config.items.catalog.clone(), &config.importer);

    let report = importer.import(&mut warehouse);
    assert!(!report.received.is_empty());
    assert!(!report.throttled);
    for (item, quantity) in &report.received {
        assert!(warehouse.is_relevant_item(item));
        assert!((1..=3).contains(quantity));
    }
    assert!(!warehouse.sort_queue().is_empty());
    assert!(warehouse.sort_queue().len() <= report.received.len());
}

#[test]
fn test_importer_stops_when_sorting_backs_up() {
    let mut config = fast_config();
    config.dispatch.sorter_max_pending_batches = 1;
    let mut warehouse = empty_warehouse(&mut config);
    let mut importer = Importer::new(config.items.catalog.clone(), &config.importer);

    importer.import(&mut warehouse);
    assert_eq!(warehouse.sort_queue().len(), 1);

    let report = importer.import(&mut warehouse);
    assert!(report.throttled);
    assert!(report.received.is_empty());
}

#[test]
fn test_importer_skips_items_without_home() {
    let mut config = fast_config();
    let mut warehouse = empty_warehouse(&mut config);
    let settings = ImporterConfig {
        min_shipments: 3,
        max_shipments: 3,
        seed: Some(5),
        ..ImporterConfig::default()
    };
    let mut importer = Importer::new(vec!["Unobtainium".to_string()], &settings);

    let report = importer.import(&mut warehouse);
    assert_eq!(report.skipped, 3);
    assert!(report.received.is_empty());
    assert_eq!(warehouse.storage_at(Cell::new(6, 0)).unwrap().load(), 0);
}

#[test]
fn test_service_queues_sample_orders_and_completes_them() {
    let config = fast_config();
    let mut service = SimulationService::from_config(&config, init_noop_logger()).unwrap();
    assert_eq!(service.warehouse().orders().count(), 3);
    assert_eq!(service.stats().orders_queued, 3);

    for _ in 0..3000 {
        service.step();
        if service.warehouse().orders().count() == 0 {
            break;
        }
    }
    assert_eq!(service.warehouse().orders().count(), 0);
    assert_eq!(service.stats().orders_completed, 3);
    assert_eq!(service.warehouse().storage_at(Cell::new(6, 10)).unwrap().load(), 0);
    assert_eq!(service.warehouse().units_in_system("Widget"), 37);
}

#[test]
fn test_moves_only_happen_on_move_frames() {
    let mut config = fast_config();
    config.simulation.frames_per_move = 4;
    let mut service = SimulationService::from_config(&config, init_noop_logger()).unwrap();

    let reports = service.run_frames(12);
    let moving: Vec<u64> = reports.iter().filter(|r| r.moved).map(|r| r.frame).collect();
    assert_eq!(moving, vec![4, 8, 12]);
    assert_eq!(service.warehouse().tick_count(), 3);
}

#[test]
fn test_unsourceable_demand_is_retried_after_restock() {
    let mut config = fast_config();
    config.sample_orders.clear();
    config.items.initial_stock.clear();
    config.dispatch.auto_ship_on_restock = false;
    let mut service = SimulationService::from_config(&config, init_noop_logger()).unwrap();

    assert_eq!(service.submit_order(vec![("Widget".to_string(), 2)]), DemandOutcome::Deferred);
    assert_eq!(service.pending_demand(), 1);
    assert!(matches!(
        service.submit_order(vec![("Widget".to_string(), 0)]),
        DemandOutcome::Rejected(_)
    ));

    assert!(service.receive_shipment("Widget", 2).is_accepted());
    let mut queued = Vec::new();
    for _ in 0..1000 {
        queued.extend(service.step().retried_orders);
        if service.pending_demand() == 0 {
            break;
        }
    }
    assert_eq!(service.pending_demand(), 0);
    assert_eq!(queued.len(), 1);
}

#[test]
fn test_event_sink_receives_envelopes() {
    let config = fast_config();
    let (tx, mut rx) = mpsc::channel(256);
    let mut service = SimulationService::from_config(&config, init_noop_logger())
        .unwrap()
        .with_event_sink(tx);

    service.submit_order(vec![("Gadget".to_string(), 1)]);
    let report = service.step();
    assert!(report.events > 0);

    let mut types = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        assert_eq!(envelope.aggregate_type, "Warehouse");
        assert_eq!(envelope.event_version, 1);
        assert_eq!(envelope.metadata.tick, Some(1));
        types.push(envelope.event_type);
    }
    assert!(types.iter().any(|t| t == "OrderQueued"));
}

#[test]
fn test_snapshot_restores_read_model() {
    let config = fast_config();
    let service = SimulationService::from_config(&config, init_noop_logger()).unwrap();
    let snapshot = service.snapshot().unwrap();
    assert_eq!(snapshot.aggregate_type, "Warehouse");
    assert_eq!(snapshot.aggregate_id, service.warehouse().id());

    let view: WarehouseSnapshot = snapshot.restore().unwrap();
    assert_eq!(view.robots.len(), 2);
    assert_eq!(view.orders.len(), 3);
    assert_eq!(view.shipping_stations, vec![Cell::new(6, 10)]);
}

#[tokio::test]
async fn test_run_loop_handles_commands_until_shutdown() {
    let mut config = fast_config();
    config.sample_orders.clear();
    let service = SimulationService::from_config(&config, init_noop_logger()).unwrap();
    let (handle, commands) = SimulationHandle::channel(8);

    assert!(handle.submit_order(vec![("Sprocket".to_string(), 1)]).await);
    assert!(handle.receive_shipment("Widget", 2).await);
    assert!(handle.shutdown().await);

    let service = service.run(commands).await;
    assert_eq!(service.stats().orders_queued, 1);
    assert!(service.stats().units_received >= 2);
}
