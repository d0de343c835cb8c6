use super::bootstrap::build_warehouse;
use super::importer::{ImportReport, Importer};
use crate::common::{
    AggregateRoot, ApplicationResult, DomainError, EventEnvelope, EventMetadata, Snapshot,
};
use crate::config::{Config, SimulationConfig};
use crate::domains::inventory::{OrderId, Quantity};
use crate::domains::logger::DynLogger;
use crate::domains::warehouse::{ShipmentReceipt, Warehouse, WarehouseStats};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;

/// External stimuli accepted while the simulation runs.
#[derive(Debug, Clone)]
pub enum SimulationCommand {
    SubmitOrder(Vec<(String, i64)>),
    ReceiveShipment { item: String, quantity: Quantity },
    Shutdown,
}

/// Cloneable sender side for feeding commands into a running simulation.
#[derive(Clone)]
pub struct SimulationHandle {
    sender: mpsc::Sender<SimulationCommand>,
}

impl SimulationHandle {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SimulationCommand>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    pub async fn submit_order(&self, lines: Vec<(String, i64)>) -> bool {
        self.sender.send(SimulationCommand::SubmitOrder(lines)).await.is_ok()
    }

    pub async fn receive_shipment(&self, item: &str, quantity: Quantity) -> bool {
        self.sender
            .send(SimulationCommand::ReceiveShipment { item: item.to_string(), quantity })
            .await
            .is_ok()
    }

    pub async fn shutdown(&self) -> bool {
        self.sender.send(SimulationCommand::Shutdown).await.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemandOutcome {
    Queued(OrderId),
    /// Nothing in stock yet; retried on the demand timer.
    Deferred,
    Rejected(String),
}

/// What one frame did.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub frame: u64,
    pub moved: bool,
    pub import: Option<ImportReport>,
    pub retried_orders: Vec<OrderId>,
    pub events: usize,
}

/// Frame loop around the warehouse: movement every `frames_per_move` frames,
/// imports on their own timer, and a retry queue for demand that could not be
/// sourced yet.
pub struct SimulationService {
    warehouse: Warehouse,
    importer: Importer,
    timing: SimulationConfig,
    import_interval: u64,
    frame: u64,
    move_timer: u64,
    import_timer: u64,
    demand_timer: u64,
    pending_demand: VecDeque<Vec<(String, i64)>>,
    stats: WarehouseStats,
    event_sink: Option<mpsc::Sender<EventEnvelope>>,
}

impl SimulationService {
    pub fn new(warehouse: Warehouse, importer: Importer, timing: SimulationConfig, import_interval: u64) -> Self {
        Self {
            warehouse,
            importer,
            timing,
            import_interval,
            frame: 0,
            move_timer: 0,
            import_timer: 0,
            demand_timer: 0,
            pending_demand: VecDeque::new(),
            stats: WarehouseStats::new(),
            event_sink: None,
        }
    }

    /// Warehouse, importer and timers from configuration, with the sample
    /// orders already submitted.
    pub fn from_config(config: &Config, logger: DynLogger) -> ApplicationResult<Self> {
        let warehouse = build_warehouse(config, logger)?;
        let importer = Importer::new(config.items.catalog.clone(), &config.importer);
        let mut service = Self::new(warehouse, importer, config.simulation.clone(), config.importer.interval_frames);
        for (idx, order) in config.sample_orders.iter().enumerate() {
            let lines: Vec<(String, i64)> = order.iter().map(|l| (l.item.clone(), l.quantity)).collect();
            let outcome = service.submit_order(lines);
            tracing::info!("Sample order {}: {:?}", idx + 1, outcome);
        }
        service.drain_events();
        Ok(service)
    }

    /// Every drained event is also forwarded here as an envelope.
    pub fn with_event_sink(mut self, sink: mpsc::Sender<EventEnvelope>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn stats(&self) -> &WarehouseStats {
        &self.stats
    }

    pub fn pending_demand(&self) -> usize {
        self.pending_demand.len()
    }

    /// Queues an order, or parks it for retry when none of its items is in stock.
    pub fn submit_order(&mut self, lines: Vec<(String, i64)>) -> DemandOutcome {
        match self.warehouse.create_order(lines.clone()) {
            Ok(order_id) => DemandOutcome::Queued(order_id),
            Err(DomainError::Unfulfillable { .. }) => {
                self.pending_demand.push_back(lines);
                DemandOutcome::Deferred
            }
            Err(err) => DemandOutcome::Rejected(err.to_string()),
        }
    }

    pub fn receive_shipment(&mut self, item: &str, quantity: Quantity) -> ShipmentReceipt {
        self.warehouse.receive_shipment(item, quantity)
    }

    /// Advances one frame.
    pub fn step(&mut self) -> FrameReport {
        self.frame += 1;
        let mut report = FrameReport { frame: self.frame, ..FrameReport::default() };

        self.move_timer += 1;
        report.moved = self.move_timer >= self.timing.frames_per_move.max(1);
        if report.moved {
            self.move_timer = 0;
        }

        self.import_timer += 1;
        if self.import_interval > 0 && self.import_timer >= self.import_interval {
            self.import_timer = 0;
            report.import = Some(self.importer.import(&mut self.warehouse));
        }

        self.demand_timer += 1;
        if self.demand_timer >= self.timing.demand_retry_frames.max(1) {
            self.demand_timer = 0;
            report.retried_orders = self.retry_demand();
        }

        self.warehouse.tick(report.moved);
        report.events = self.drain_events();
        report
    }

    /// Runs `frames` frames back to back.
    pub fn run_frames(&mut self, frames: u64) -> Vec<FrameReport> {
        (0..frames).map(|_| self.step()).collect()
    }

    fn retry_demand(&mut self) -> Vec<OrderId> {
        let mut queued = Vec::new();
        for _ in 0..self.pending_demand.len() {
            let Some(lines) = self.pending_demand.pop_front() else {
                break;
            };
            match self.warehouse.create_order(lines.clone()) {
                Ok(order_id) => queued.push(order_id),
                Err(DomainError::Unfulfillable { .. }) => self.pending_demand.push_back(lines),
                Err(err) => tracing::warn!("Dropping demand: {}", err),
            }
        }
        queued
    }

    fn drain_events(&mut self) -> usize {
        let tick = self.warehouse.tick_count();
        let events = self.warehouse.take_events();
        for event in &events {
            self.stats.apply_event(event);
            let metadata = EventMetadata::from_source("SimulationService").with_tick(tick);
            match EventEnvelope::new(event, "Warehouse", metadata) {
                Ok(envelope) => {
                    tracing::trace!("{} {}", envelope.event_type, envelope.event_data);
                    if let Some(sink) = &self.event_sink {
                        let _ = sink.try_send(envelope);
                    }
                }
                Err(e) => tracing::error!("Failed to create event envelope: {}", e),
            }
        }
        events.len()
    }

    pub fn snapshot(&self) -> ApplicationResult<Snapshot> {
        let view = self.warehouse.snapshot();
        let snapshot = Snapshot::new(self.warehouse.aggregate_id(), "Warehouse", self.warehouse.version(), &view)
            .map_err(DomainError::from)?;
        Ok(snapshot)
    }

    fn handle_command(&mut self, command: SimulationCommand) -> bool {
        match command {
            SimulationCommand::SubmitOrder(lines) => {
                let outcome = self.submit_order(lines);
                tracing::info!("Order request: {:?}", outcome);
            }
            SimulationCommand::ReceiveShipment { item, quantity } => {
                let receipt = self.receive_shipment(&item, quantity);
                tracing::info!("Shipment of {}x {}: {:?}", quantity, item, receipt);
            }
            SimulationCommand::Shutdown => return false,
        }
        true
    }

    /// Real-time loop: one frame per `frame_interval_ms` until a shutdown
    /// command, a closed channel, or Ctrl-C.
    pub async fn run(mut self, mut commands: mpsc::Receiver<SimulationCommand>) -> Self {
        let mut interval = tokio::time::interval(Duration::from_millis(self.timing.frame_interval_ms.max(1)));
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let report = self.step();
                    if report.moved {
                        tracing::debug!("Tick {}: {} events", self.warehouse.tick_count(), report.events);
                    }
                }
                command = commands.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = &mut ctrl_c => break,
            }
        }
        self.drain_events();
        tracing::info!("Simulation stopped after {} frames", self.frame);
        self
    }
}
