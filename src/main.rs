use gryphon_warehouse::adapters::outbound::{
    init_combined_logger, init_console_logger, init_verbose_console_logger,
};
use gryphon_warehouse::application::{SimulationHandle, SimulationService};
use gryphon_warehouse::Config;
use std::error::Error;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Gryphon Warehouse");

    let path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = if Path::new(&path).exists() {
        Config::from_file(&path).await?
    } else {
        warn!("{} not found, using built-in layout", path);
        Config::load(None::<&str>)?
    };

    let logger = match &config.logging.file {
        Some(file) => init_combined_logger(file, &config.logging.level),
        None if config.logging.level.eq_ignore_ascii_case("debug") => init_verbose_console_logger(),
        None => init_console_logger(),
    };

    let service = SimulationService::from_config(&config, logger)?;
    let warehouse = service.warehouse();
    info!(
        "Warehouse {} ready: {}x{} grid, {} robots, {} live orders",
        warehouse.id(),
        warehouse.grid().rows(),
        warehouse.grid().cols(),
        warehouse.robots().len(),
        warehouse.orders().count()
    );

    // The handle stays alive so the command channel remains open until Ctrl-C.
    let (_handle, commands) = SimulationHandle::channel(64);
    let service = service.run(commands).await;

    let stats = service.stats();
    info!(
        "Shutting down Gryphon Warehouse: {} moves, {} orders completed, {} units received",
        stats.moves, stats.orders_completed, stats.units_received
    );
    Ok(())
}
