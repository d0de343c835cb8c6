use crate::common::{ApplicationResult, DomainError};
use crate::config::Config;
use crate::domains::inventory::StorageKind;
use crate::domains::logger::DynLogger;
use crate::domains::warehouse::Warehouse;

/// Builds a stocked, staffed warehouse from configuration. Sample orders are
/// left to the caller so rejected ones can be retried.
pub fn build_warehouse(config: &Config, logger: DynLogger) -> ApplicationResult<Warehouse> {
    let grid = config.build_grid()?;
    let receiving = config.receiving_stations(&grid);
    let shipping = config.shipping_stations(&grid);
    let homes = config.item_homes(&grid);
    let fleet = config.robot_fleet(&grid);

    let mut warehouse = Warehouse::new(grid, config.warehouse_settings(), logger);
    for cell in receiving {
        warehouse.add_station(cell, StorageKind::ReceivingStation)?;
    }
    for cell in shipping {
        warehouse.add_station(cell, StorageKind::ShippingStation)?;
    }
    for (item, cell) in homes {
        warehouse.set_item_home(&item, cell)?;
    }

    for entry in &config.items.initial_stock {
        let cell = entry
            .cell
            .or_else(|| warehouse.item_home(&entry.item))
            .ok_or_else(|| DomainError::InvalidCommand {
                reason: format!("initial stock of {} has no cell and the item has no home", entry.item),
            })?;
        warehouse.stock_shelf(cell, &entry.item, entry.quantity)?;
    }

    for robot in fleet {
        warehouse.add_robot(robot.position, robot.role)?;
    }
    Ok(warehouse)
}
