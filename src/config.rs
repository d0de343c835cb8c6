use crate::common::DomainResult;
use crate::domains::path_planning::{Cell, GridMap};
use crate::domains::robot::RobotRole;
use crate::domains::warehouse::{DispatchPolicy, WarehouseSettings};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub stations: StationConfig,
    pub items: ItemConfig,
    /// `None` places one sorter and one picker on the station row.
    pub robots: Option<Vec<RobotConfig>>,
    pub dispatch: DispatchConfig,
    pub planning: PlanningConfig,
    pub importer: ImporterConfig,
    pub simulation: SimulationConfig,
    pub sample_orders: Vec<Vec<OrderLineConfig>>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Explicit rows, `0` floor and `1` shelf. Overrides the generated aisles.
    pub map: Option<Vec<Vec<u8>>>,
    pub shelf_rows: usize,
    pub shelf_cols: usize,
}

/// Station cells. `None` derives the default; an empty list means no station.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub receiving: Option<Vec<Cell>>,
    pub shipping: Option<Vec<Cell>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    pub catalog: Vec<String>,
    /// Explicit homes; items left out are spread round-robin over the shelves.
    pub home_locations: BTreeMap<String, Cell>,
    pub initial_stock: Vec<StockEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntry {
    pub item: String,
    pub quantity: u32,
    /// Defaults to the item's home shelf.
    #[serde(default)]
    pub cell: Option<Cell>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    pub role: RobotRole,
    pub position: Cell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub policy: DispatchPolicy,
    pub sorter_max_pending_batches: usize,
    pub auto_ship_on_restock: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    pub max_time_depth: usize,
    pub approach_search_depth: usize,
    pub replan_after_blocked_ticks: u32,
    pub max_plan_retries: u32,
    pub rng_seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    pub min_shipments: u32,
    pub max_shipments: u32,
    pub min_units: u32,
    pub max_units: u32,
    pub interval_frames: u64,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub frame_interval_ms: u64,
    pub frames_per_move: u64,
    pub demand_retry_frames: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineConfig {
    pub item: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: String,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Optional TOML file layered under `GRYPHON__SECTION__KEY` environment overrides.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            let name = path.as_ref().to_string_lossy().to_string();
            builder = builder.add_source(config::File::new(&name, config::FileFormat::Toml).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("GRYPHON")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn build_grid(&self) -> DomainResult<GridMap> {
        match &self.layout.map {
            Some(rows) => GridMap::from_layout(rows),
            None => Ok(GridMap::storage_aisles(self.layout.shelf_rows, self.layout.shelf_cols)),
        }
    }

    /// Row the stations and robots sit on: the middle row, moved to an even
    /// (aisle) row when the middle falls on a shelf row.
    pub fn station_row(grid: &GridMap) -> i32 {
        let middle = (grid.rows() / 2) as i32;
        if middle % 2 == 1 && (middle as usize) + 1 < grid.rows() {
            middle + 1
        } else {
            middle
        }
    }

    pub fn receiving_stations(&self, grid: &GridMap) -> Vec<Cell> {
        self.stations
            .receiving
            .clone()
            .unwrap_or_else(|| vec![Cell::new(Self::station_row(grid), 0)])
    }

    pub fn shipping_stations(&self, grid: &GridMap) -> Vec<Cell> {
        self.stations
            .shipping
            .clone()
            .unwrap_or_else(|| vec![Cell::new(Self::station_row(grid), grid.cols() as i32 - 1)])
    }

    pub fn robot_fleet(&self, grid: &GridMap) -> Vec<RobotConfig> {
        self.robots.clone().unwrap_or_else(|| {
            let row = Self::station_row(grid);
            vec![
                RobotConfig { role: RobotRole::Sorter, position: Cell::new(row, 2) },
                RobotConfig { role: RobotRole::Picker, position: Cell::new(row, grid.cols() as i32 - 3) },
            ]
        })
    }

    /// Explicit homes first, then the rest of the catalog round-robin over
    /// shelf cells in row-major order.
    pub fn item_homes(&self, grid: &GridMap) -> BTreeMap<String, Cell> {
        let shelves = grid.blocked_cells();
        let mut homes = self.items.home_locations.clone();
        if shelves.is_empty() {
            return homes;
        }
        for (idx, item) in self.items.catalog.iter().enumerate() {
            homes.entry(item.clone()).or_insert(shelves[idx % shelves.len()]);
        }
        homes
    }

    pub fn warehouse_settings(&self) -> WarehouseSettings {
        WarehouseSettings {
            dispatch_policy: self.dispatch.policy,
            sorter_max_pending_batches: self.dispatch.sorter_max_pending_batches,
            auto_ship_on_restock: self.dispatch.auto_ship_on_restock,
            max_time_depth: self.planning.max_time_depth,
            approach_search_depth: self.planning.approach_search_depth,
            replan_after_blocked_ticks: self.planning.replan_after_blocked_ticks,
            max_plan_retries: self.planning.max_plan_retries,
            rng_seed: self.planning.rng_seed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            stations: StationConfig::default(),
            items: ItemConfig::default(),
            robots: None,
            dispatch: DispatchConfig::default(),
            planning: PlanningConfig::default(),
            importer: ImporterConfig::default(),
            simulation: SimulationConfig::default(),
            sample_orders: default_sample_orders(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            map: None,
            shelf_rows: 5,
            shelf_cols: 5,
        }
    }
}

impl Default for ItemConfig {
    fn default() -> Self {
        let catalog = [
            "Gadget", "Widget", "Sprocket", "toothpaste", "toothbrush", "cologne", "airpods", "iphone", "watch",
            "laptop", "dell laptop", "candy", "discord", "phone", "toilet paper", "paper", "pencil", "pen",
            "notebook", "face",
        ];
        Self {
            catalog: catalog.iter().map(|s| s.to_string()).collect(),
            home_locations: BTreeMap::new(),
            initial_stock: vec![
                StockEntry { item: "Widget".to_string(), quantity: 40, cell: None },
                StockEntry { item: "Gadget".to_string(), quantity: 35, cell: None },
                StockEntry { item: "Sprocket".to_string(), quantity: 30, cell: None },
            ],
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let settings = WarehouseSettings::default();
        Self {
            policy: settings.dispatch_policy,
            sorter_max_pending_batches: settings.sorter_max_pending_batches,
            auto_ship_on_restock: settings.auto_ship_on_restock,
        }
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        let settings = WarehouseSettings::default();
        Self {
            max_time_depth: settings.max_time_depth,
            approach_search_depth: settings.approach_search_depth,
            replan_after_blocked_ticks: settings.replan_after_blocked_ticks,
            max_plan_retries: settings.max_plan_retries,
            rng_seed: settings.rng_seed,
        }
    }
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            min_shipments: 1,
            max_shipments: 3,
            min_units: 1,
            max_units: 3,
            interval_frames: 500,
            seed: None,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 7,
            frames_per_move: 144,
            demand_retry_frames: 144,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

impl OrderLineConfig {
    pub fn new(item: &str, quantity: i64) -> Self {
        Self { item: item.to_string(), quantity }
    }
}

/// The three demo orders queued at startup.
pub fn default_sample_orders() -> Vec<Vec<OrderLineConfig>> {
    vec![
        vec![OrderLineConfig::new("Widget", 2), OrderLineConfig::new("Gadget", 1)],
        vec![OrderLineConfig::new("Sprocket", 3), OrderLineConfig::new("Widget", 1)],
        vec![OrderLineConfig::new("Gadget", 2), OrderLineConfig::new("Sprocket", 2)],
    ]
}
