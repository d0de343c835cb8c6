use crate::config::ImporterConfig;
use crate::domains::inventory::Quantity;
use crate::domains::warehouse::{ShipmentReceipt, Warehouse};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Result of one import burst.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub received: Vec<(String, Quantity)>,
    pub skipped: usize,
    pub throttled: bool,
}

/// Random inbound supply: every burst sends a few small shipments of catalog
/// items to the warehouse, stopping early once sorting is backed up.
pub struct Importer {
    catalog: Vec<String>,
    shipments: (u32, u32),
    units: (u32, u32),
    rng: StdRng,
}

impl Importer {
    pub fn new(catalog: Vec<String>, settings: &ImporterConfig) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            catalog,
            shipments: ordered(settings.min_shipments, settings.max_shipments),
            units: ordered(settings.min_units, settings.max_units),
            rng,
        }
    }

    pub fn import(&mut self, warehouse: &mut Warehouse) -> ImportReport {
        let mut report = ImportReport::default();
        let shipments = self.rng.gen_range(self.shipments.0..=self.shipments.1);
        for _ in 0..shipments {
            if !warehouse.can_accept_sorter_batch() {
                report.throttled = true;
                break;
            }
            let Some(item) = self.catalog.choose(&mut self.rng).cloned() else {
                break;
            };
            if !warehouse.is_relevant_item(&item) {
                report.skipped += 1;
                continue;
            }
            let quantity = self.rng.gen_range(self.units.0..=self.units.1);
            tracing::debug!("Receiving {}x {} from source", quantity, item);
            match warehouse.receive_shipment(&item, quantity) {
                ShipmentReceipt::Throttled => {
                    report.throttled = true;
                    break;
                }
                receipt if receipt.is_accepted() => report.received.push((item, quantity)),
                _ => report.skipped += 1,
            }
        }
        report
    }
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}
