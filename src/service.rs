//! Service Module
//!
//! Dealership operations composed over the car, model and sale tables.
//!
//! ## Responsibilities
//! - Bootstrap the data directory and the six table files
//! - Serialize every call through a single lock
//! - Keep car status in step with sales (best effort, no rollback)
//! - Produce the best-selling models report

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::entity::{Car, CarFullInfo, CarStatus, Model, ModelSaleStats, Money, Sale};
use crate::error::{CarLotError, Result};
use crate::table::Table;

/// Maximum number of rows in the best-selling models report
pub const TOP_MODELS_LIMIT: usize = 3;

/// Name and brand reported for a model id with no catalog record
pub const UNKNOWN_MODEL: &str = "Unknown";

/// The three tables, always locked together
struct Tables {
    cars: Table<Car>,
    models: Table<Model>,
    sales: Table<Sale>,
}

/// The dealership store
///
/// ## Consistency Model
///
/// Every operation runs under one mutex, so calls on a shared `CarService`
/// never interleave. Operations touching several tables are NOT atomic:
/// each file mutation is applied independently, and a failure between steps
/// leaves the tables individually valid but possibly out of step (for
/// example a recorded sale whose car still reads as available).
pub struct CarService {
    /// Service configuration
    config: Config,

    /// All tables behind a single writer lock
    tables: Mutex<Tables>,
}

impl CarService {
    // =========================================================================
    // Internal Table Names
    // =========================================================================
    const CARS_TABLE: &'static str = "cars";
    const MODELS_TABLE: &'static str = "models";
    const SALES_TABLE: &'static str = "sales";

    /// Open or create a store with the given config
    ///
    /// Creates the data directory and any missing table files.
    pub fn open(config: Config) -> Result<Self> {
        if config.slot_capacity == 0 {
            return Err(CarLotError::Config(
                "slot_capacity must be greater than zero".to_string(),
            ));
        }

        fs::create_dir_all(&config.data_dir)?;

        let dir = config.data_dir.as_path();
        let capacity = config.slot_capacity;
        let tables = Tables {
            cars: Table::open(dir, Self::CARS_TABLE, capacity)?,
            models: Table::open(dir, Self::MODELS_TABLE, capacity)?,
            sales: Table::open(dir, Self::SALES_TABLE, capacity)?,
        };

        info!(
            data_dir = %dir.display(),
            cars = tables.cars.len(),
            models = tables.models.len(),
            sales = tables.sales.len(),
            "car service opened"
        );

        Ok(Self {
            config,
            tables: Mutex::new(tables),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Register a car
    pub fn add_car(&self, car: &Car) -> Result<()> {
        self.tables.lock().cars.put(car)?;
        Ok(())
    }

    /// Register a catalog model
    pub fn add_model(&self, model: &Model) -> Result<()> {
        self.tables.lock().models.put(model)?;
        Ok(())
    }

    /// Record a sale and mark its car as sold
    ///
    /// The sale stays recorded even if the car does not exist.
    pub fn sell_car(&self, sale: &Sale) -> Result<()> {
        let mut guard = self.tables.lock();
        let tables = &mut *guard;

        tables.sales.put(sale)?;
        Self::set_car_status(&mut tables.cars, &sale.car_vin, CarStatus::Sold)
    }

    /// Cars with the given status, in slot order
    pub fn get_cars(&self, status: CarStatus) -> Result<Vec<Car>> {
        let tables = self.tables.lock();

        let mut cars = Vec::new();
        for car in tables.cars.scan_all()? {
            let car = car?;
            if car.status == status {
                cars.push(car);
            }
        }
        Ok(cars)
    }

    /// A car joined with its model and, if sold, its sale
    ///
    /// Returns `None` when the car or its model is missing.
    pub fn get_car_info(&self, vin: &str) -> Result<Option<CarFullInfo>> {
        let tables = self.tables.lock();

        let Some(car) = tables.cars.get(vin)? else {
            return Ok(None);
        };
        let Some(model) = tables.models.get(&car.model.to_string())? else {
            return Ok(None);
        };

        let mut sale = None;
        if car.status == CarStatus::Sold {
            for candidate in tables.sales.scan_all()? {
                let candidate = candidate?;
                if candidate.car_vin == car.vin {
                    sale = Some(candidate);
                    break;
                }
            }
        }

        Ok(Some(CarFullInfo {
            vin: car.vin,
            car_model_name: model.name,
            car_model_brand: model.brand,
            price: car.price,
            date_start: car.date_start,
            status: car.status,
            sales_date: sale.as_ref().map(|s| s.sales_date),
            sales_cost: sale.as_ref().map(|s| s.cost),
        }))
    }

    /// Change a car's VIN and repoint its sales
    ///
    /// Fails with `NotFound` if `old_vin` is unknown and `DuplicateKey` if
    /// `new_vin` is taken.
    pub fn update_vin(&self, old_vin: &str, new_vin: &str) -> Result<()> {
        let mut guard = self.tables.lock();
        let tables = &mut *guard;

        tables.cars.rekey(old_vin, new_vin)?;

        let mut affected = Vec::new();
        for sale in tables.sales.scan_all()? {
            let sale = sale?;
            if sale.car_vin == old_vin {
                affected.push(sale);
            }
        }

        for mut sale in affected {
            sale.car_vin = new_vin.to_string();
            tables.sales.update_in_place(&sale.sales_number, &sale)?;
        }
        Ok(())
    }

    /// Cancel a sale and make its car available again
    ///
    /// Fails with `NotFound` if the sale is unknown. A missing car is logged
    /// and otherwise ignored.
    pub fn revert_sale(&self, sales_number: &str) -> Result<()> {
        let mut guard = self.tables.lock();
        let tables = &mut *guard;

        let sale = tables.sales.remove(sales_number)?;
        Self::set_car_status(&mut tables.cars, &sale.car_vin, CarStatus::Available)
    }

    /// The best-selling models, at most [`TOP_MODELS_LIMIT`] of them
    ///
    /// Ordered by sale count, then exact mean sale cost, both descending;
    /// remaining ties go to the lower model id. `mean_price` is reported
    /// truncated to hundredths. Sales whose car is missing or
    /// unreadable are left out.
    pub fn top_models_by_sales(&self) -> Result<Vec<ModelSaleStats>> {
        let tables = self.tables.lock();

        let mut costs: HashMap<u32, Vec<Money>> = HashMap::new();
        for sale in tables.sales.scan_all()? {
            let sale = sale?;
            let car = match tables.cars.get(&sale.car_vin) {
                Ok(Some(car)) => car,
                Ok(None) => continue,
                Err(e) => {
                    warn!(vin = %sale.car_vin, error = %e, "skipping sale with unreadable car");
                    continue;
                }
            };
            costs.entry(car.model).or_default().push(sale.cost);
        }

        // With equal counts, comparing exact sums orders by the true mean.
        let mut ranked: Vec<(u32, usize, i128, Money)> = costs
            .iter()
            .map(|(&model_id, model_costs)| {
                let total: i128 = model_costs.iter().map(|m| m.cents() as i128).sum();
                let mean = Money::mean(model_costs).unwrap_or(Money::ZERO);
                (model_id, model_costs.len(), total, mean)
            })
            .collect();
        ranked.sort_by_key(|&(model_id, count, total, _)| (Reverse(count), Reverse(total), model_id));
        ranked.truncate(TOP_MODELS_LIMIT);

        let mut report = Vec::with_capacity(ranked.len());
        for (model_id, count, _, mean_price) in ranked {
            let (name, brand) = match tables.models.get(&model_id.to_string()) {
                Ok(Some(model)) => (model.name, model.brand),
                Ok(None) => (UNKNOWN_MODEL.to_string(), UNKNOWN_MODEL.to_string()),
                Err(e) => {
                    warn!(model_id, error = %e, "unreadable model record");
                    (UNKNOWN_MODEL.to_string(), UNKNOWN_MODEL.to_string())
                }
            };

            report.push(ModelSaleStats {
                model_id,
                car_model_name: name,
                brand,
                sales_number: count,
                mean_price,
            });
        }
        Ok(report)
    }

    /// Flush all table files to disk
    pub fn sync(&self) -> Result<()> {
        let tables = self.tables.lock();
        tables.cars.store().sync()?;
        tables.models.store().sync()?;
        tables.sales.store().sync()?;
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of live (cars, models, sales)
    pub fn counts(&self) -> (usize, usize, usize) {
        let tables = self.tables.lock();
        (tables.cars.len(), tables.models.len(), tables.sales.len())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Rewrite a car's status in place; a missing car only logs a warning
    fn set_car_status(cars: &mut Table<Car>, vin: &str, status: CarStatus) -> Result<()> {
        match cars.get(vin)? {
            Some(mut car) => {
                car.status = status;
                cars.update_in_place(vin, &car)
            }
            None => {
                warn!(vin, status = %status, "car not found, sale side applied without car update");
                Ok(())
            }
        }
    }
}
