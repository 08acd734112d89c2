//! CarLot CLI
//!
//! Command-line interface over a local CarLot data directory.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use carlot::entity::parse_timestamp;
use carlot::{Car, CarService, CarStatus, Config, Model, Money, Sale};

/// CarLot CLI
#[derive(Parser, Debug)]
#[command(name = "carlot")]
#[command(about = "Flat-file car dealership store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./carlot_data")]
    data_dir: String,

    /// Slot capacity in bytes
    #[arg(long, default_value_t = carlot::config::DEFAULT_SLOT_CAPACITY)]
    slot_capacity: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a catalog model
    AddModel {
        id: u32,
        name: String,
        brand: String,
    },

    /// Register a car
    AddCar {
        vin: String,
        /// Catalog model id
        model: u32,
        price: Money,
        /// "YYYY-MM-DD HH:MM:SS"
        #[arg(value_parser = parse_timestamp)]
        date_start: NaiveDateTime,
        #[arg(long, default_value = "available")]
        status: CarStatus,
    },

    /// Record a sale
    Sell {
        sales_number: String,
        vin: String,
        cost: Money,
        /// "YYYY-MM-DD HH:MM:SS"
        #[arg(value_parser = parse_timestamp)]
        date: NaiveDateTime,
    },

    /// List cars with a status, in storage order
    Cars {
        /// available, reserved or sold
        status: CarStatus,
    },

    /// Show full information about a car
    Info {
        vin: String,
    },

    /// Change a car's VIN
    UpdateVin {
        old_vin: String,
        new_vin: String,
    },

    /// Cancel a sale
    RevertSale {
        sales_number: String,
    },

    /// Show the best-selling models
    TopModels,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,carlot=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("CarLot v{}", carlot::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .slot_capacity(args.slot_capacity)
        .build();

    let service = match CarService::open(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to open data directory: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&service, args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(service: &CarService, command: Commands) -> carlot::Result<()> {
    match command {
        Commands::AddModel { id, name, brand } => {
            service.add_model(&Model { id, name, brand })?;
        }
        Commands::AddCar {
            vin,
            model,
            price,
            date_start,
            status,
        } => {
            service.add_car(&Car {
                vin,
                model,
                price,
                date_start,
                status,
            })?;
        }
        Commands::Sell {
            sales_number,
            vin,
            cost,
            date,
        } => {
            service.sell_car(&Sale {
                sales_number,
                car_vin: vin,
                cost,
                sales_date: date,
            })?;
        }
        Commands::Cars { status } => {
            for car in service.get_cars(status)? {
                println!(
                    "{}\tmodel={}\tprice={}\tsince={}",
                    car.vin, car.model, car.price, car.date_start
                );
            }
        }
        Commands::Info { vin } => match service.get_car_info(&vin)? {
            Some(info) => {
                println!("vin:     {}", info.vin);
                println!("model:   {} {}", info.car_model_brand, info.car_model_name);
                println!("price:   {}", info.price);
                println!("since:   {}", info.date_start);
                println!("status:  {}", info.status);
                if let (Some(date), Some(cost)) = (info.sales_date, info.sales_cost) {
                    println!("sold:    {} for {}", date, cost);
                }
            }
            None => println!("no car with VIN {}", vin),
        },
        Commands::UpdateVin { old_vin, new_vin } => {
            service.update_vin(&old_vin, &new_vin)?;
        }
        Commands::RevertSale { sales_number } => {
            service.revert_sale(&sales_number)?;
        }
        Commands::TopModels => {
            for (rank, stats) in service.top_models_by_sales()?.iter().enumerate() {
                println!(
                    "{}. {} {} (id {}): {} sales, mean {}",
                    rank + 1,
                    stats.brand,
                    stats.car_model_name,
                    stats.model_id,
                    stats.sales_number,
                    stats.mean_price
                );
            }
        }
    }

    service.sync()
}
