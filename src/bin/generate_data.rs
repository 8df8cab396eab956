#![cfg(not(tarpaulin_include))]

use car_inventory::config::Config;
use car_inventory::generator::{GeneratorOptions, populate};
use car_inventory::store::Database;
use std::env;

/// Fill the data directory with a random inventory and sales history
///
/// Usage: `generate_data [cars] [sales] [seed]`; the data directory comes
/// from `CAR_INVENTORY_DATA_DIR`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let args: Vec<String> = env::args().collect();
    let mut options = GeneratorOptions::default();
    if let Some(cars) = args.get(1) {
        options.cars = cars.parse()?;
    }
    if let Some(sales) = args.get(2) {
        options.sales = sales.parse()?;
    }
    if let Some(seed) = args.get(3) {
        options.seed = seed.parse()?;
    }

    let db = Database::open(&config.data_dir)?;
    let (cars, sales) = populate(&db, &options)?;
    println!(
        "Wrote {} cars and {} sales to {}",
        cars,
        sales,
        config.data_dir.display()
    );
    Ok(())
}
