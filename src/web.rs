#![cfg(not(tarpaulin_include))]

use car_inventory::app;
use car_inventory::config::Config;
use std::env;

/// Main entry point for the web application
///
/// Reads the configuration from the environment and serves the inventory
/// and sales API.
///
/// # Arguments
/// * First command line argument, if present, overrides the listen address
/// * Second command line argument, if present, overrides the data directory
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = Config::from_env();
    let mut args = env::args().skip(1);
    if let Some(addr) = args.next() {
        config.addr = addr;
    }
    if let Some(data_dir) = args.next() {
        config.data_dir = data_dir.into();
    }

    app::run(config).await
}
