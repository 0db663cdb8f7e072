use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::config::Config;
use crate::input::manager::Manager;
use crate::input::registry::DriverRegistry;

mod config;
mod drivers;
mod input;

#[derive(Parser, Debug)]
#[command(name = "drcplumber", about, version)]
struct Args {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Open this hidraw device directly instead of scanning
    #[arg(long)]
    device: Option<String>,
    /// Expose the inertial and magnetic sensors as a motion device
    #[arg(long)]
    motion: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting drcplumber v{}", VERSION);

    let args = Args::parse();
    let mut config = match Config::load(args.config) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Failed to load configuration, using defaults: {err}");
            Config::default()
        }
    };
    if args.motion {
        config.motion = true;
    }
    if args.device.is_some() {
        config.device = args.device;
    }

    // Setup CTRL+C handler
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        log::info!("Shutting down");
        process::exit(0);
    });

    let registry = DriverRegistry::with_defaults(config.motion);
    let mut manager = Manager::new(registry, config);
    if let Err(err) = manager.run().await {
        log::error!("Error running the device manager: {err}");
        return Err(err);
    }

    log::info!("drcplumber stopped");

    Ok(())
}
