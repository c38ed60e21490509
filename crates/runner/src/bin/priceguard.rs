use log::{error, info};
use priceguard_runner::{MonitorBootstrap, load_config, load_default_config};

fn print_help() {
    eprintln!(
        r#"PriceGuard - marketplace promotion monitor

USAGE:
    priceguard [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Dry run with the embedded configuration
    priceguard

    # Run with config file
    priceguard --config priceguard.json
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            other => {
                eprintln!("Error: unknown argument '{}'", other);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match &config_path {
        Some(path) => {
            info!("Loading configuration from {}", path);
            load_config(path)?
        }
        None => {
            info!("Using embedded default configuration");
            load_default_config()?
        }
    };

    let monitor = MonitorBootstrap::new(config).build()?;
    monitor
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await;

    info!("Shutdown complete");
    Ok(())
}
