use clap::Parser;
use tracing_subscriber::EnvFilter;

use zhuge_server::cli::{handle_config_action, Args, Command};
use zhuge_server::config::Config;
use zhuge_server::server;

const DEFAULT_LOG_FILTER: &str = "info,tower_http=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    match args.command {
        Some(Command::Config { action }) => {
            if let Err(e) = handle_config_action(action, args.config.as_deref()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Command::Serve) | None => {
            let mut config = match Config::load(args.config.as_deref()) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            config.apply_env();
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }

            log::info!("{}", config.summary());
            if let Err(e) = server::serve(&config).await {
                eprintln!("Error: server failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
