#![cfg(not(tarpaulin_include))]

use profile_page::app;
use profile_page::config::AppConfig;
use std::env;

/// Main entry point for the profile web server
///
/// Settings come from the environment (see `AppConfig`); an optional first
/// argument overrides the bind address.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let mut config = AppConfig::from_env();
    if args.len() >= 2 {
        config.bind_addr = args[1].clone();
    }

    log::info!(
        "Starting profile server for {} with database {}",
        config.current_github_id,
        config.database_path.display()
    );
    app::run(config).await
}
