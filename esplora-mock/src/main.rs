/// Esplora Mock Server
///
/// A lightweight fixture-backed Esplora API for Litecoin regtest and
/// development. Fixtures come from the JSON file at `FIXTURE_PATH`.

use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;

use esplora_mock::{run_server, FixtureStore};

#[derive(Debug)]
struct Config {
    fixture_path: Option<String>,

    // Server
    server_host: String,
    server_port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let fixture_path = env::var("FIXTURE_PATH").ok();

        let server_host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        Ok(Self {
            fixture_path,
            server_host,
            server_port,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting Esplora Mock Server...");

    let config = Config::from_env()
        .context("Failed to load configuration")?;

    let store = match &config.fixture_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read fixtures from {}", path))?;
            log::info!("📂 Loaded fixtures from {}", path);
            FixtureStore::from_json(&json).context("Invalid fixture file")?
        }
        None => {
            log::info!("No FIXTURE_PATH set, starting empty");
            FixtureStore::new()
        }
    };

    log::info!("Server will listen on {}:{}", config.server_host, config.server_port);

    run_server(Arc::new(store), config.server_host, config.server_port)
        .await
        .context("Server error")?;

    Ok(())
}
