use clap::Parser;

use crate::config::{AppConfig, StorageBackend};

/// Command-line overrides, applied on top of the environment configuration
#[derive(Debug, Parser)]
#[command(name = "shop-api")]
#[command(about = "Shop API - authentication, carts and a product catalog over HTTP/JSON")]
#[command(version)]
pub struct Args {
    #[arg(long, help = "Address to bind (overrides APP_HOST)")]
    pub host: Option<String>,

    #[arg(long, short, help = "Port to listen on (overrides APP_PORT)")]
    pub port: Option<u16>,

    #[arg(long, value_parser = parse_backend, help = "Storage backend: postgres or memory")]
    pub storage: Option<StorageBackend>,
}

fn parse_backend(value: &str) -> Result<StorageBackend, String> {
    value.parse()
}

impl Args {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(backend) = self.storage {
            config.database.backend = backend;
        }
    }
}
