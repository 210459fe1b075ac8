use std::env;

use log::*;

const DEFAULT_SOR_HOST: &str = "127.0.0.1";
const DEFAULT_SOR_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Prefix for order numbers minted by the fallback creation path.
    pub order_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SOR_HOST.to_string(),
            port: DEFAULT_SOR_PORT,
            database_url: String::default(),
            order_prefix: order_recon_engine::helpers::DEFAULT_ORDER_PREFIX.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SOR_HOST").ok().unwrap_or_else(|| DEFAULT_SOR_HOST.into());
        let port = env::var("SOR_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SOR_PORT. {e} Using the default, {DEFAULT_SOR_PORT}, instead."
                    );
                    DEFAULT_SOR_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SOR_PORT);
        let database_url = env::var("SOR_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SOR_DATABASE_URL is not set. Please set it to the URL for the orders database.");
            String::default()
        });
        let order_prefix = env::var("SOR_ORDER_PREFIX")
            .ok()
            .unwrap_or_else(|| order_recon_engine::helpers::DEFAULT_ORDER_PREFIX.to_string());
        Self { host, port, database_url, order_prefix }
    }
}
