use std::path::PathBuf;

use anyhow::Context;
use tracing::warn;

const DEV_SECRET_KEY: &str = "it's a secret";

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "warbler.db".into());
        let secret_key = std::env::var("WARBLER_SECRET_KEY").unwrap_or_else(|_| {
            warn!("WARBLER_SECRET_KEY not set; using the development key");
            DEV_SECRET_KEY.into()
        });
        let host = std::env::var("WARBLER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("WARBLER_PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .context("WARBLER_PORT must be a port number")?;
        let static_dir = std::env::var("WARBLER_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static"));

        Ok(Self {
            database_url,
            secret_key,
            host,
            port,
            static_dir,
        })
    }
}
