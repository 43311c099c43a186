use anyhow::Context;
use std::net::SocketAddr;
use std::str::FromStr;

/// Sized for an 8K viewport at the default grid settings, which generates
/// roughly 130k paths (4K is about 32k).
pub const DEFAULT_MAX_PATHS_PER_VIEWPORT: usize = 250_000;

/// Room for a full `DEFAULT_MAX_PATHS_PER_VIEWPORT` upload.
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024 * 1024;

pub const DEFAULT_MAX_VIEWPORTS: usize = 256;

/// Holds all configuration for the path_store service.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub metrics_listen_addr: SocketAddr,
    pub max_viewports: usize,
    pub max_paths_per_viewport: usize,
    pub max_body_bytes: usize,
}

impl Config {
    /// Parses configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            listen_addr: env_or("PATH_STORE_LISTEN_ADDR", "0.0.0.0:8080")
                .parse()
                .context("Failed to parse PATH_STORE_LISTEN_ADDR")?,
            metrics_listen_addr: env_or("PATH_STORE_METRICS_LISTEN_ADDR", "0.0.0.0:9091")
                .parse()
                .context("Failed to parse PATH_STORE_METRICS_LISTEN_ADDR")?,
            max_viewports: env_parse("PATH_STORE_MAX_VIEWPORTS", DEFAULT_MAX_VIEWPORTS)?,
            max_paths_per_viewport: env_parse(
                "PATH_STORE_MAX_PATHS_PER_VIEWPORT",
                DEFAULT_MAX_PATHS_PER_VIEWPORT,
            )?,
            max_body_bytes: env_parse("PATH_STORE_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("Failed to parse {key}")),
        Err(_) => Ok(default),
    }
}
