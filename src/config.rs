use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

/// Receive buffer capacity. A request line that does not fit is answered with 414.
pub const RECV_BUFFER_SIZE: usize = 2048;

/// Longest URI, and longest resolved filesystem path, the server accepts.
pub const PATH_BUFFER_SIZE: usize = 1024;

/// Size of each file chunk read and sent during the body phase.
pub const CHUNK_SIZE: usize = 16384;

/// Pending connection queue length for the listening socket.
pub const BACKLOG: u32 = 128;

pub const USAGE: &str = "usage: staticd <port> [config.yaml]";

/// Runtime configuration.
///
/// Every field has a compiled-in default; a YAML file may override any of them
/// except `port`, which always comes from the command line.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub port: u16,
    pub bind_addr: IpAddr,
    pub root_dir: String,
    pub idle_timeout_ms: u64,
    /// Request/response cycles allowed on one connection.
    pub max_requests: usize,
    /// Advertised in the `Keep-Alive` header, seconds.
    pub keep_alive_timeout: u64,
    /// Advertised in the `Keep-Alive` header.
    pub keep_alive_max: usize,
    pub server_name: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 0,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            root_dir: "www".to_string(),
            idle_timeout_ms: 1000,
            max_requests: 200,
            keep_alive_timeout: 1,
            keep_alive_max: 200,
            server_name: "staticd".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Builds the configuration from process arguments (program name first).
    pub fn from_args<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().skip(1).collect();

        let (port, file) = match args.as_slice() {
            [port] => (port, None),
            [port, file] => (port, Some(file)),
            _ => bail!("expected 1 or 2 arguments, got {}", args.len()),
        };

        let port: u16 = port
            .parse()
            .with_context(|| format!("port must be a number, got {port:?}"))?;

        let mut cfg = match file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        cfg.port = port;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        // An empty document deserializes as unit, not as an empty map.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_yaml::from_str(text)?;
        if cfg.max_requests == 0 {
            bail!("max_requests must be at least 1");
        }
        Ok(cfg)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
