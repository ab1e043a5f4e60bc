//! Server configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file named by
//! `WAYPOINT_CONFIG`, then the `LISTEN` and `FILES_DIR` environment
//! variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

pub const CONFIG_ENV: &str = "WAYPOINT_CONFIG";
pub const LISTEN_ENV: &str = "LISTEN";
pub const FILES_DIR_ENV: &str = "FILES_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Root directory for `/files/...`. File routes are disabled when unset.
    pub files_dir: Option<PathBuf>,
    pub read_chunk_size: usize,
    pub max_request_bytes: usize,
    /// Answer malformed requests with `400 Bad Request` instead of closing
    /// the connection silently.
    pub reject_malformed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:4221".to_string(),
            files_dir: None,
            read_chunk_size: 1024,
            max_request_bytes: 8192,
            reject_malformed: false,
        }
    }
}

/// Command-line flags. Each one overrides the loaded configuration.
#[derive(Debug, Default, Parser)]
#[command(name = "waypoint", about = "Minimal HTTP/1.1 server")]
pub struct CliArgs {
    /// Directory served under /files
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long)]
    pub listen: Option<String>,

    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` in place of the environment.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = match lookup(CONFIG_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(addr) = lookup(LISTEN_ENV) {
            cfg.listen_addr = addr;
        }
        if let Some(dir) = lookup(FILES_DIR_ENV) {
            cfg.files_dir = Some(PathBuf::from(dir));
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Applies command-line overrides. `--config` replaces everything loaded
    /// so far before the other flags apply.
    pub fn apply_args(mut self, args: CliArgs) -> anyhow::Result<Self> {
        if let Some(path) = args.config {
            self = Self::from_file(path)?;
        }
        if let Some(addr) = args.listen {
            self.listen_addr = addr;
        }
        if let Some(dir) = args.directory {
            self.files_dir = Some(dir);
        }
        Ok(self)
    }
}
