//! # Spool Scanner Configuration
//!
//! Configuration comes from one of two sources:
//!
//! - the process environment (default):
//!
//! ```text
//! SPOOLMAN_URL=http://spoolman.local:7912
//! PRINTER_1_NAME=Kitchen
//! PRINTER_1_URL=http://octopi-kitchen.local
//! PRINTER_1_KEY=0123456789ABCDEF
//! ```
//!
//!   Slots 1 through 10 are scanned. A slot without a name is skipped.
//!
//! - a TOML file passed with `--config`:
//!
//! ```toml
//! spoolman_url = "http://spoolman.local:7912"
//! request_timeout_secs = 10
//!
//! [[printers]]
//! name = "Kitchen"
//! url = "http://octopi-kitchen.local"
//! api_key = "0123456789ABCDEF"
//! ```
//!
//! Printer ids are `printer-<n>`, where `n` is the environment slot or the
//! 1-based position in the file.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Highest printer slot scanned in the environment, and the most printers a file may list.
pub const MAX_PRINTERS: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("incomplete configuration for printer {0}")]
    IncompletePrinter(usize),
    #[error("no printers configured")]
    NoPrinters,
    #[error("SPOOLMAN_URL not set")]
    MissingSpoolmanUrl,
    #[error("{0} printers configured, at most {MAX_PRINTERS} are supported")]
    TooManyPrinters(usize),
    #[error("request timeout must be at least one second")]
    InvalidTimeout,
}

/// A printer reachable through its OctoPrint instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Printer {
    pub id: String,
    pub name: String,
    pub octoprint_url: String,
    pub api_key: String,
}

/// Validated process-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub spoolman_url: String,
    pub printers: Vec<Printer>,
    pub request_timeout: Duration,
}

/// On-disk shape of the TOML configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub spoolman_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub printers: Vec<FilePrinter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilePrinter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

fn default_request_timeout_secs() -> u64 { 10 }

fn printer_id(slot: usize) -> String {
    format!("printer-{}", slot)
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();

        let mut printers = Vec::new();
        for slot in 1..=MAX_PRINTERS {
            let name = get(&format!("PRINTER_{}_NAME", slot));
            if name.is_empty() {
                continue;
            }
            let url = get(&format!("PRINTER_{}_URL", slot));
            let api_key = get(&format!("PRINTER_{}_KEY", slot));
            if url.is_empty() || api_key.is_empty() {
                return Err(ConfigError::IncompletePrinter(slot));
            }
            printers.push(Printer {
                id: printer_id(slot),
                name,
                octoprint_url: trim_base_url(&url),
                api_key,
            });
        }

        Self::validated(get("SPOOLMAN_URL"), printers, default_request_timeout_secs())
    }

    /// Build configuration from a parsed TOML file.
    pub fn from_file_config(file: FileConfig) -> Result<Self, ConfigError> {
        if file.printers.len() > MAX_PRINTERS {
            return Err(ConfigError::TooManyPrinters(file.printers.len()));
        }
        let mut printers = Vec::with_capacity(file.printers.len());
        for (idx, p) in file.printers.into_iter().enumerate() {
            let slot = idx + 1;
            if p.name.trim().is_empty() || p.url.trim().is_empty() || p.api_key.trim().is_empty() {
                return Err(ConfigError::IncompletePrinter(slot));
            }
            printers.push(Printer {
                id: printer_id(slot),
                name: p.name.trim().to_string(),
                octoprint_url: trim_base_url(&p.url),
                api_key: p.api_key.trim().to_string(),
            });
        }
        Self::validated(file.spoolman_url, printers, file.request_timeout_secs)
    }

    fn validated(spoolman_url: String, printers: Vec<Printer>, timeout_secs: u64) -> Result<Self, ConfigError> {
        if printers.is_empty() {
            return Err(ConfigError::NoPrinters);
        }
        let spoolman_url = trim_base_url(&spoolman_url);
        if spoolman_url.is_empty() {
            return Err(ConfigError::MissingSpoolmanUrl);
        }
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(Self {
            spoolman_url,
            printers,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn printer(&self, id: &str) -> Option<&Printer> {
        self.printers.iter().find(|p| p.id == id)
    }
}

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<FileConfig>(&contents) {
            Ok(file) => Config::from_file_config(file),
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            Err(ConfigError::Io(e))
        }
    }
}
