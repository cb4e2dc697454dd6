use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("cannot read config file: {0}")]
	Io(#[from] std::io::Error),

	#[error("cannot parse config file: {0}")]
	Parse(#[from] toml::de::Error),
}

/// The `[stratus]` section of the configuration file. Every field has a
/// usable default, so the server runs with no file at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
	/// Listen address.
	pub address: String,
	/// Connections over this cap are closed right after accept.
	pub max_connection: usize,
	/// Password clients must AUTH with; empty disables authentication.
	pub auth: String,
	/// Log destination; empty logs to stdout.
	pub logfile: String,
	pub loglevel: String,
	/// Number of acceptor tasks sharing the listener.
	pub maxproc: usize,
	/// Per-tick batch cap of the TTL sweeper.
	pub ttl_checker_loop: u64,
	/// Sweeper tick interval in milliseconds.
	pub ttl_checker_interval: u64,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			address: "127.0.0.1:6379".to_string(),
			max_connection: 500,
			auth: String::new(),
			logfile: String::new(),
			loglevel: "info".to_string(),
			maxproc: num_cpus::get(),
			ttl_checker_loop: 100,
			ttl_checker_interval: 100,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub stratus: ServerConfig,
}

/// Load the configuration file, or defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
	match path {
		Some(path) => {
			let raw = std::fs::read_to_string(path)?;
			Ok(toml::from_str(&raw)?)
		}
		None => Ok(Config::default()),
	}
}
